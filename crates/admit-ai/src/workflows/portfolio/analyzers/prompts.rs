use std::fmt::Write as _;

use super::super::domain::{Activity, Dimension, Essay, HolisticImpression, Portfolio};
use super::super::inputs::{
    AcademicSlice, ActivitySlice, CuriositySlice, DimensionInput, FutureSlice, VoiceSlice,
};
use super::super::reasoning::{CallParams, ReasoningRequest};
use super::super::weights::EvaluationMode;

const DIMENSION_RESPONSE_FORMAT: &str = r#"Respond with a single JSON object inside a ```json fence:
{
  "dimension_score": <number 0-10>,
  "tier": "exceptional" | "strong" | "developing" | "foundational",
  "reasoning": {"summary": "...", "key_observations": ["..."], "scoring_rationale": "..."},
  "strengths": [{"text": "...", "supporting_quotes": ["exact applicant words"], "rarity": "common|uncommon|rare|exceptional"}],
  "weaknesses": [{"text": "...", "supporting_quotes": ["exact applicant words"], "severity": "minor|moderate|significant"}],
  "comparative_context": {"percentile_estimate": "...", "typical_applicant": "...", "differentiator": "..."},
  "confidence": <number 0-1>
}
Quote the applicant verbatim; never invent details."#;

/// How much the target mode cares about the dimension being scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ModeEmphasis {
    pub mode: EvaluationMode,
    pub weight: f64,
}

pub(crate) fn dimension_request(
    input: &DimensionInput,
    holistic: &HolisticImpression,
    emphasis: ModeEmphasis,
    params: &CallParams,
) -> ReasoningRequest {
    let dimension = input.dimension();
    let system_instructions = format!(
        "You are a veteran admissions reader scoring one dimension of a student portfolio: {}.\n{}\nCalibrate against the full applicant pool; a 9+ is rare.\n\n{}",
        dimension.label(),
        rubric_focus(dimension),
        DIMENSION_RESPONSE_FORMAT
    );

    let mut payload = String::new();
    let _ = writeln!(
        payload,
        "Target context: {} (this dimension carries {:.0}% of the overall weight)",
        emphasis.mode.display_name(),
        emphasis.weight * 100.0
    );
    write_holistic(&mut payload, holistic);
    let _ = writeln!(payload, "\n## Applicant material for {}", dimension.label());

    match input {
        DimensionInput::Academics(slice) => write_academics(&mut payload, slice),
        DimensionInput::Leadership(slice) => write_activities(&mut payload, slice, "leadership"),
        DimensionInput::CommunityImpact(slice) => {
            write_activities(&mut payload, slice, "community impact")
        }
        DimensionInput::IntellectualCuriosity(slice) => write_curiosity(&mut payload, slice),
        DimensionInput::Authenticity(slice) => write_voice(&mut payload, slice),
        DimensionInput::FutureReadiness(slice) => write_future(&mut payload, slice),
    }

    ReasoningRequest {
        system_instructions,
        user_payload: payload,
        params: params.clone(),
    }
}

pub(crate) fn holistic_request(portfolio: &Portfolio, params: &CallParams) -> ReasoningRequest {
    let system_instructions = r#"You are a veteran admissions reader forming a first impression of a whole portfolio before detailed scoring.
Respond with a single JSON object inside a ```json fence:
{
  "first_impression": "two or three sentences",
  "themes": ["recurring theme", "..."],
  "standout_signal": "the single most distinctive element, or null",
  "initial_band": "exceptional" | "strong" | "developing" | "foundational",
  "confidence": <number 0-1>
}"#
    .to_string();

    let mut payload = String::new();
    if let Some(record) = &portfolio.academics {
        write_academics(
            &mut payload,
            &AcademicSlice {
                record: record.clone(),
            },
        );
    }
    let _ = writeln!(payload, "\n## Activities");
    for activity in &portfolio.activities {
        write_activity(&mut payload, activity);
    }
    write_essays(&mut payload, &portfolio.essays);
    if let Some(goals) = &portfolio.goals {
        let _ = writeln!(payload, "\n## Goals");
        if let Some(major) = &goals.intended_major {
            let _ = writeln!(payload, "Intended major: {major}");
        }
        if let Some(statement) = &goals.statement {
            let _ = writeln!(payload, "{statement}");
        }
    }

    ReasoningRequest {
        system_instructions,
        user_payload: payload,
        params: params.clone(),
    }
}

fn rubric_focus(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Academics => {
            "Weigh grades in the context of course rigor, upward trends, awards, and academic self-direction."
        }
        Dimension::Leadership => {
            "Look for initiative, ownership of outcomes, and influence on others; titles alone are weak evidence."
        }
        Dimension::IntellectualCuriosity => {
            "Look for learning pursued beyond requirements: independent projects, research, questions the student chased."
        }
        Dimension::CommunityImpact => {
            "Look for sustained service with named beneficiaries and measurable change, not one-off participation."
        }
        Dimension::Authenticity => {
            "Judge the distinctiveness of the student's voice, honesty, and reflective depth in their own words."
        }
        Dimension::FutureReadiness => {
            "Judge how clearly the student's goals connect to demonstrated preparation and realistic next steps."
        }
    }
}

fn write_holistic(payload: &mut String, holistic: &HolisticImpression) {
    let _ = writeln!(payload, "\n## Holistic first impression");
    let _ = writeln!(payload, "{}", holistic.first_impression);
    if !holistic.themes.is_empty() {
        let _ = writeln!(payload, "Themes: {}", holistic.themes.join(", "));
    }
    if let Some(signal) = &holistic.standout_signal {
        let _ = writeln!(payload, "Standout: {signal}");
    }
}

fn write_academics(payload: &mut String, slice: &AcademicSlice) {
    let record = &slice.record;
    let _ = writeln!(payload, "## Academic record");
    if let Some(gpa) = record.gpa_unweighted {
        let _ = writeln!(payload, "Unweighted GPA: {gpa:.2}");
    }
    if let Some(gpa) = record.gpa_weighted {
        let _ = writeln!(payload, "Weighted GPA: {gpa:.2}");
    }
    if let Some(rank) = record.class_rank {
        let _ = writeln!(payload, "Class rank: {} of {}", rank.position, rank.class_size);
    }
    if !record.courses.is_empty() {
        let _ = writeln!(
            payload,
            "Courses ({} of {} advanced):",
            record.advanced_course_count(),
            record.courses.len()
        );
    }
    for course in &record.courses {
        let grade = course.grade.as_deref().unwrap_or("in progress");
        let _ = writeln!(payload, "- {} ({}): {grade}", course.name, course.level.label());
    }
    for score in &record.test_scores {
        let _ = writeln!(payload, "Test: {} {}", score.name, score.score);
    }
    for award in &record.awards {
        let _ = writeln!(payload, "Award: {award}");
    }
    if let Some(notes) = &record.notes {
        let _ = writeln!(payload, "Notes: {notes}");
    }
}

fn write_activity(payload: &mut String, activity: &Activity) {
    let _ = write!(payload, "- {}", activity.title);
    if let Some(role) = &activity.role {
        let _ = write!(payload, " | role: {role}");
    }
    if let Some(organization) = &activity.organization {
        let _ = write!(payload, " | org: {organization}");
    }
    if let (Some(hours), Some(weeks)) = (activity.hours_per_week, activity.weeks_per_year) {
        let _ = write!(payload, " | {hours} hrs/wk, {weeks} wks/yr");
    }
    if let Some(years) = activity.years_active {
        let _ = write!(payload, " | {years} yrs");
    }
    let _ = writeln!(payload);
    if !activity.description.trim().is_empty() {
        let _ = writeln!(payload, "  {}", activity.description.trim());
    }
}

fn write_activities(payload: &mut String, slice: &ActivitySlice, focus: &str) {
    if slice.activities.is_empty() {
        let _ = writeln!(payload, "No activities listed; score {focus} accordingly.");
        return;
    }
    for activity in &slice.activities {
        write_activity(payload, activity);
    }
}

fn write_essays(payload: &mut String, essays: &[Essay]) {
    for (index, essay) in essays.iter().enumerate() {
        let _ = writeln!(payload, "\n## Essay {}", index + 1);
        if !essay.prompt.trim().is_empty() {
            let _ = writeln!(payload, "Prompt: {}", essay.prompt.trim());
        }
        let _ = writeln!(payload, "{}", essay.body.trim());
    }
}

fn write_curiosity(payload: &mut String, slice: &CuriositySlice) {
    for course in &slice.courses {
        let _ = writeln!(payload, "- Course: {} ({})", course.name, course.level.label());
    }
    if let Some(notes) = &slice.academic_notes {
        let _ = writeln!(payload, "Academic notes: {notes}");
    }
    for activity in &slice.activities {
        write_activity(payload, activity);
    }
    write_essays(payload, &slice.essays);
}

fn write_voice(payload: &mut String, slice: &VoiceSlice) {
    write_essays(payload, &slice.essays);
    if !slice.activity_descriptions.is_empty() {
        let _ = writeln!(payload, "\n## Activity descriptions in the student's words");
        for description in &slice.activity_descriptions {
            let _ = writeln!(payload, "- {description}");
        }
    }
}

fn write_future(payload: &mut String, slice: &FutureSlice) {
    match &slice.goals {
        Some(goals) => {
            if let Some(major) = &goals.intended_major {
                let _ = writeln!(payload, "Intended major: {major}");
            }
            if !goals.career_interests.is_empty() {
                let interests = goals.career_interests.join(", ");
                let _ = writeln!(payload, "Career interests: {interests}");
            }
            if let Some(statement) = &goals.statement {
                let _ = writeln!(payload, "Goal statement: {statement}");
            }
        }
        None => {
            let _ = writeln!(payload, "No stated goals.");
        }
    }
    for activity in &slice.activities {
        write_activity(payload, activity);
    }
    write_essays(payload, &slice.essays);
}
