//! Deterministic fallback scoring for the six dimensions.
//!
//! Every generator is total: any input, including empty slices, yields a schema-valid
//! [`DimensionResult`] on the heuristic path with reduced confidence.

use super::super::calibration::Calibration;
use super::super::domain::{
    round_one_decimal, AcademicRecord, Activity, ActivityCategory, ComparativeContext, Dimension,
    DimensionResult, EvaluationPath, Evidence, FutureGoals, Gap, Rarity, ReasoningNotes, Severity,
    FLAG_HEURISTIC_SCORING, HEURISTIC_CONFIDENCE,
};
use super::super::inputs::DimensionInput;
use super::super::signals::{Signal, TextSignals};

pub(crate) const BASE_SCORE: f64 = 2.0;
pub(crate) const QUANTIFIED_INCREMENT: f64 = 1.0;
pub(crate) const BENEFICIARY_INCREMENT: f64 = 1.0;
pub(crate) const REFLECTION_INCREMENT: f64 = 1.0;
pub(crate) const DURATION_INCREMENT: f64 = 1.0;
pub(crate) const KEYWORD_INCREMENT: f64 = 1.5;

/// Highest score any heuristic may award; the exceptional band needs a real read.
pub(crate) const HEURISTIC_CEILING: f64 = 8.5;
/// Academics cap when there is neither a GPA nor three listed courses.
pub(crate) const THIN_ACADEMIC_CAP: f64 = 5.0;

const LEADERSHIP_ROLES: [&str; 10] = [
    "president", "captain", "founder", "co-founder", "lead", "chair", "editor", "director",
    "head", "manager",
];

/// Word-count cap for text-driven dimensions.
pub(crate) fn text_cap(word_count: usize) -> f64 {
    match word_count {
        0..=49 => 3.0,
        50..=149 => 5.0,
        150..=299 => 7.0,
        _ => HEURISTIC_CEILING,
    }
}

/// Additive score with a running explanation.
struct Tally {
    score: f64,
    steps: Vec<String>,
    strengths: Vec<Evidence>,
    gaps: Vec<Gap>,
}

impl Tally {
    fn new() -> Self {
        Self {
            score: BASE_SCORE,
            steps: vec![format!("base {BASE_SCORE:.1}")],
            strengths: Vec::new(),
            gaps: Vec::new(),
        }
    }

    fn add(&mut self, amount: f64, reason: &str) {
        self.score += amount;
        self.steps.push(format!("+{amount:.1} {reason}"));
    }

    fn signal(
        &mut self,
        signals: &TextSignals,
        signal: Signal,
        amount: f64,
        strength: &str,
        gap: Option<(&str, Severity)>,
    ) {
        match signals.quote(signal) {
            Some(quote) => {
                self.add(amount, signal_label(signal));
                self.strengths.push(Evidence {
                    text: strength.to_string(),
                    supporting_quotes: vec![quote.to_string()],
                    rarity: Rarity::Common,
                });
            }
            None => {
                if let Some((text, severity)) = gap {
                    self.gaps.push(Gap {
                        text: text.to_string(),
                        supporting_quotes: Vec::new(),
                        severity,
                    });
                }
            }
        }
    }

    fn cap(&mut self, cap: f64, reason: &str) {
        if self.score > cap {
            self.score = cap;
            self.steps.push(format!("capped at {cap:.1} ({reason})"));
        }
    }
}

fn signal_label(signal: Signal) -> &'static str {
    match signal {
        Signal::QuantifiedMetric => "quantified outcome",
        Signal::NamedBeneficiary => "named beneficiaries",
        Signal::Reflection => "explicit reflection",
        Signal::SustainedDuration => "sustained commitment",
        Signal::EmotionalLanguage => "emotional honesty",
        Signal::Dialogue => "dialogue",
        Signal::LeadershipAction => "leadership action",
        Signal::CuriosityMarker => "self-directed inquiry",
        Signal::ServiceOrientation => "service orientation",
        Signal::FutureOrientation => "forward-looking goals",
    }
}

pub(crate) fn heuristic_dimension(
    input: &DimensionInput,
    calibration: &Calibration,
) -> DimensionResult {
    let dimension = input.dimension();
    let (tally, word_count) = match input {
        DimensionInput::Academics(slice) => (academic_tally(&slice.record), 0),
        _ => {
            let text = input.source_text();
            let signals = TextSignals::scan(&text);
            let mut tally = Tally::new();
            generic_signals(&mut tally, &signals);
            match input {
                DimensionInput::Leadership(slice) => {
                    leadership(&mut tally, &signals, &slice.activities)
                }
                DimensionInput::CommunityImpact(slice) => {
                    community(&mut tally, &signals, &slice.activities)
                }
                DimensionInput::IntellectualCuriosity(slice) => {
                    let advanced = slice
                        .courses
                        .iter()
                        .filter(|course| course.level.is_advanced())
                        .count();
                    curiosity(&mut tally, &signals, &slice.activities, advanced)
                }
                DimensionInput::Authenticity(slice) => {
                    let longest_essay = slice
                        .essays
                        .iter()
                        .map(|essay| super::super::signals::word_count(&essay.body))
                        .max()
                        .unwrap_or(0);
                    authenticity(&mut tally, &signals, longest_essay)
                }
                DimensionInput::FutureReadiness(slice) => {
                    future(&mut tally, &signals, slice.goals.as_ref())
                }
                DimensionInput::Academics(_) => {}
            }
            if signals.word_count < 50 {
                tally.gaps.push(Gap {
                    text: "Very little written material to evaluate".to_string(),
                    supporting_quotes: Vec::new(),
                    severity: Severity::Significant,
                });
            }
            tally.cap(text_cap(signals.word_count), "length of written material");
            (tally, signals.word_count)
        }
    };

    finish(dimension, tally, word_count, calibration)
}

fn finish(
    dimension: Dimension,
    mut tally: Tally,
    word_count: usize,
    calibration: &Calibration,
) -> DimensionResult {
    tally.cap(HEURISTIC_CEILING, "heuristic ceiling");
    let score = round_one_decimal(tally.score.clamp(0.0, 10.0));
    let summary = if matches!(dimension, Dimension::Academics) {
        format!(
            "Heuristic estimate of {} from the structured academic record.",
            dimension.label()
        )
    } else {
        format!(
            "Heuristic estimate of {} from {word_count} words of applicant material.",
            dimension.label()
        )
    };

    DimensionResult {
        dimension,
        score,
        tier: calibration.tier_for(dimension, score),
        reasoning: ReasoningNotes {
            summary,
            key_observations: tally.strengths.iter().map(|item| item.text.clone()).collect(),
            scoring_rationale: tally.steps.join(", "),
        },
        strengths: tally.strengths,
        growth_areas: tally.gaps,
        comparative_context: ComparativeContext::default(),
        confidence: HEURISTIC_CONFIDENCE,
        path: EvaluationPath::Heuristic,
        flags: vec![FLAG_HEURISTIC_SCORING.to_string()],
    }
}

fn generic_signals(tally: &mut Tally, signals: &TextSignals) {
    tally.signal(
        signals,
        Signal::QuantifiedMetric,
        QUANTIFIED_INCREMENT,
        "Quantifies outcomes",
        Some((
            "No quantified outcomes (people reached, hours, dollars) are given",
            Severity::Moderate,
        )),
    );
    tally.signal(
        signals,
        Signal::NamedBeneficiary,
        BENEFICIARY_INCREMENT,
        "Names who benefited",
        Some(("Beneficiaries of the work are not identified", Severity::Minor)),
    );
    tally.signal(
        signals,
        Signal::Reflection,
        REFLECTION_INCREMENT,
        "Reflects on what the experience meant",
        Some(("Little explicit reflection on growth or meaning", Severity::Moderate)),
    );
    tally.signal(
        signals,
        Signal::SustainedDuration,
        DURATION_INCREMENT,
        "Shows sustained commitment over time",
        Some(("Duration of commitment is unclear", Severity::Minor)),
    );
}

fn leadership(tally: &mut Tally, signals: &TextSignals, activities: &[Activity]) {
    tally.signal(
        signals,
        Signal::LeadershipAction,
        KEYWORD_INCREMENT,
        "Describes leading or founding an effort",
        Some(("No clear instance of initiating or leading", Severity::Significant)),
    );
    let leadership_roles = activities
        .iter()
        .filter(|activity| {
            activity
                .role
                .as_deref()
                .map(|role| {
                    let role = role.to_ascii_lowercase();
                    LEADERSHIP_ROLES.iter().any(|title| role.contains(title))
                })
                .unwrap_or(false)
        })
        .count();
    if leadership_roles > 0 {
        let bonus = (leadership_roles as f64 * 0.5).min(1.5);
        tally.add(bonus, "formal leadership roles");
    }
}

fn community(tally: &mut Tally, signals: &TextSignals, activities: &[Activity]) {
    tally.signal(
        signals,
        Signal::ServiceOrientation,
        KEYWORD_INCREMENT,
        "Engages in service to others",
        Some(("Service to others is not evident", Severity::Significant)),
    );
    let service_hours: f64 = activities
        .iter()
        .filter(|activity| activity.category == ActivityCategory::CommunityService)
        .map(Activity::total_hours)
        .sum();
    if service_hours >= 250.0 {
        tally.add(1.5, "250+ documented service hours");
    } else if service_hours >= 100.0 {
        tally.add(1.0, "100+ documented service hours");
    }
}

fn curiosity(tally: &mut Tally, signals: &TextSignals, activities: &[Activity], advanced: usize) {
    tally.signal(
        signals,
        Signal::CuriosityMarker,
        KEYWORD_INCREMENT,
        "Pursues questions beyond requirements",
        Some(("No self-directed inquiry is described", Severity::Moderate)),
    );
    if activities
        .iter()
        .any(|activity| activity.category == ActivityCategory::Research)
    {
        tally.add(1.0, "research activity");
    }
    if advanced >= 4 {
        tally.add(0.5, "sustained advanced coursework");
    }
}

fn authenticity(tally: &mut Tally, signals: &TextSignals, longest_essay: usize) {
    tally.signal(
        signals,
        Signal::EmotionalLanguage,
        KEYWORD_INCREMENT,
        "Writes with emotional honesty",
        Some(("Writing keeps emotions at a distance", Severity::Minor)),
    );
    if signals.has(Signal::Dialogue) {
        tally.add(0.5, signal_label(Signal::Dialogue));
    }
    if longest_essay >= 250 {
        tally.add(0.5, "developed long-form essay");
    }
}

fn future(tally: &mut Tally, signals: &TextSignals, goals: Option<&FutureGoals>) {
    tally.signal(
        signals,
        Signal::FutureOrientation,
        KEYWORD_INCREMENT,
        "Articulates forward-looking goals",
        Some(("Goals are not connected to next steps", Severity::Moderate)),
    );
    let Some(goals) = goals else {
        tally.gaps.push(Gap {
            text: "No intended major or career direction stated".to_string(),
            supporting_quotes: Vec::new(),
            severity: Severity::Moderate,
        });
        return;
    };
    if goals.intended_major.is_some() {
        tally.add(0.5, "intended major");
    }
    if !goals.career_interests.is_empty() {
        tally.add(0.5, "career interests");
    }
    if goals.statement.as_deref().map(str::trim).is_some_and(|text| !text.is_empty()) {
        tally.add(0.5, "goal statement");
    }
}

fn gpa_base(gpa: f64) -> f64 {
    if gpa >= 3.9 {
        7.0
    } else if gpa >= 3.7 {
        6.0
    } else if gpa >= 3.5 {
        5.0
    } else if gpa >= 3.0 {
        4.0
    } else {
        3.0
    }
}

fn academic_tally(record: &AcademicRecord) -> Tally {
    let mut tally = Tally::new();
    let gpa = record
        .gpa_unweighted
        .filter(|gpa| gpa.is_finite())
        .or_else(|| {
            record
                .gpa_weighted
                .filter(|gpa| gpa.is_finite())
                .map(|weighted| (weighted - 0.4).min(4.0))
        });

    match gpa {
        Some(gpa) => {
            let base = gpa_base(gpa);
            tally.score = base;
            tally.steps = vec![format!("GPA {gpa:.2} maps to {base:.1}")];
            if base >= 6.0 {
                tally.strengths.push(Evidence {
                    text: format!("Strong grades (GPA {gpa:.2})"),
                    supporting_quotes: Vec::new(),
                    rarity: Rarity::Uncommon,
                });
            }
        }
        None => tally.gaps.push(Gap {
            text: "No GPA reported".to_string(),
            supporting_quotes: Vec::new(),
            severity: Severity::Significant,
        }),
    }

    let advanced: Vec<&str> = record
        .courses
        .iter()
        .filter(|course| course.level.is_advanced())
        .map(|course| course.name.as_str())
        .collect();
    if advanced.is_empty() {
        tally.gaps.push(Gap {
            text: "Limited advanced coursework".to_string(),
            supporting_quotes: Vec::new(),
            severity: Severity::Moderate,
        });
    } else {
        let bonus = ((advanced.len() / 2) as f64 * 0.5).min(2.0);
        if bonus > 0.0 {
            tally.add(bonus, "advanced coursework");
        }
        tally.strengths.push(Evidence {
            text: format!("Took {} advanced courses", advanced.len()),
            supporting_quotes: advanced.iter().take(3).map(|name| name.to_string()).collect(),
            rarity: Rarity::Common,
        });
    }

    if let Some(award) = record.awards.first() {
        tally.add(0.5, "academic awards");
        tally.strengths.push(Evidence {
            text: "Earned academic recognition".to_string(),
            supporting_quotes: vec![award.clone()],
            rarity: Rarity::Uncommon,
        });
    }

    if record
        .class_rank
        .and_then(|rank| rank.top_fraction())
        .is_some_and(|fraction| fraction <= 0.1)
    {
        tally.add(0.5, "top-decile class rank");
    }

    if gpa.is_none() && record.courses.len() < 3 {
        tally.cap(THIN_ACADEMIC_CAP, "thin academic record");
    }
    tally
}
