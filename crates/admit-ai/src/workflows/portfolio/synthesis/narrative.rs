use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::super::domain::{Dimension, HolisticImpression, Tier, HEURISTIC_CONFIDENCE};
use super::super::parser::ParseError;
use super::super::reasoning::{CallParams, ReasoningRequest};
use super::super::schema::parse_narrative;
use super::super::weights::EvaluationMode;
use super::archetype::{Archetype, PercentileBucket};
use super::HiddenStrength;

/// Dimension pairs that tend to reinforce each other.
pub(crate) const COMPLEMENTARY_PAIRS: [(Dimension, Dimension); 3] = [
    (Dimension::Academics, Dimension::IntellectualCuriosity),
    (Dimension::Leadership, Dimension::CommunityImpact),
    (Dimension::Authenticity, Dimension::FutureReadiness),
];

const SYNERGY_FLOOR: f64 = 7.0;
const TENSION_PEAK: f64 = 8.0;
const TENSION_TROUGH: f64 = 4.0;
const HIDDEN_STRENGTH_FLOOR: f64 = 7.0;

/// Fixed numeric facts the narrative must explain but may not change.
pub(crate) struct NarrativeContext<'a> {
    pub overall_score: f64,
    pub tier: Tier,
    pub archetype: Archetype,
    pub percentile: PercentileBucket,
    pub mode: EvaluationMode,
    pub emphasized: &'a [Dimension],
    pub scores: &'a BTreeMap<Dimension, f64>,
    pub coherence: f64,
    pub holistic: &'a HolisticImpression,
}

impl NarrativeContext<'_> {
    fn score(&self, dimension: Dimension) -> f64 {
        self.scores.get(&dimension).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Narrative {
    pub archetype_explanation: String,
    pub hidden_strengths: Vec<HiddenStrength>,
    pub synergies: Vec<String>,
    pub tensions: Vec<String>,
    pub coherence_narrative: String,
    pub campus_fit_rationale: Option<String>,
}

pub(crate) fn narrative_request(
    context: &NarrativeContext<'_>,
    params: &CallParams,
) -> ReasoningRequest {
    let system_instructions = r#"You are a senior admissions reader writing the synthesis of an already-scored portfolio.
The numeric results are final. Explain them; do not re-score.
Respond with a single JSON object inside a ```json fence:
{
  "archetype_explanation": "why this archetype fits",
  "hidden_strengths": [{"title": "...", "narrative": "...", "dimensions": ["leadership"]}],
  "dimensional_interactions": {"synergies": ["..."], "tensions": ["..."], "coherence_narrative": "..."},
  "campus_fit_rationale": "...",
  "confidence": <number 0-1>
}"#
    .to_string();

    let mut payload = String::new();
    let _ = writeln!(payload, "Target: {}", context.mode.display_name());
    let _ = writeln!(
        payload,
        "Overall score: {:.1} ({}), archetype: {}, percentile: {}",
        context.overall_score,
        context.tier.label(),
        context.archetype.label(),
        context.percentile.label()
    );
    let _ = writeln!(payload, "Coherence: {:.1}/10", context.coherence);
    let _ = writeln!(
        payload,
        "Emphasized dimensions: {}",
        context
            .emphasized
            .iter()
            .map(|dimension| dimension.label())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let _ = writeln!(payload, "\n## Dimension scores");
    for dimension in Dimension::ALL {
        let _ = writeln!(payload, "- {}: {:.1}", dimension.label(), context.score(dimension));
    }
    let _ = writeln!(payload, "\n## First impression\n{}", context.holistic.first_impression);

    ReasoningRequest {
        system_instructions,
        user_payload: payload,
        params: params.clone(),
    }
}

pub(crate) fn parse_narrative_response(text: &str) -> Result<Narrative, ParseError> {
    let payload = parse_narrative(text)?;
    Ok(Narrative {
        archetype_explanation: payload.archetype_explanation,
        hidden_strengths: payload
            .hidden_strengths
            .into_iter()
            .map(|strength| HiddenStrength {
                title: strength.title,
                narrative: strength.narrative,
                dimensions: strength.dimensions,
            })
            .collect(),
        synergies: payload.synergies,
        tensions: payload.tensions,
        coherence_narrative: payload.coherence_narrative,
        campus_fit_rationale: payload.campus_fit_rationale,
    })
}

/// Templated narrative derived only from the fixed numbers.
pub(crate) fn heuristic_narrative(context: &NarrativeContext<'_>) -> Narrative {
    let mut ranked: Vec<(Dimension, f64)> = Dimension::ALL
        .iter()
        .map(|dimension| (*dimension, context.score(*dimension)))
        .collect();
    ranked.sort_by(|left, right| right.1.total_cmp(&left.1));
    let leading: Vec<&str> = ranked
        .iter()
        .take(2)
        .map(|(dimension, _)| dimension.label())
        .collect();

    let archetype_explanation = format!(
        "{} profile with an overall score of {:.1}, led by {}.",
        context.archetype.label(),
        context.overall_score,
        leading.join(" and ")
    );

    let hidden_strengths = Dimension::ALL
        .iter()
        .filter(|dimension| !context.emphasized.contains(dimension))
        .filter(|dimension| context.score(**dimension) >= HIDDEN_STRENGTH_FLOOR)
        .map(|dimension| HiddenStrength {
            title: dimension.label().to_string(),
            narrative: format!(
                "Scores {:.1} in {}, a dimension {} weights below its priorities.",
                context.score(*dimension),
                dimension.label(),
                context.mode.display_name()
            ),
            dimensions: vec![*dimension],
        })
        .collect();

    let mut synergies = Vec::new();
    let mut tensions = Vec::new();
    for (left, right) in COMPLEMENTARY_PAIRS {
        let (left_score, right_score) = (context.score(left), context.score(right));
        if left_score >= SYNERGY_FLOOR && right_score >= SYNERGY_FLOOR {
            synergies.push(format!(
                "{} and {} reinforce each other ({left_score:.1} / {right_score:.1}).",
                left.label(),
                right.label()
            ));
        }
        for (high, high_score, low, low_score) in [
            (left, left_score, right, right_score),
            (right, right_score, left, left_score),
        ] {
            if high_score >= TENSION_PEAK && low_score <= TENSION_TROUGH {
                tensions.push(format!(
                    "{} is strong ({high_score:.1}) while {} lags ({low_score:.1}).",
                    high.label(),
                    low.label()
                ));
            }
        }
    }

    let coherence_narrative = if context.coherence >= 7.0 {
        "Scores are consistent across dimensions."
    } else if context.coherence >= 4.0 {
        "Scores are uneven across dimensions."
    } else {
        "Scores vary sharply across dimensions."
    }
    .to_string();

    let campus_fit_rationale = (!context.emphasized.is_empty()).then(|| {
        format!(
            "{} emphasizes {}.",
            context.mode.display_name(),
            context
                .emphasized
                .iter()
                .map(|dimension| {
                    format!("{} ({:.1})", dimension.label(), context.score(*dimension))
                })
                .collect::<Vec<_>>()
                .join(" and ")
        )
    });

    Narrative {
        archetype_explanation,
        hidden_strengths,
        synergies,
        tensions,
        coherence_narrative,
        campus_fit_rationale,
    }
}

/// Upper bound on overall confidence when the narrative is templated.
pub(crate) const HEURISTIC_NARRATIVE_CONFIDENCE: f64 = HEURISTIC_CONFIDENCE;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::portfolio::domain::EvaluationPath;

    fn holistic() -> HolisticImpression {
        HolisticImpression {
            first_impression: "Steady and thoughtful".to_string(),
            themes: Vec::new(),
            standout_signal: None,
            initial_band: Tier::Strong,
            confidence: 0.4,
            path: EvaluationPath::Heuristic,
        }
    }

    #[test]
    fn heuristic_narrative_reports_pairs_and_hidden_strengths() {
        let scores: BTreeMap<Dimension, f64> = Dimension::ALL
            .into_iter()
            .zip([9.0, 7.5, 8.0, 7.0, 3.5, 8.5])
            .collect();
        let emphasized = [Dimension::Academics, Dimension::Leadership];
        let holistic = holistic();
        let context = NarrativeContext {
            overall_score: 7.9,
            tier: Tier::Strong,
            archetype: Archetype::Scholar,
            percentile: PercentileBucket::Top10,
            mode: EvaluationMode::General,
            emphasized: &emphasized,
            scores: &scores,
            coherence: 5.8,
            holistic: &holistic,
        };

        let narrative = heuristic_narrative(&context);
        assert!(narrative.archetype_explanation.starts_with("Scholar profile"));
        assert_eq!(narrative.synergies.len(), 2);
        assert_eq!(narrative.tensions.len(), 1);
        assert!(narrative.tensions[0].starts_with("Future Readiness is strong"));
        let hidden: Vec<Dimension> = narrative
            .hidden_strengths
            .iter()
            .flat_map(|strength| strength.dimensions.clone())
            .collect();
        assert_eq!(
            hidden,
            vec![
                Dimension::IntellectualCuriosity,
                Dimension::CommunityImpact,
                Dimension::FutureReadiness
            ]
        );
        assert_eq!(narrative.coherence_narrative, "Scores are uneven across dimensions.");
    }

    #[test]
    fn narrative_prompt_carries_fixed_numbers() {
        let scores: BTreeMap<Dimension, f64> =
            Dimension::ALL.into_iter().map(|dimension| (dimension, 6.0)).collect();
        let holistic = holistic();
        let context = NarrativeContext {
            overall_score: 6.0,
            tier: Tier::Developing,
            archetype: Archetype::WellRounded,
            percentile: PercentileBucket::Top25,
            mode: EvaluationMode::UcDavis,
            emphasized: &[Dimension::Academics],
            scores: &scores,
            coherence: 10.0,
            holistic: &holistic,
        };
        let request = narrative_request(&context, &CallParams::default());
        assert!(request.user_payload.contains("Overall score: 6.0 (developing)"));
        assert!(request.user_payload.contains("Well-Rounded"));
        assert!(request.user_payload.contains("UC Davis"));
    }
}
