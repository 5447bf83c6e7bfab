use crate::workflows::portfolio::domain::{FLAG_HEURISTIC_SCORING, HEURISTIC_CONFIDENCE};
use crate::workflows::portfolio::signals::{Signal, TextSignals};

use super::rubric::{CategoryScore, RubricCategory, RubricPayload};

const BASE: f64 = 1.5;
const CATEGORY_BONUS: f64 = 0.5;

/// Signal increments applied to every category, with the category that earns a bonus.
const INCREMENTS: [(Signal, f64, Option<RubricCategory>); 5] = [
    (Signal::Reflection, 1.0, Some(RubricCategory::ReflectionMeaning)),
    (Signal::EmotionalLanguage, 1.0, Some(RubricCategory::CharacterInteriority)),
    (Signal::Dialogue, 1.0, Some(RubricCategory::DialogueScene)),
    (Signal::QuantifiedMetric, 0.5, Some(RubricCategory::QuantifiedImpact)),
    (Signal::SustainedDuration, 0.5, None),
];

/// Uncapped lexical scores; length caps are applied by the scorer on both paths.
pub(crate) fn heuristic_rubric(text: &str) -> RubricPayload {
    let signals = TextSignals::scan(text);
    let shared: f64 = BASE
        + INCREMENTS
            .iter()
            .filter(|(signal, _, _)| signals.has(*signal))
            .map(|(_, amount, _)| amount)
            .sum::<f64>();

    let categories = RubricCategory::ALL
        .into_iter()
        .map(|category| {
            let bonus = INCREMENTS
                .iter()
                .find(|(signal, _, target)| *target == Some(category) && signals.has(*signal))
                .map(|(signal, _, _)| *signal);
            CategoryScore {
                name: category,
                score: shared + bonus.map_or(0.0, |_| CATEGORY_BONUS),
                notes: bonus.and_then(|signal| signals.quote(signal)).map(str::to_string),
            }
        })
        .collect();

    RubricPayload {
        categories,
        flags: vec![FLAG_HEURISTIC_SCORING.to_string()],
        confidence: HEURISTIC_CONFIDENCE,
    }
}
