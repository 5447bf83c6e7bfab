//! Combines six dimension results into a weighted, mode-aware assessment.
//!
//! Every numeric field is computed locally from the dimension scores and the weight
//! table. The reasoning service only contributes explanatory text.

mod archetype;
mod narrative;

pub use archetype::{Archetype, ArchetypeRules, PercentileBucket};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::calibration::Calibration;
use super::domain::{
    clamp_score, round_one_decimal, Dimension, DimensionResult, EvaluationPath, HolisticImpression,
    Tier, FLAG_CREDIT_ERROR,
};
use super::ladder::{LadderOutcome, ReasoningLadder};
use super::reasoning::CallParams;
use super::weights::{EvaluationMode, WeightTable};
use narrative::{
    heuristic_narrative, narrative_request, parse_narrative_response, NarrativeContext,
    HEURISTIC_NARRATIVE_CONFIDENCE,
};

pub const FLAG_HEURISTIC_NARRATIVE: &str = "heuristic_narrative";
pub const FLAG_NARRATIVE_DISABLED: &str = "narrative_disabled";
pub const DEGRADED_DIMENSION_PREFIX: &str = "degraded_dimension:";

/// Dimensions a mode emphasizes in campus alignment.
const EMPHASIZED_DIMENSIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenStrength {
    pub title: String,
    pub narrative: String,
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionalInteractions {
    pub synergies: Vec<String>,
    pub tensions: Vec<String>,
    /// 10 when all six scores agree; lower as they spread.
    pub coherence: f64,
    pub narrative: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusAlignment {
    pub mode: EvaluationMode,
    pub emphasized: Vec<Dimension>,
    pub alignment_score: f64,
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSynthesis {
    pub overall_score: f64,
    pub tier: Tier,
    pub archetype: Archetype,
    pub percentile_bucket: PercentileBucket,
    pub mode: EvaluationMode,
    pub dimensions: BTreeMap<Dimension, DimensionResult>,
    pub holistic: HolisticImpression,
    pub archetype_explanation: String,
    pub hidden_strengths: Vec<HiddenStrength>,
    pub dimensional_interactions: DimensionalInteractions,
    pub campus_alignment: CampusAlignment,
    pub narrative_path: EvaluationPath,
    pub confidence: f64,
    pub flags: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
}

/// Weighted sum accumulated in `Dimension::ALL` order, rounded to one decimal.
pub fn overall_score(table: &WeightTable, scores: &BTreeMap<Dimension, f64>) -> f64 {
    let total: f64 = Dimension::ALL
        .iter()
        .map(|dimension| {
            clamp_score(scores.get(dimension).copied().unwrap_or(0.0)) * table.weight(*dimension)
        })
        .sum();
    round_one_decimal(clamp_score(total))
}

/// `10 - 2 * population standard deviation`, clamped to [0, 10].
pub fn coherence(scores: &BTreeMap<Dimension, f64>) -> f64 {
    let values: Vec<f64> = Dimension::ALL
        .iter()
        .map(|dimension| scores.get(dimension).copied().unwrap_or(0.0))
        .collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    round_one_decimal(clamp_score(10.0 - 2.0 * variance.sqrt()))
}

/// Weight-normalised mean over the mode's most heavily weighted dimensions.
pub fn campus_alignment(table: &WeightTable, scores: &BTreeMap<Dimension, f64>) -> CampusAlignment {
    let emphasized: Vec<(Dimension, f64)> =
        table.ranked().into_iter().take(EMPHASIZED_DIMENSIONS).collect();
    let weight_total: f64 = emphasized.iter().map(|(_, weight)| weight).sum();
    let alignment_score = if weight_total > 0.0 {
        let weighted: f64 = emphasized
            .iter()
            .map(|(dimension, weight)| scores.get(dimension).copied().unwrap_or(0.0) * weight)
            .sum();
        round_one_decimal(clamp_score(weighted / weight_total))
    } else {
        0.0
    };

    CampusAlignment {
        mode: table.mode(),
        emphasized: emphasized.into_iter().map(|(dimension, _)| dimension).collect(),
        alignment_score,
        rationale: None,
    }
}

pub struct SynthesisEngine<'a> {
    ladder: &'a ReasoningLadder<'a>,
    calibration: &'a Calibration,
    rules: &'a ArchetypeRules,
    params: &'a CallParams,
    narrative_enabled: bool,
}

impl<'a> SynthesisEngine<'a> {
    pub fn new(
        ladder: &'a ReasoningLadder<'a>,
        calibration: &'a Calibration,
        rules: &'a ArchetypeRules,
        params: &'a CallParams,
        narrative_enabled: bool,
    ) -> Self {
        Self {
            ladder,
            calibration,
            rules,
            params,
            narrative_enabled,
        }
    }

    pub async fn synthesize(
        &self,
        table: &WeightTable,
        holistic: HolisticImpression,
        dimensions: BTreeMap<Dimension, DimensionResult>,
    ) -> PortfolioSynthesis {
        let scores: BTreeMap<Dimension, f64> = dimensions
            .iter()
            .map(|(dimension, result)| (*dimension, result.score))
            .collect();

        let overall = overall_score(table, &scores);
        let tier = self.calibration.overall_tier(overall);
        let archetype = self.rules.classify(&scores);
        let percentile = PercentileBucket::from_overall(overall);
        let coherence = coherence(&scores);
        let mut alignment = campus_alignment(table, &scores);

        let context = NarrativeContext {
            overall_score: overall,
            tier,
            archetype,
            percentile,
            mode: table.mode(),
            emphasized: &alignment.emphasized,
            scores: &scores,
            coherence,
            holistic: &holistic,
        };

        let outcome = if self.narrative_enabled {
            let request = narrative_request(&context, self.params);
            self.ladder
                .climb("narrative", &request, parse_narrative_response, || {
                    heuristic_narrative(&context)
                })
                .await
        } else {
            ReasoningLadder::heuristic_only("narrative", || heuristic_narrative(&context))
        };

        let flags = self.collect_flags(&dimensions, &outcome);
        let confidence = self.confidence(&dimensions, outcome.path);
        let narrative = outcome.value;
        alignment.rationale = narrative.campus_fit_rationale;

        info!(
            mode = table.mode().key(),
            overall,
            tier = tier.label(),
            archetype = archetype.label(),
            narrative_path = outcome.path.label(),
            "portfolio synthesized"
        );

        PortfolioSynthesis {
            overall_score: overall,
            tier,
            archetype,
            percentile_bucket: percentile,
            mode: table.mode(),
            dimensions,
            holistic,
            archetype_explanation: narrative.archetype_explanation,
            hidden_strengths: narrative.hidden_strengths,
            dimensional_interactions: DimensionalInteractions {
                synergies: narrative.synergies,
                tensions: narrative.tensions,
                coherence,
                narrative: narrative.coherence_narrative,
            },
            campus_alignment: alignment,
            narrative_path: outcome.path,
            confidence,
            flags,
            evaluated_at: Utc::now(),
        }
    }

    fn confidence(
        &self,
        dimensions: &BTreeMap<Dimension, DimensionResult>,
        narrative_path: EvaluationPath,
    ) -> f64 {
        let mean = if dimensions.is_empty() {
            0.0
        } else {
            dimensions.values().map(|result| result.confidence).sum::<f64>()
                / dimensions.len() as f64
        };
        let mean = (mean * 100.0).round() / 100.0;
        if self.narrative_enabled && narrative_path == EvaluationPath::Heuristic {
            mean.min(HEURISTIC_NARRATIVE_CONFIDENCE)
        } else {
            mean
        }
    }

    fn collect_flags<T>(
        &self,
        dimensions: &BTreeMap<Dimension, DimensionResult>,
        narrative: &LadderOutcome<T>,
    ) -> Vec<String> {
        let mut flags: Vec<String> = Vec::new();
        let mut push = |flag: String| {
            if !flags.contains(&flag) {
                flags.push(flag);
            }
        };

        for dimension in Dimension::ALL {
            if let Some(result) = dimensions.get(&dimension) {
                for flag in &result.flags {
                    push(flag.clone());
                }
            }
        }
        for dimension in Dimension::ALL {
            if dimensions
                .get(&dimension)
                .is_some_and(|result| result.path == EvaluationPath::Heuristic)
            {
                push(format!("{DEGRADED_DIMENSION_PREFIX}{}", dimension.key()));
            }
        }
        if !self.narrative_enabled {
            push(FLAG_NARRATIVE_DISABLED.to_string());
        } else if narrative.path == EvaluationPath::Heuristic {
            push(FLAG_HEURISTIC_NARRATIVE.to_string());
        }
        if narrative.credit_error() {
            push(FLAG_CREDIT_ERROR.to_string());
        }
        flags
    }
}
