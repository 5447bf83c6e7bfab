//! Dimension analyzers: one generic analyzer parameterised by the input slice.

mod heuristics;
mod holistic;
mod prompts;

use tracing::debug;

use super::calibration::Calibration;
use super::domain::{
    clamp_score, round_one_decimal, Dimension, DimensionResult, EvaluationPath, Evidence, Gap,
    HolisticImpression, FLAG_CREDIT_ERROR, FLAG_TIER_REDERIVED, FLAG_UNTRACED_QUOTES,
};
use super::inputs::DimensionInput;
use super::ladder::ReasoningLadder;
use super::reasoning::CallParams;
use super::schema::{parse_dimension, DimensionPayload};
use super::signals::normalize_for_match;

pub(crate) use heuristics::heuristic_dimension;
pub use holistic::HolisticAnalyzer;
pub(crate) use holistic::heuristic_impression;
pub(crate) use prompts::ModeEmphasis;

pub struct DimensionAnalyzer<'a> {
    ladder: &'a ReasoningLadder<'a>,
    calibration: &'a Calibration,
    params: &'a CallParams,
}

impl<'a> DimensionAnalyzer<'a> {
    pub fn new(
        ladder: &'a ReasoningLadder<'a>,
        calibration: &'a Calibration,
        params: &'a CallParams,
    ) -> Self {
        Self {
            ladder,
            calibration,
            params,
        }
    }

    pub(crate) async fn analyze(
        &self,
        input: &DimensionInput,
        holistic: &HolisticImpression,
        emphasis: ModeEmphasis,
    ) -> DimensionResult {
        let dimension = input.dimension();
        let request = prompts::dimension_request(input, holistic, emphasis, self.params);
        let source = normalize_for_match(&input.source_text());

        let outcome = self
            .ladder
            .climb(
                dimension.key(),
                &request,
                |text| {
                    parse_dimension(text).map(|payload| {
                        normalize_payload(dimension, payload, &source, self.calibration)
                    })
                },
                || heuristic_dimension(input, self.calibration),
            )
            .await;

        let credit_error = outcome.credit_error();
        let mut result = outcome.value;
        result.path = outcome.path;
        if credit_error {
            result.flags.push(FLAG_CREDIT_ERROR.to_string());
        }
        result
    }
}

/// Clamp, re-derive the tier and drop quotes the applicant never wrote.
fn normalize_payload(
    dimension: Dimension,
    payload: DimensionPayload,
    source: &str,
    calibration: &Calibration,
) -> DimensionResult {
    let mut flags = Vec::new();
    let score = round_one_decimal(clamp_score(payload.score));
    let tier = calibration.tier_for(dimension, score);
    if tier != payload.advisory_tier {
        debug!(
            dimension = dimension.key(),
            score,
            advisory = payload.advisory_tier.label(),
            derived = tier.label(),
            "service tier disagrees with score; using derived tier"
        );
        flags.push(FLAG_TIER_REDERIVED.to_string());
    }

    let mut dropped = 0usize;
    let strengths: Vec<Evidence> = payload
        .strengths
        .into_iter()
        .map(|mut item| {
            dropped += retain_traceable(&mut item.supporting_quotes, source);
            item
        })
        .collect();
    let growth_areas: Vec<Gap> = payload
        .weaknesses
        .into_iter()
        .map(|mut item| {
            dropped += retain_traceable(&mut item.supporting_quotes, source);
            item
        })
        .collect();
    if dropped > 0 {
        debug!(dimension = dimension.key(), dropped, "dropped untraceable quotes");
        flags.push(FLAG_UNTRACED_QUOTES.to_string());
    }

    DimensionResult {
        dimension,
        score,
        tier,
        reasoning: payload.reasoning,
        strengths,
        growth_areas,
        comparative_context: payload.comparative_context,
        confidence: payload.confidence,
        path: EvaluationPath::Primary,
        flags,
    }
}

fn retain_traceable(quotes: &mut Vec<String>, source: &str) -> usize {
    let before = quotes.len();
    quotes.retain(|quote| {
        let needle = normalize_for_match(quote.trim_matches(|ch: char| ch == '"' || ch == '\''));
        !needle.is_empty() && source.contains(&needle)
    });
    before - quotes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::portfolio::domain::{ComparativeContext, ReasoningNotes, Rarity, Tier};

    fn payload(score: f64, tier: Tier, quotes: Vec<&str>) -> DimensionPayload {
        DimensionPayload {
            score,
            advisory_tier: tier,
            reasoning: ReasoningNotes::default(),
            strengths: vec![Evidence {
                text: "Builds things".to_string(),
                supporting_quotes: quotes.into_iter().map(str::to_string).collect(),
                rarity: Rarity::Uncommon,
            }],
            weaknesses: Vec::new(),
            comparative_context: ComparativeContext::default(),
            confidence: 0.8,
        }
    }

    #[test]
    fn out_of_range_scores_are_clamped_and_tier_rederived() {
        let source = normalize_for_match("I built a robot.");
        let result = normalize_payload(
            Dimension::Leadership,
            payload(14.0, Tier::Developing, vec![]),
            &source,
            &Calibration::default(),
        );
        assert_eq!(result.score, 10.0);
        assert_eq!(result.tier, Tier::Exceptional);
        assert_eq!(result.flags, vec![FLAG_TIER_REDERIVED.to_string()]);

        let negative = normalize_payload(
            Dimension::Leadership,
            payload(-3.0, Tier::Foundational, vec![]),
            &source,
            &Calibration::default(),
        );
        assert_eq!(negative.score, 0.0);
        assert!(negative.flags.is_empty());
    }

    #[test]
    fn invented_quotes_are_dropped() {
        let source = normalize_for_match("I built a   robot\nwith my sister.");
        let result = normalize_payload(
            Dimension::Leadership,
            payload(
                5.0,
                Tier::Developing,
                vec!["\"I Built a robot with my sister\"", "I won a Nobel prize"],
            ),
            &source,
            &Calibration::default(),
        );
        assert_eq!(
            result.strengths[0].supporting_quotes,
            vec!["\"I Built a robot with my sister\"".to_string()]
        );
        assert!(result.flags.contains(&FLAG_UNTRACED_QUOTES.to_string()));
    }
}
