use std::sync::Arc;

use super::common::{evaluator, portfolio, scenario_scores, ScriptedClient, StageClient};
use crate::workflows::portfolio::domain::{
    Dimension, EvaluationPath, Tier, FLAG_HEURISTIC_SCORING, FLAG_TIER_REDERIVED,
};
use crate::workflows::portfolio::synthesis::{
    Archetype, PercentileBucket, DEGRADED_DIMENSION_PREFIX, FLAG_HEURISTIC_NARRATIVE,
    FLAG_NARRATIVE_DISABLED,
};
use crate::workflows::portfolio::{
    Calibration, ConfigurationError, EvaluationError, EvaluationMode, InputError,
    OfflineReasoningClient,
};

#[tokio::test]
async fn scripted_scores_flow_into_weighted_synthesis() {
    let client = Arc::new(StageClient::new(scenario_scores()));
    let evaluator = evaluator(client.clone());

    let synthesis = evaluator
        .evaluate_portfolio(&portfolio(), "general")
        .await
        .expect("portfolio evaluates");

    assert_eq!(synthesis.overall_score, 7.4);
    assert_eq!(synthesis.tier, Tier::Strong);
    assert_eq!(synthesis.archetype, Archetype::Scholar);
    assert_eq!(synthesis.percentile_bucket, PercentileBucket::Top10);
    assert_eq!(synthesis.mode, EvaluationMode::General);
    assert_eq!(synthesis.narrative_path, EvaluationPath::Primary);
    assert_eq!(synthesis.holistic.initial_band, Tier::Strong);
    assert_eq!(synthesis.confidence, 0.8);
    assert_eq!(
        synthesis.campus_alignment.rationale.as_deref(),
        Some("Strong research fit.")
    );
    // One holistic read, six dimensions, one narrative.
    assert_eq!(client.calls(), 8);

    let academics = &synthesis.dimensions[&Dimension::Academics];
    assert_eq!(academics.score, 8.0);
    assert_eq!(academics.tier, Tier::Strong);
    assert_eq!(academics.path, EvaluationPath::Primary);
    assert!(academics.flags.iter().any(|flag| flag == FLAG_TIER_REDERIVED));
    assert!(!synthesis
        .flags
        .iter()
        .any(|flag| flag.starts_with(DEGRADED_DIMENSION_PREFIX)));
}

#[tokio::test]
async fn broken_narrative_falls_back_without_touching_numbers() {
    let client = Arc::new(StageClient::new(scenario_scores()).with_broken_narrative());
    let evaluator = evaluator(client.clone());

    let synthesis = evaluator
        .evaluate_portfolio(&portfolio(), "general")
        .await
        .expect("portfolio evaluates");

    assert_eq!(synthesis.overall_score, 7.4);
    assert_eq!(synthesis.narrative_path, EvaluationPath::Heuristic);
    assert_eq!(client.narrative_calls(), 2);
    assert!(synthesis.confidence <= 0.4);
    assert!(synthesis.flags.iter().any(|flag| flag == FLAG_HEURISTIC_NARRATIVE));
    assert!(!synthesis.archetype_explanation.is_empty());
}

#[tokio::test]
async fn disabled_narrative_skips_the_service() {
    let client = Arc::new(StageClient::new(scenario_scores()));
    let evaluator = evaluator(client.clone()).with_narrative(false);

    let synthesis = evaluator
        .evaluate_portfolio(&portfolio(), "general")
        .await
        .expect("portfolio evaluates");

    assert_eq!(client.calls(), 7);
    assert_eq!(client.narrative_calls(), 0);
    assert_eq!(synthesis.confidence, 0.8);
    assert!(synthesis.flags.iter().any(|flag| flag == FLAG_NARRATIVE_DISABLED));
    assert!(!synthesis.flags.iter().any(|flag| flag == FLAG_HEURISTIC_NARRATIVE));
}

#[tokio::test]
async fn offline_evaluation_is_total_and_tier_consistent() {
    let evaluator = evaluator(Arc::new(OfflineReasoningClient));
    let calibration = Calibration::default();

    let synthesis = evaluator
        .evaluate_portfolio(&portfolio(), "uc_berkeley")
        .await
        .expect("offline evaluation still succeeds");

    assert_eq!(synthesis.dimensions.len(), 6);
    for (dimension, result) in &synthesis.dimensions {
        assert_eq!(result.path, EvaluationPath::Heuristic);
        assert!((0.0..=10.0).contains(&result.score));
        assert_eq!(result.tier, calibration.tier_for(*dimension, result.score));
        assert!(result.flags.iter().any(|flag| flag == FLAG_HEURISTIC_SCORING));
        let degraded = format!("{DEGRADED_DIMENSION_PREFIX}{}", dimension.key());
        assert!(synthesis.flags.contains(&degraded));
    }
    assert_eq!(synthesis.holistic.path, EvaluationPath::Heuristic);
    assert_eq!(synthesis.tier, calibration.overall_tier(synthesis.overall_score));
    assert!(synthesis.confidence <= 0.4);
}

#[tokio::test]
async fn repeated_evaluations_agree_exactly() {
    let first = evaluator(Arc::new(StageClient::new(scenario_scores())))
        .evaluate_portfolio(&portfolio(), "ucla")
        .await
        .expect("first run");
    let second = evaluator(Arc::new(StageClient::new(scenario_scores())))
        .evaluate_portfolio(&portfolio(), "ucla")
        .await
        .expect("second run");

    assert_eq!(first.overall_score.to_bits(), second.overall_score.to_bits());
    assert_eq!(first.tier, second.tier);
    assert_eq!(first.archetype, second.archetype);
    assert_eq!(first.flags, second.flags);
}

#[tokio::test]
async fn unknown_mode_is_rejected_before_any_call() {
    let client = Arc::new(StageClient::new(scenario_scores()));
    let evaluator = evaluator(client.clone());

    let err = evaluator
        .evaluate_portfolio(&portfolio(), "mit")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EvaluationError::Configuration(ConfigurationError::UnknownMode("mit".to_string()))
    );
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn missing_academics_is_an_input_error() {
    let client = Arc::new(StageClient::new(scenario_scores()));
    let evaluator = evaluator(client.clone());
    let mut incomplete = portfolio();
    incomplete.academics = None;

    let err = evaluator
        .evaluate_portfolio(&incomplete, "general")
        .await
        .unwrap_err();

    assert_eq!(err, EvaluationError::Input(InputError::MissingField("academics")));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn single_dimension_survives_garbage_responses() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok("<html>502 Bad Gateway</html>".to_string()),
        Ok("```json\n{\"dimension_score\": 7}\n```".to_string()),
    ]));
    let evaluator = evaluator(client.clone());

    let result = evaluator
        .evaluate_dimension(&portfolio(), Dimension::CommunityImpact, "general")
        .await
        .expect("dimension evaluates");

    assert_eq!(result.dimension, Dimension::CommunityImpact);
    assert_eq!(result.path, EvaluationPath::Heuristic);
    assert!(result.flags.iter().any(|flag| flag == FLAG_HEURISTIC_SCORING));
    assert_eq!(client.calls(), 2);
}
