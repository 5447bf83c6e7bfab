use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::info;

use super::analyzers::{heuristic_impression, DimensionAnalyzer, HolisticAnalyzer, ModeEmphasis};
use super::calibration::Calibration;
use super::domain::{Dimension, DimensionResult, Portfolio};
use super::inputs::{DimensionInput, InputError};
use super::ladder::{LadderPolicy, ReasoningLadder};
use super::reasoning::{CallParams, ReasoningClient};
use super::synthesis::{ArchetypeRules, PortfolioSynthesis, SynthesisEngine};
use super::weights::{ConfigurationError, EvaluationMode, WeightTableResolver};
use crate::workflows::entry::{EntryOptions, EntryScorer, RubricReport};

/// Facade over the analyzers, synthesis engine and entry scorer.
///
/// The reasoning client is injected so tests and offline runs can substitute their own.
pub struct PortfolioEvaluator {
    client: Arc<dyn ReasoningClient>,
    resolver: WeightTableResolver,
    calibration: Calibration,
    archetypes: ArchetypeRules,
    policy: LadderPolicy,
    params: CallParams,
    narrative_enabled: bool,
    default_mode: EvaluationMode,
}

impl PortfolioEvaluator {
    pub fn new(client: Arc<dyn ReasoningClient>) -> Result<Self, ConfigurationError> {
        Ok(Self {
            client,
            resolver: WeightTableResolver::builtin()?,
            calibration: Calibration::default(),
            archetypes: ArchetypeRules::default(),
            policy: LadderPolicy::default(),
            params: CallParams::default(),
            narrative_enabled: true,
            default_mode: EvaluationMode::General,
        })
    }

    pub fn with_weights(mut self, resolver: WeightTableResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_archetype_rules(mut self, rules: ArchetypeRules) -> Self {
        self.archetypes = rules;
        self
    }

    pub fn with_policy(mut self, policy: LadderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_params(mut self, params: CallParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_narrative(mut self, enabled: bool) -> Self {
        self.narrative_enabled = enabled;
        self
    }

    /// Mode used when a request names none.
    pub fn with_default_mode(mut self, mode: EvaluationMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn default_mode(&self) -> EvaluationMode {
        self.default_mode
    }

    pub fn resolver(&self) -> &WeightTableResolver {
        &self.resolver
    }

    /// Full pipeline: holistic read, six concurrent analyzers, then synthesis.
    pub async fn evaluate_portfolio(
        &self,
        portfolio: &Portfolio,
        mode: &str,
    ) -> Result<PortfolioSynthesis, EvaluationError> {
        let table = self.resolver.resolve_key(mode)?;
        let inputs = DimensionInput::all_from_portfolio(portfolio)?;

        let ladder = ReasoningLadder::new(self.client.as_ref(), self.policy);
        let holistic = HolisticAnalyzer::new(&ladder, &self.params)
            .analyze(portfolio)
            .await;

        let analyzer = DimensionAnalyzer::new(&ladder, &self.calibration, &self.params);
        let results = join_all(inputs.iter().map(|input| {
            let emphasis = ModeEmphasis {
                mode: table.mode(),
                weight: table.weight(input.dimension()),
            };
            analyzer.analyze(input, &holistic, emphasis)
        }))
        .await;

        let dimensions: BTreeMap<Dimension, DimensionResult> = results
            .into_iter()
            .map(|result| (result.dimension, result))
            .collect();

        let engine = SynthesisEngine::new(
            &ladder,
            &self.calibration,
            &self.archetypes,
            &self.params,
            self.narrative_enabled,
        );
        let synthesis = engine.synthesize(table, holistic, dimensions).await;
        info!(
            applicant = portfolio.applicant_id.as_deref().unwrap_or("anonymous"),
            mode = table.mode().key(),
            overall = synthesis.overall_score,
            "portfolio evaluated"
        );
        Ok(synthesis)
    }

    /// Score one dimension on its own, against a heuristic first impression.
    pub async fn evaluate_dimension(
        &self,
        portfolio: &Portfolio,
        dimension: Dimension,
        mode: &str,
    ) -> Result<DimensionResult, EvaluationError> {
        let table = self.resolver.resolve_key(mode)?;
        let input = DimensionInput::from_portfolio(portfolio, dimension)?;
        let holistic = heuristic_impression(portfolio);

        let ladder = ReasoningLadder::new(self.client.as_ref(), self.policy);
        let analyzer = DimensionAnalyzer::new(&ladder, &self.calibration, &self.params);
        let emphasis = ModeEmphasis {
            mode: table.mode(),
            weight: table.weight(dimension),
        };
        Ok(analyzer.analyze(&input, &holistic, emphasis).await)
    }

    pub async fn score_entry(&self, text: &str, options: &EntryOptions) -> RubricReport {
        let ladder = ReasoningLadder::new(self.client.as_ref(), self.policy);
        EntryScorer::new(&ladder, &self.params)
            .score(text, options)
            .await
    }

    pub async fn score_entry_bytes(&self, bytes: &[u8], options: &EntryOptions) -> RubricReport {
        let ladder = ReasoningLadder::new(self.client.as_ref(), self.policy);
        EntryScorer::new(&ladder, &self.params)
            .score_bytes(bytes, options)
            .await
    }
}

/// Problems surfaced to the caller before any service call. Service failures never appear here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Input(#[from] InputError),
}
