//! Portfolio scoring and synthesis.
//!
//! Each of the six dimensions is scored through the same reasoning ladder: a primary
//! call to the reasoning service, one identical retry, then a deterministic heuristic.
//! The weighted overall score, tier and archetype are always computed locally.

pub mod analyzers;
pub mod calibration;
pub mod domain;
pub mod inputs;
pub mod ladder;
pub mod parser;
pub mod reasoning;
pub mod router;
pub mod schema;
pub mod service;
pub mod signals;
pub mod synthesis;
pub mod weights;

#[cfg(test)]
mod tests;

pub use calibration::{Calibration, TierBreakpoints};
pub use domain::{
    AcademicRecord, Activity, ActivityCategory, ClassRank, ComparativeContext, Course,
    CourseLevel, Dimension, DimensionResult, EvaluationPath, Evidence, Essay, FutureGoals, Gap,
    HolisticImpression, Portfolio, Rarity, ReasoningNotes, Severity, TestScore, Tier,
    UnknownDimension,
};
pub use inputs::{DimensionInput, InputError};
pub use ladder::{AttemptFailure, LadderOutcome, LadderPolicy, ReasoningLadder};
pub use parser::ParseError;
pub use reasoning::{
    CallParams, HttpReasoningClient, OfflineReasoningClient, ReasoningClient, ReasoningError,
    ReasoningRequest,
};
pub use router::portfolio_router;
pub use service::{EvaluationError, PortfolioEvaluator};
pub use synthesis::{
    Archetype, ArchetypeRules, CampusAlignment, DimensionalInteractions, HiddenStrength,
    PercentileBucket, PortfolioSynthesis,
};
pub use weights::{ConfigurationError, EvaluationMode, WeightTable, WeightTableResolver};
