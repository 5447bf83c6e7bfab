//! Scoring and synthesis engine for college-admissions portfolios.
//!
//! The [`workflows::portfolio`] module scores six dimensions through a reasoning
//! service with a deterministic fallback and combines them into a weighted assessment.
//! [`workflows::entry`] applies a writing rubric to single activity descriptions.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
