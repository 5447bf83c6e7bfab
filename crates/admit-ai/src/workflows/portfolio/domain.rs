use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Confidence assigned to any value produced by a heuristic fallback.
pub const HEURISTIC_CONFIDENCE: f64 = 0.4;

/// Confidence assumed when the reasoning service omits one.
pub const DEFAULT_SERVICE_CONFIDENCE: f64 = 0.75;

pub const FLAG_HEURISTIC_SCORING: &str = "heuristic_scoring";
pub const FLAG_CREDIT_ERROR: &str = "credit_error";
pub const FLAG_TIER_REDERIVED: &str = "tier_rederived";
pub const FLAG_UNTRACED_QUOTES: &str = "untraced_quotes_dropped";

/// One scored facet of a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Academics,
    Leadership,
    IntellectualCuriosity,
    CommunityImpact,
    Authenticity,
    FutureReadiness,
}

impl Dimension {
    /// Fixed order; weighted sums are always accumulated in this order.
    pub const ALL: [Dimension; 6] = [
        Dimension::Academics,
        Dimension::Leadership,
        Dimension::IntellectualCuriosity,
        Dimension::CommunityImpact,
        Dimension::Authenticity,
        Dimension::FutureReadiness,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Academics => "academics",
            Dimension::Leadership => "leadership",
            Dimension::IntellectualCuriosity => "intellectual_curiosity",
            Dimension::CommunityImpact => "community_impact",
            Dimension::Authenticity => "authenticity",
            Dimension::FutureReadiness => "future_readiness",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Academics => "Academic Excellence",
            Dimension::Leadership => "Leadership & Initiative",
            Dimension::IntellectualCuriosity => "Intellectual Curiosity",
            Dimension::CommunityImpact => "Community Impact",
            Dimension::Authenticity => "Authenticity & Voice",
            Dimension::FutureReadiness => "Future Readiness",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "academics" | "academic" => Ok(Dimension::Academics),
            "leadership" => Ok(Dimension::Leadership),
            "intellectual_curiosity" | "curiosity" => Ok(Dimension::IntellectualCuriosity),
            "community_impact" | "community" => Ok(Dimension::CommunityImpact),
            "authenticity" | "voice" => Ok(Dimension::Authenticity),
            "future_readiness" | "future" => Ok(Dimension::FutureReadiness),
            _ => Err(UnknownDimension(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dimension '{0}'")]
pub struct UnknownDimension(pub String);

/// Qualitative band derived from a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Exceptional,
    Strong,
    Developing,
    Foundational,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Exceptional => "exceptional",
            Tier::Strong => "strong",
            Tier::Developing => "developing",
            Tier::Foundational => "foundational",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exceptional" => Some(Tier::Exceptional),
            "strong" => Some(Tier::Strong),
            "developing" => Some(Tier::Developing),
            "foundational" => Some(Tier::Foundational),
            _ => None,
        }
    }
}

/// Which rung of the reasoning ladder produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationPath {
    Primary,
    Retry,
    Heuristic,
}

impl EvaluationPath {
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationPath::Primary => "primary",
            EvaluationPath::Retry => "retry",
            EvaluationPath::Heuristic => "heuristic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    #[default]
    Uncommon,
    Rare,
    Exceptional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    #[default]
    Moderate,
    Significant,
}

/// A strength grounded in the applicant's own material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub text: String,
    pub supporting_quotes: Vec<String>,
    pub rarity: Rarity,
}

/// A growth area, optionally quoting the passage that exposes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub text: String,
    pub supporting_quotes: Vec<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReasoningNotes {
    pub summary: String,
    pub key_observations: Vec<String>,
    pub scoring_rationale: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparativeContext {
    pub percentile_estimate: Option<String>,
    pub typical_applicant: Option<String>,
    pub differentiator: Option<String>,
}

/// Normalized output of a single dimension analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionResult {
    pub dimension: Dimension,
    pub score: f64,
    pub tier: Tier,
    pub reasoning: ReasoningNotes,
    pub strengths: Vec<Evidence>,
    pub growth_areas: Vec<Gap>,
    pub comparative_context: ComparativeContext,
    pub confidence: f64,
    pub path: EvaluationPath,
    pub flags: Vec<String>,
}

/// First-pass read of the whole portfolio shared with every analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolisticImpression {
    pub first_impression: String,
    pub themes: Vec<String>,
    pub standout_signal: Option<String>,
    pub initial_band: Tier,
    pub confidence: f64,
    pub path: EvaluationPath,
}

/// Clamp into [0, 10]; non-finite values collapse to zero.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 10.0)
    } else {
        0.0
    }
}

pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Applicant record as supplied by the surrounding system.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub applicant_id: Option<String>,
    #[serde(default)]
    pub academics: Option<AcademicRecord>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub essays: Vec<Essay>,
    #[serde(default)]
    pub goals: Option<FutureGoals>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AcademicRecord {
    #[serde(default)]
    pub gpa_unweighted: Option<f64>,
    #[serde(default)]
    pub gpa_weighted: Option<f64>,
    #[serde(default)]
    pub class_rank: Option<ClassRank>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub test_scores: Vec<TestScore>,
    #[serde(default)]
    pub awards: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AcademicRecord {
    pub fn advanced_course_count(&self) -> usize {
        self.courses
            .iter()
            .filter(|course| course.level.is_advanced())
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRank {
    pub position: u32,
    pub class_size: u32,
}

impl ClassRank {
    /// Fraction of the class at or above this position. Positions are 1-based, so a zero
    /// position, an empty class or a position past the class size yields `None`.
    pub fn top_fraction(&self) -> Option<f64> {
        if self.position == 0 || self.class_size == 0 || self.position > self.class_size {
            return None;
        }
        Some(self.position as f64 / self.class_size as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default)]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseLevel {
    #[default]
    Standard,
    Honors,
    AdvancedPlacement,
    InternationalBaccalaureate,
    DualEnrollment,
}

impl CourseLevel {
    pub fn is_advanced(&self) -> bool {
        !matches!(self, CourseLevel::Standard)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CourseLevel::Standard => "standard",
            CourseLevel::Honors => "honors",
            CourseLevel::AdvancedPlacement => "AP",
            CourseLevel::InternationalBaccalaureate => "IB",
            CourseLevel::DualEnrollment => "dual enrollment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScore {
    pub name: String,
    pub score: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Activity {
    pub title: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub category: ActivityCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hours_per_week: Option<f32>,
    #[serde(default)]
    pub weeks_per_year: Option<u16>,
    #[serde(default)]
    pub years_active: Option<u8>,
}

impl Activity {
    /// Estimated total hours; missing years count as one.
    pub fn total_hours(&self) -> f64 {
        let hours = self.hours_per_week.unwrap_or(0.0).max(0.0) as f64;
        let weeks = self.weeks_per_year.unwrap_or(0) as f64;
        let years = self.years_active.unwrap_or(1).max(1) as f64;
        hours * weeks * years
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Academic,
    Arts,
    Athletics,
    CommunityService,
    Employment,
    Family,
    Research,
    StudentGovernment,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Essay {
    #[serde(default)]
    pub prompt: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FutureGoals {
    #[serde(default)]
    pub intended_major: Option<String>,
    #[serde(default)]
    pub career_interests: Vec<String>,
    #[serde(default)]
    pub statement: Option<String>,
}
