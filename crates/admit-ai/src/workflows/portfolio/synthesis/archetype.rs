use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::Dimension;

/// Profile shape derived from the six dimension scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Scholar,
    Leader,
    WellRounded,
    Specialist,
    Emerging,
}

impl Archetype {
    pub fn label(&self) -> &'static str {
        match self {
            Archetype::Scholar => "Scholar",
            Archetype::Leader => "Leader",
            Archetype::WellRounded => "Well-Rounded",
            Archetype::Specialist => "Specialist",
            Archetype::Emerging => "Emerging",
        }
    }
}

/// Archetype thresholds. Rules are checked in precedence order; first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeRules {
    pub scholar_academics: f64,
    pub scholar_curiosity: f64,
    pub leader_leadership: f64,
    pub leader_community: f64,
    pub well_rounded_floor: f64,
    pub specialist_peak: f64,
}

impl Default for ArchetypeRules {
    fn default() -> Self {
        Self {
            scholar_academics: 8.0,
            scholar_curiosity: 7.0,
            leader_leadership: 7.0,
            leader_community: 7.0,
            well_rounded_floor: 6.0,
            specialist_peak: 8.0,
        }
    }
}

impl ArchetypeRules {
    pub fn classify(&self, scores: &BTreeMap<Dimension, f64>) -> Archetype {
        let score = |dimension: Dimension| scores.get(&dimension).copied().unwrap_or(0.0);

        if score(Dimension::Academics) >= self.scholar_academics
            && score(Dimension::IntellectualCuriosity) >= self.scholar_curiosity
        {
            return Archetype::Scholar;
        }
        if score(Dimension::Leadership) >= self.leader_leadership
            && score(Dimension::CommunityImpact) >= self.leader_community
        {
            return Archetype::Leader;
        }
        if Dimension::ALL
            .iter()
            .all(|dimension| score(*dimension) >= self.well_rounded_floor)
        {
            return Archetype::WellRounded;
        }
        if Dimension::ALL
            .iter()
            .any(|dimension| score(*dimension) >= self.specialist_peak)
        {
            return Archetype::Specialist;
        }
        Archetype::Emerging
    }
}

/// Coarse position of the overall score in the applicant pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PercentileBucket {
    #[serde(rename = "top_1")]
    Top1,
    #[serde(rename = "top_5")]
    Top5,
    #[serde(rename = "top_10")]
    Top10,
    #[serde(rename = "top_25")]
    Top25,
    #[serde(rename = "top_50")]
    Top50,
    #[serde(rename = "below_median")]
    BelowMedian,
}

impl PercentileBucket {
    pub fn from_overall(score: f64) -> Self {
        if score >= 9.0 {
            PercentileBucket::Top1
        } else if score >= 8.0 {
            PercentileBucket::Top5
        } else if score >= 7.0 {
            PercentileBucket::Top10
        } else if score >= 6.0 {
            PercentileBucket::Top25
        } else if score >= 5.0 {
            PercentileBucket::Top50
        } else {
            PercentileBucket::BelowMedian
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PercentileBucket::Top1 => "top 1%",
            PercentileBucket::Top5 => "top 5%",
            PercentileBucket::Top10 => "top 10%",
            PercentileBucket::Top25 => "top 25%",
            PercentileBucket::Top50 => "top 50%",
            PercentileBucket::BelowMedian => "below median",
        }
    }
}
