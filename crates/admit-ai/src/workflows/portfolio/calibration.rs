use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Dimension, Tier};
use super::weights::ConfigurationError;

/// Lower bounds (inclusive) for the three upper tiers. Anything below
/// `developing` is foundational.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBreakpoints {
    pub exceptional: f64,
    pub strong: f64,
    pub developing: f64,
}

impl TierBreakpoints {
    pub const OVERALL: TierBreakpoints = TierBreakpoints {
        exceptional: 9.0,
        strong: 7.0,
        developing: 4.0,
    };

    pub fn new(exceptional: f64, strong: f64, developing: f64) -> Result<Self, ConfigurationError> {
        let breakpoints = Self {
            exceptional,
            strong,
            developing,
        };
        breakpoints.validate()?;
        Ok(breakpoints)
    }

    /// Default product calibration per dimension.
    pub const fn for_dimension(dimension: Dimension) -> TierBreakpoints {
        match dimension {
            Dimension::Academics => TierBreakpoints {
                exceptional: 9.0,
                strong: 7.5,
                developing: 5.0,
            },
            Dimension::Leadership | Dimension::CommunityImpact => TierBreakpoints {
                exceptional: 9.0,
                strong: 7.0,
                developing: 4.0,
            },
            Dimension::IntellectualCuriosity => TierBreakpoints {
                exceptional: 8.5,
                strong: 7.0,
                developing: 4.0,
            },
            Dimension::Authenticity => TierBreakpoints {
                exceptional: 8.5,
                strong: 6.5,
                developing: 4.0,
            },
            Dimension::FutureReadiness => TierBreakpoints {
                exceptional: 8.5,
                strong: 7.0,
                developing: 4.5,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let ordered = self.exceptional > self.strong && self.strong > self.developing;
        let bounded = self.developing > 0.0 && self.exceptional <= 10.0;
        let finite = [self.exceptional, self.strong, self.developing]
            .iter()
            .all(|value| value.is_finite());
        if ordered && bounded && finite {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidBreakpoints {
                exceptional: self.exceptional,
                strong: self.strong,
                developing: self.developing,
            })
        }
    }

    pub fn tier_for(&self, score: f64) -> Tier {
        if score >= self.exceptional {
            Tier::Exceptional
        } else if score >= self.strong {
            Tier::Strong
        } else if score >= self.developing {
            Tier::Developing
        } else {
            Tier::Foundational
        }
    }
}

/// Tier boundaries in force for one evaluator. Defaults mirror the product
/// tuning values; overrides are validated on insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    dimensions: BTreeMap<Dimension, TierBreakpoints>,
    overall: TierBreakpoints,
}

impl Default for Calibration {
    fn default() -> Self {
        let dimensions = Dimension::ALL
            .iter()
            .map(|dimension| (*dimension, TierBreakpoints::for_dimension(*dimension)))
            .collect();
        Self {
            dimensions,
            overall: TierBreakpoints::OVERALL,
        }
    }
}

impl Calibration {
    pub fn with_dimension(
        mut self,
        dimension: Dimension,
        breakpoints: TierBreakpoints,
    ) -> Result<Self, ConfigurationError> {
        breakpoints.validate()?;
        self.dimensions.insert(dimension, breakpoints);
        Ok(self)
    }

    pub fn with_overall(
        mut self,
        breakpoints: TierBreakpoints,
    ) -> Result<Self, ConfigurationError> {
        breakpoints.validate()?;
        self.overall = breakpoints;
        Ok(self)
    }

    pub fn breakpoints(&self, dimension: Dimension) -> TierBreakpoints {
        self.dimensions
            .get(&dimension)
            .copied()
            .unwrap_or_else(|| TierBreakpoints::for_dimension(dimension))
    }

    pub fn tier_for(&self, dimension: Dimension, score: f64) -> Tier {
        self.breakpoints(dimension).tier_for(score)
    }

    pub fn overall_tier(&self, score: f64) -> Tier {
        self.overall.tier_for(score)
    }
}
