use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::Dimension;

/// Allowed drift between a table's weight sum and 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Evaluation context selecting which weight table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    General,
    UcBerkeley,
    Ucla,
    UcSanDiego,
    UcDavis,
}

impl EvaluationMode {
    pub const ALL: [EvaluationMode; 5] = [
        EvaluationMode::General,
        EvaluationMode::UcBerkeley,
        EvaluationMode::Ucla,
        EvaluationMode::UcSanDiego,
        EvaluationMode::UcDavis,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            EvaluationMode::General => "general",
            EvaluationMode::UcBerkeley => "uc_berkeley",
            EvaluationMode::Ucla => "ucla",
            EvaluationMode::UcSanDiego => "uc_san_diego",
            EvaluationMode::UcDavis => "uc_davis",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EvaluationMode::General => "a selective four-year college",
            EvaluationMode::UcBerkeley => "UC Berkeley",
            EvaluationMode::Ucla => "UCLA",
            EvaluationMode::UcSanDiego => "UC San Diego",
            EvaluationMode::UcDavis => "UC Davis",
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EvaluationMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        EvaluationMode::ALL
            .into_iter()
            .find(|mode| mode.key() == normalized)
            .ok_or_else(|| ConfigurationError::UnknownMode(value.to_string()))
    }
}

/// Errors for calibration that cannot be recovered locally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown evaluation mode '{0}'")]
    UnknownMode(String),
    #[error("weight table for {mode} sums to {sum:.6}, expected 1.0")]
    WeightSum { mode: String, sum: f64 },
    #[error("weight table for {mode} is missing dimension {dimension}")]
    MissingWeight { mode: String, dimension: Dimension },
    #[error("weight table for {mode} has invalid weight {weight} for {dimension}")]
    InvalidWeight {
        mode: String,
        dimension: Dimension,
        weight: f64,
    },
    #[error(
        "tier breakpoints must descend within (0, 10]: exceptional {exceptional}, strong {strong}, developing {developing}"
    )]
    InvalidBreakpoints {
        exceptional: f64,
        strong: f64,
        developing: f64,
    },
}

/// Dimension weights for one mode. Only constructible through validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTable {
    mode: EvaluationMode,
    weights: BTreeMap<Dimension, f64>,
}

impl WeightTable {
    pub fn new(
        mode: EvaluationMode,
        weights: BTreeMap<Dimension, f64>,
    ) -> Result<Self, ConfigurationError> {
        for dimension in Dimension::ALL {
            match weights.get(&dimension) {
                None => {
                    return Err(ConfigurationError::MissingWeight {
                        mode: mode.key().to_string(),
                        dimension,
                    })
                }
                Some(weight) if !weight.is_finite() || !(0.0..=1.0).contains(weight) => {
                    return Err(ConfigurationError::InvalidWeight {
                        mode: mode.key().to_string(),
                        dimension,
                        weight: *weight,
                    })
                }
                Some(_) => {}
            }
        }

        let sum: f64 = Dimension::ALL
            .iter()
            .filter_map(|dimension| weights.get(dimension))
            .sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigurationError::WeightSum {
                mode: mode.key().to_string(),
                sum,
            });
        }

        Ok(Self { mode, weights })
    }

    fn from_row(mode: EvaluationMode, row: [f64; 6]) -> Result<Self, ConfigurationError> {
        let weights = Dimension::ALL.into_iter().zip(row).collect();
        Self::new(mode, weights)
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    pub fn weight(&self, dimension: Dimension) -> f64 {
        self.weights.get(&dimension).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> &BTreeMap<Dimension, f64> {
        &self.weights
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|dimension| self.weight(*dimension)).sum()
    }

    /// Dimensions ordered by descending weight; ties keep `Dimension::ALL` order.
    pub fn ranked(&self) -> Vec<(Dimension, f64)> {
        let mut ranked: Vec<(Dimension, f64)> = Dimension::ALL
            .iter()
            .map(|dimension| (*dimension, self.weight(*dimension)))
            .collect();
        ranked.sort_by(|left, right| right.1.total_cmp(&left.1));
        ranked
    }
}

/// Built-in product weights, columns in `Dimension::ALL` order.
const BUILTIN_WEIGHTS: [(EvaluationMode, [f64; 6]); 5] = [
    (EvaluationMode::General, [0.30, 0.20, 0.20, 0.10, 0.10, 0.10]),
    (EvaluationMode::UcBerkeley, [0.30, 0.15, 0.25, 0.10, 0.10, 0.10]),
    (EvaluationMode::Ucla, [0.25, 0.20, 0.15, 0.20, 0.10, 0.10]),
    (EvaluationMode::UcSanDiego, [0.30, 0.10, 0.25, 0.10, 0.10, 0.15]),
    (EvaluationMode::UcDavis, [0.25, 0.15, 0.15, 0.20, 0.10, 0.15]),
];

/// Static lookup from mode to validated weight table.
#[derive(Debug, Clone)]
pub struct WeightTableResolver {
    tables: BTreeMap<EvaluationMode, WeightTable>,
}

impl WeightTableResolver {
    /// Validates every built-in table; a failure here is a calibration bug.
    pub fn builtin() -> Result<Self, ConfigurationError> {
        let tables = BUILTIN_WEIGHTS
            .iter()
            .map(|(mode, row)| WeightTable::from_row(*mode, *row).map(|table| (*mode, table)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self { tables })
    }

    pub fn with_override(mut self, table: WeightTable) -> Self {
        self.tables.insert(table.mode(), table);
        self
    }

    pub fn resolve(&self, mode: EvaluationMode) -> Result<&WeightTable, ConfigurationError> {
        self.tables
            .get(&mode)
            .ok_or_else(|| ConfigurationError::UnknownMode(mode.key().to_string()))
    }

    pub fn resolve_key(&self, mode: &str) -> Result<&WeightTable, ConfigurationError> {
        let mode = mode.parse::<EvaluationMode>()?;
        self.resolve(mode)
    }

    pub fn modes(&self) -> impl Iterator<Item = EvaluationMode> + '_ {
        self.tables.keys().copied()
    }
}
