use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::item::{Item, Pair};
use crate::loader::LoadError;

/// Pipeline step that reported a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    ItemFrequency,
    ItemSupport,
    PairFrequency,
    PairSupport,
    RuleGeneration,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ItemFrequency => "item_frequency",
            Self::ItemSupport => "item_support",
            Self::PairFrequency => "pair_frequency",
            Self::PairSupport => "pair_support",
            Self::RuleGeneration => "rule_generation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum MiningError {
    #[error("{stage}: dataset has zero transactions, support is undefined")]
    EmptyDataset { stage: Stage },
    #[error("rule_generation: item `{item}` of pair ({pair}) has no single-item support")]
    MissingKey { item: Item, pair: Pair },
    #[error("rule_generation: item `{item}` of pair ({pair}) has non-positive support {support}")]
    NonPositiveSupport { item: Item, pair: Pair, support: f64 },
    #[error("invalid threshold `{name}` = {value}: must be a finite value in [0, 1]")]
    InvalidThreshold { name: &'static str, value: f64 },
}

impl MiningError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::EmptyDataset { stage } => Some(*stage),
            Self::MissingKey { .. } | Self::NonPositiveSupport { .. } => {
                Some(Stage::RuleGeneration)
            }
            Self::InvalidThreshold { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Mining(#[from] MiningError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl ApplicationError {
    /// Stable machine-readable class used in structured command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Mining(MiningError::EmptyDataset { .. }) => "empty_dataset",
            Self::Mining(MiningError::MissingKey { .. }) => "missing_key",
            Self::Mining(MiningError::NonPositiveSupport { .. }) => "invalid_support",
            Self::Mining(MiningError::InvalidThreshold { .. }) => "invalid_threshold",
            Self::Load(_) => "load",
            Self::Configuration(ConfigError::Threshold(_)) => "invalid_threshold",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) | Self::Mining(MiningError::InvalidThreshold { .. }) => 2,
            Self::Load(_) => 3,
            Self::Mining(_) => 4,
        }
    }
}
