use thiserror::Error;

use crate::battle::skirmish::MatchPhase;
use crate::core::types::Faction;

#[derive(Error, Debug)]
pub enum SkirmishError {
    #[error("Unknown unit category: {0}")]
    UnknownCategory(String),

    #[error("Category {category} lists same-faction category {target} in its priority chain")]
    SameFactionTarget { category: String, target: String },

    #[error("Category registered twice: {0}")]
    DuplicateCategory(String),

    #[error("Faction {0} has no purchasable categories")]
    EmptyFaction(Faction),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot {operation} while match is {phase:?}")]
    InvalidPhase {
        operation: &'static str,
        phase: MatchPhase,
    },

    #[error("Player still has {remaining} gold to spend (cheapest unit costs {cheapest})")]
    GoldNotSpent { remaining: u32, cheapest: u32 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl SkirmishError {
    /// Errors that can only come from a bad roster or settings file
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SkirmishError::UnknownCategory(_)
                | SkirmishError::SameFactionTarget { .. }
                | SkirmishError::DuplicateCategory(_)
                | SkirmishError::EmptyFaction(_)
                | SkirmishError::InvalidConfig(_)
                | SkirmishError::TomlError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SkirmishError>;
