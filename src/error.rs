//! Error taxonomy for guild scoring
//!
//! Validation errors are fatal to a single scoring call. Configuration errors
//! are raised once, when a `ScoringConfig` is loaded or a `GuildScorer` is
//! built. A climate veto is NOT an error: it is a normal `GuildOutcome`.

use thiserror::Error;

/// Errors returned by a scoring call
#[derive(Error, Debug)]
pub enum GuildError {
    /// Guild size outside the supported range
    #[error("guild size {size} outside supported range [{min}, {max}]")]
    GuildSize { size: usize, min: usize, max: usize },

    /// The same identifier appears more than once in the guild
    #[error("duplicate species identifier in guild: {0}")]
    DuplicateSpecies(String),

    /// Identifier absent from the attribute store
    #[error("species not found in attribute store: {0}")]
    UnknownSpecies(String),

    /// Scorer built with an invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating a `ScoringConfig`
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A weight set does not sum to 1.0
    #[error("{side} weights sum to {sum}, expected 1.0")]
    WeightSum { side: &'static str, sum: f64 },

    /// A squashing scale constant is zero, negative or not finite
    #[error("scale constant '{name}' must be finite and positive (got {value})")]
    NonPositiveScale { name: &'static str, value: f64 },

    /// A threshold is out of order or out of range
    #[error("invalid threshold '{name}': {detail}")]
    InvalidThreshold { name: &'static str, detail: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type GuildResult<T> = Result<T, GuildError>;
