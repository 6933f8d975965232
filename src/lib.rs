//! Guild Compatibility Scoring Engine
//!
//! Scores a set of 2-10 plant species for companion-planting compatibility:
//! - `climate`: three-level climate filter (hard veto before any scoring)
//! - `metrics/`: five negative and six positive factors, each in [0, 1]
//! - `aggregator`: weighted combination into a final score in [-1, 1]
//! - `data`: read-only attribute and relationship stores, loaded with Polars
//! - `utils/`: normalization and shared-organism counting
//!
//! ```no_run
//! use guild_scorer_engine::{DataPaths, GuildData, GuildScorer, ScoringConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ScoringConfig::default();
//! let data = GuildData::load(&DataPaths::in_dir("data"), config.phylo_dimensions)?;
//! let scorer = GuildScorer::new(data, config)?;
//!
//! let breakdown = scorer.score_guild(&["wfo-0000832453", "wfo-0000649136"])?;
//! match breakdown.final_score() {
//!     Some(score) => println!("score {:.3} ({})", score, breakdown.interpretation.label),
//!     None => println!("vetoed: {:?}", breakdown.veto_reasons()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod breakdown;
pub mod climate;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod scorer;
pub mod species;
pub mod utils;

// Re-export commonly used types
pub use aggregator::Aggregator;
pub use breakdown::{
    FactorBreakdown, GuildOutcome, GuildScores, GuildWarning, ScoreBreakdown, ScoreInterpretation,
};
pub use climate::{check_climate_compatibility, ClimateAssessment, ClimateVerdict, StressKind, VetoReason};
pub use config::{
    ClimateThresholds, NegativeWeights, PositiveWeights, ScaleConstants, ScoringConfig,
    StrategyThresholds,
};
pub use data::{DataPaths, GuildData, GuildDataBuilder, LookupTables};
pub use error::{ConfigError, GuildError, GuildResult};
pub use metrics::{FactorDetail, FactorScore, NegativeFactor, PositiveFactor};
pub use scorer::{GuildScorer, RawScores, MAX_GUILD_SIZE, MIN_GUILD_SIZE};
pub use species::{
    ClimateEnvelope, ClimateRange, CsrStrategy, GrowthForm, RelationshipSets, SpeciesAttributes,
    StressExposure,
};
