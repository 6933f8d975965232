//! Scoring Configuration
//!
//! Aggregation weights, squashing scale constants and classification
//! thresholds for the guild scorer. Every section carries `#[serde(default)]`
//! so a JSON file only needs to name the values it overrides.
//!
//! Weight sets are validated when the config is loaded and again when a
//! `GuildScorer` is built; an invalid set never reaches a scoring call.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tolerance for weight sets summing to 1.0
const WEIGHT_SUM_EPSILON: f64 = 1e-9;

/// Complete scorer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub negative_weights: NegativeWeights,
    pub positive_weights: PositiveWeights,
    pub scales: ScaleConstants,
    pub strategy: StrategyThresholds,
    pub climate: ClimateThresholds,
    /// Number of leading phylogenetic eigenvectors per species
    pub phylo_dimensions: usize,
    /// Size of the growth-form vocabulary used to normalize form diversity
    pub max_growth_forms: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            negative_weights: NegativeWeights::default(),
            positive_weights: PositiveWeights::default(),
            scales: ScaleConstants::default(),
            strategy: StrategyThresholds::default(),
            climate: ClimateThresholds::default(),
            phylo_dimensions: 10,
            max_growth_forms: 6,
        }
    }
}

/// Negative-side aggregation weights (must sum to 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegativeWeights {
    pub pathogen_overlap: f64,
    pub herbivore_overlap: f64,
    pub strategy_conflict: f64,
    pub nitrogen_fixation: f64,
    pub soil_ph: f64,
}

impl Default for NegativeWeights {
    fn default() -> Self {
        Self {
            pathogen_overlap: 0.35,
            herbivore_overlap: 0.35,
            strategy_conflict: 0.20,
            nitrogen_fixation: 0.05,
            soil_ph: 0.05,
        }
    }
}

impl NegativeWeights {
    pub fn sum(&self) -> f64 {
        self.pathogen_overlap
            + self.herbivore_overlap
            + self.strategy_conflict
            + self.nitrogen_fixation
            + self.soil_ph
    }
}

/// Positive-side aggregation weights (must sum to 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositiveWeights {
    pub biocontrol: f64,
    pub pathogen_antagonism: f64,
    pub beneficial_fungi: f64,
    pub phylo_diversity: f64,
    pub stratification: f64,
    pub shared_pollinators: f64,
}

impl Default for PositiveWeights {
    fn default() -> Self {
        Self {
            biocontrol: 0.25,
            pathogen_antagonism: 0.20,
            beneficial_fungi: 0.15,
            phylo_diversity: 0.20,
            stratification: 0.10,
            shared_pollinators: 0.10,
        }
    }
}

impl PositiveWeights {
    pub fn sum(&self) -> f64 {
        self.biocontrol
            + self.pathogen_antagonism
            + self.beneficial_fungi
            + self.phylo_diversity
            + self.stratification
            + self.shared_pollinators
    }
}

/// Empirically tuned squashing constants
///
/// Divisors are applied as `tanh(raw / scale)`. The two biocontrol constants
/// are multipliers on the per-pair density: `tanh(raw / pairs * scale)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConstants {
    pub pathogen_overlap: f64,
    pub herbivore_overlap: f64,
    pub biocontrol: f64,
    pub pathogen_antagonism: f64,
    pub beneficial_fungi: f64,
    pub phylo_distance: f64,
    /// Metres
    pub height_range: f64,
    pub shared_pollinators: f64,
}

impl Default for ScaleConstants {
    fn default() -> Self {
        Self {
            pathogen_overlap: 8.0,
            herbivore_overlap: 4.0,
            biocontrol: 20.0,
            pathogen_antagonism: 10.0,
            beneficial_fungi: 3.0,
            phylo_distance: 3.0,
            height_range: 10.0,
            shared_pollinators: 5.0,
        }
    }
}

impl ScaleConstants {
    fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("pathogen_overlap", self.pathogen_overlap),
            ("herbivore_overlap", self.herbivore_overlap),
            ("biocontrol", self.biocontrol),
            ("pathogen_antagonism", self.pathogen_antagonism),
            ("beneficial_fungi", self.beneficial_fungi),
            ("phylo_distance", self.phylo_distance),
            ("height_range", self.height_range),
            ("shared_pollinators", self.shared_pollinators),
        ]
    }
}

/// CSR classification and light-preference modulation thresholds
///
/// The light thresholds sit on the signed shade-to-sun gradient. They are a
/// threshold choice rather than a principled cutoff and stay tunable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyThresholds {
    /// strategy_C above this is High-Competitor
    pub high_competitor: f64,
    /// strategy_S above this is High-Stress-tolerator
    pub high_stress_tolerator: f64,
    /// strategy_R above this is High-Ruderal
    pub high_ruderal: f64,
    /// Light preference below this is markedly shade-adapted
    pub shade_adapted_below: f64,
    /// Light preference above this is markedly sun-loving
    pub sun_loving_above: f64,
    /// C-S multiplier when the stress-tolerator is shade-adapted
    pub shade_multiplier: f64,
    /// C-S multiplier when the stress-tolerator is sun-loving
    pub sun_multiplier: f64,
}

impl Default for StrategyThresholds {
    fn default() -> Self {
        Self {
            high_competitor: 60.0,
            high_stress_tolerator: 60.0,
            high_ruderal: 50.0,
            shade_adapted_below: -0.5,
            sun_loving_above: 0.5,
            shade_multiplier: 0.0,
            sun_multiplier: 1.5,
        }
    }
}

/// Climate filter thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateThresholds {
    /// Winter-hardiness overlap below `-hardiness_tolerance` vetoes (°C)
    pub hardiness_tolerance: f64,
    /// Consecutive dry days above which a species is drought-vulnerable
    pub drought_days: f64,
    /// Frost days above which a species is frost-vulnerable
    pub frost_days: f64,
    /// Hot days above which a species is heat-vulnerable
    pub heat_days: f64,
    /// Cold-spell days above which a species is cold-spell-vulnerable
    pub cold_spell_days: f64,
    /// Vulnerable members needed before a shared-vulnerability warning
    pub min_shared_vulnerable: usize,
}

impl Default for ClimateThresholds {
    fn default() -> Self {
        Self {
            hardiness_tolerance: 5.0,
            drought_days: 100.0,
            frost_days: 50.0,
            heat_days: 30.0,
            cold_spell_days: 20.0,
            min_shared_vulnerable: 2,
        }
    }
}

impl ScoringConfig {
    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ScoringConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check weight sums, scale constants and threshold ordering
    pub fn validate(&self) -> Result<(), ConfigError> {
        let negative_sum = self.negative_weights.sum();
        if (negative_sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ConfigError::WeightSum { side: "negative", sum: negative_sum });
        }

        let positive_sum = self.positive_weights.sum();
        if (positive_sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ConfigError::WeightSum { side: "positive", sum: positive_sum });
        }

        let negative = &self.negative_weights;
        let positive = &self.positive_weights;
        let all_weights = [
            negative.pathogen_overlap,
            negative.herbivore_overlap,
            negative.strategy_conflict,
            negative.nitrogen_fixation,
            negative.soil_ph,
            positive.biocontrol,
            positive.pathogen_antagonism,
            positive.beneficial_fungi,
            positive.phylo_diversity,
            positive.stratification,
            positive.shared_pollinators,
        ];
        if all_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::InvalidThreshold {
                name: "weights",
                detail: "every weight must be finite and non-negative".to_string(),
            });
        }

        for (name, value) in self.scales.named() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositiveScale { name, value });
            }
        }

        let strategy = &self.strategy;
        if strategy.shade_adapted_below > strategy.sun_loving_above {
            return Err(ConfigError::InvalidThreshold {
                name: "strategy.shade_adapted_below",
                detail: format!(
                    "{} exceeds sun_loving_above ({})",
                    strategy.shade_adapted_below, strategy.sun_loving_above
                ),
            });
        }
        if strategy.shade_multiplier < 0.0 || strategy.sun_multiplier < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "strategy.light multipliers",
                detail: "light multipliers must be non-negative".to_string(),
            });
        }

        if self.climate.hardiness_tolerance < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "climate.hardiness_tolerance",
                detail: format!("must be non-negative (got {})", self.climate.hardiness_tolerance),
            });
        }
        if self.climate.min_shared_vulnerable < 2 {
            return Err(ConfigError::InvalidThreshold {
                name: "climate.min_shared_vulnerable",
                detail: "a shared vulnerability needs at least 2 members".to_string(),
            });
        }

        if self.phylo_dimensions == 0 {
            return Err(ConfigError::InvalidThreshold {
                name: "phylo_dimensions",
                detail: "must be at least 1".to_string(),
            });
        }
        if self.max_growth_forms < 2 {
            return Err(ConfigError::InvalidThreshold {
                name: "max_growth_forms",
                detail: "must be at least 2".to_string(),
            });
        }

        Ok(())
    }
}
