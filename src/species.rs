//! Per-species records consumed by the scorer
//!
//! `SpeciesAttributes` is one row of the attribute store; `RelationshipSets`
//! is one row of the relationship store. Both are read-only once a
//! `GuildData` is built.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Competitor / stress-tolerator / ruderal percentages (sum to 100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CsrStrategy {
    pub c: f64,
    pub s: f64,
    pub r: f64,
}

/// Allowed distance of C + S + R from 100 (percentages are stored rounded)
pub const CSR_SUM_TOLERANCE: f64 = 1.0;

impl CsrStrategy {
    /// Build a strategy triple; a missing or non-finite component, or a
    /// triple that is not a percentage split, means the species sits outside
    /// the calibration space and has no strategy at all.
    pub fn from_components(c: Option<f64>, s: Option<f64>, r: Option<f64>) -> Option<Self> {
        match (c, s, r) {
            (Some(c), Some(s), Some(r)) => Some(Self { c, s, r }).filter(Self::is_valid),
            _ => None,
        }
    }

    /// Finite, non-negative components summing to 100
    pub fn is_valid(&self) -> bool {
        let components = [self.c, self.s, self.r];
        components.iter().all(|v| v.is_finite() && *v >= 0.0)
            && (components.iter().sum::<f64>() - 100.0).abs() <= CSR_SUM_TOLERANCE
    }
}

/// Growth form category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthForm {
    Tree,
    Shrub,
    Herb,
    Graminoid,
    Vine,
    Fern,
    Other,
}

impl GrowthForm {
    /// Parse a free-text growth form label (TRY style: "shrub/tree", "liana", ...)
    ///
    /// Climbers win over trees, and trees over shrubs, so "shrub/tree" is a
    /// tree and "woody liana" is a vine.
    pub fn parse(label: &str) -> Self {
        let form = label.trim().to_lowercase();
        if form.contains("vine") || form.contains("liana") || form.contains("climber") {
            GrowthForm::Vine
        } else if form.contains("tree") {
            GrowthForm::Tree
        } else if form.contains("shrub") {
            GrowthForm::Shrub
        } else if form.contains("gramin") || form.contains("grass") {
            GrowthForm::Graminoid
        } else if form.contains("herb") || form.contains("forb") {
            GrowthForm::Herb
        } else if form.contains("fern") {
            GrowthForm::Fern
        } else {
            GrowthForm::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthForm::Tree => "tree",
            GrowthForm::Shrub => "shrub",
            GrowthForm::Herb => "herb",
            GrowthForm::Graminoid => "graminoid",
            GrowthForm::Vine => "vine",
            GrowthForm::Fern => "fern",
            GrowthForm::Other => "other",
        }
    }
}

impl fmt::Display for GrowthForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed interval of a climate variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateRange {
    pub min: f64,
    pub max: f64,
}

impl ClimateRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Extreme-stress exposure indicators (days per year, upper quantile)
///
/// `None` means the indicator is unknown for the species, which never
/// counts as vulnerable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StressExposure {
    pub drought: Option<f64>,
    pub frost: Option<f64>,
    pub heat: Option<f64>,
    pub cold_spell: Option<f64>,
}

/// Climate tolerance envelope of a species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateEnvelope {
    /// Annual mean temperature tolerance (°C)
    pub temperature: ClimateRange,
    /// Coldest-month minimum temperature tolerance (°C)
    pub winter_hardiness: ClimateRange,
    /// Annual precipitation tolerance (mm); optional
    pub precipitation: Option<ClimateRange>,
    pub stress: StressExposure,
}

/// One attribute-store record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesAttributes {
    pub id: String,
    /// Absent when the traits fall outside the CSR calibration space
    pub strategy: Option<CsrStrategy>,
    pub height_m: f64,
    pub growth_form: GrowthForm,
    /// Signed shade-to-sun gradient
    pub light_preference: Option<f64>,
    pub nitrogen_fixation: bool,
    pub soil_ph_mean: Option<f64>,
    /// First N phylogenetic eigenvectors
    pub phylo_embedding: Option<Vec<f64>>,
    pub climate: ClimateEnvelope,
}

/// One relationship-store record: associated organisms by ecological role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipSets {
    pub herbivores: FxHashSet<String>,
    pub pollinators: FxHashSet<String>,
    pub flower_visitors: FxHashSet<String>,
    /// Animals associated through non-pollination relationships
    pub predators: FxHashSet<String>,
    pub pathogenic_fungi: FxHashSet<String>,
    /// Subset of `pathogenic_fungi` flagged host-specific
    pub host_specific_pathogens: FxHashSet<String>,
    pub amf_fungi: FxHashSet<String>,
    pub emf_fungi: FxHashSet<String>,
    pub endophytic_fungi: FxHashSet<String>,
    pub saprotrophic_fungi: FxHashSet<String>,
    pub mycoparasite_fungi: FxHashSet<String>,
    pub entomopathogenic_fungi: FxHashSet<String>,
}

impl RelationshipSets {
    /// Flower visitors and strict pollinators together
    pub fn visitors(&self) -> impl Iterator<Item = &String> {
        self.pollinators.iter().chain(self.flower_visitors.iter())
    }

    /// Every beneficial fungus, across mutualist subtypes
    pub fn beneficial_fungi(&self) -> impl Iterator<Item = &String> {
        self.amf_fungi
            .iter()
            .chain(self.emf_fungi.iter())
            .chain(self.endophytic_fungi.iter())
            .chain(self.saprotrophic_fungi.iter())
    }

    pub fn has_beneficial_fungi(&self) -> bool {
        !(self.amf_fungi.is_empty()
            && self.emf_fungi.is_empty()
            && self.endophytic_fungi.is_empty()
            && self.saprotrophic_fungi.is_empty())
    }

    /// Animals hosted by this plant that could prey on a neighbour's herbivores
    pub fn potential_predators(&self) -> FxHashSet<&String> {
        self.visitors().chain(self.predators.iter()).collect()
    }
}
