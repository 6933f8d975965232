//! Factor modules for guild scoring
//!
//! Each factor lives in its own module and exposes a `calculate_*` function
//! over a shared `GuildContext`. The factor set is closed: five negative
//! factors and six positive factors, enumerated by `NegativeFactor` and
//! `PositiveFactor`.

pub mod n1_pathogen_overlap;
pub mod n2_herbivore_overlap;
pub mod n4_strategy_conflict;
pub mod n5_nitrogen_fixation;
pub mod n6_soil_ph;
pub mod p1_biocontrol;
pub mod p2_pathogen_antagonism;
pub mod p3_beneficial_fungi;
pub mod p4_phylo_diversity;
pub mod p5_stratification;
pub mod p6_shared_pollinators;

pub use n1_pathogen_overlap::{calculate_pathogen_overlap, PathogenOverlapDetail};
pub use n2_herbivore_overlap::{calculate_herbivore_overlap, HerbivoreOverlapDetail};
pub use n4_strategy_conflict::{
    calculate_strategy_conflict, ConflictType, StrategyClass, StrategyConflict, StrategyConflictDetail,
};
pub use n5_nitrogen_fixation::{calculate_nitrogen_fixation, NitrogenFixationDetail};
pub use n6_soil_ph::{calculate_soil_ph, SoilPhDetail};
pub use p1_biocontrol::{calculate_biocontrol, BiocontrolDetail};
pub use p2_pathogen_antagonism::{calculate_pathogen_antagonism, PathogenAntagonismDetail};
pub use p3_beneficial_fungi::{calculate_beneficial_fungi, BeneficialFungiDetail};
pub use p4_phylo_diversity::{calculate_phylo_diversity, PhyloDiversityDetail};
pub use p5_stratification::{calculate_stratification, HeightLayer, StratificationDetail};
pub use p6_shared_pollinators::{calculate_shared_pollinators, SharedPollinatorsDetail};

use crate::breakdown::GuildWarning;
use crate::config::{NegativeWeights, PositiveWeights, ScoringConfig};
use crate::data::LookupTables;
use crate::species::{RelationshipSets, SpeciesAttributes};
use serde::{Deserialize, Serialize};

/// One resolved guild member
#[derive(Debug, Clone, Copy)]
pub struct GuildMember<'a> {
    pub attributes: &'a SpeciesAttributes,
    pub relationships: &'a RelationshipSets,
}

impl<'a> GuildMember<'a> {
    pub fn id(&self) -> &'a str {
        &self.attributes.id
    }
}

/// Everything a factor calculator reads
///
/// Members are sorted by identifier before the context is built.
#[derive(Debug, Clone)]
pub struct GuildContext<'a> {
    pub members: Vec<GuildMember<'a>>,
    pub lookups: &'a LookupTables,
    pub config: &'a ScoringConfig,
}

impl<'a> GuildContext<'a> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn relationships(&self) -> Vec<&'a RelationshipSets> {
        self.members.iter().map(|m| m.relationships).collect()
    }

    pub fn attributes(&self) -> Vec<&'a SpeciesAttributes> {
        self.members.iter().map(|m| m.attributes).collect()
    }
}

/// (prey or pathogen, agent) pair found through a lookup table
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentMatch {
    pub target: String,
    pub agent: String,
}

/// Per-factor diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "factor", rename_all = "snake_case")]
pub enum FactorDetail {
    PathogenOverlap(PathogenOverlapDetail),
    HerbivoreOverlap(HerbivoreOverlapDetail),
    StrategyConflict(StrategyConflictDetail),
    NitrogenFixation(NitrogenFixationDetail),
    SoilPh(SoilPhDetail),
    Biocontrol(BiocontrolDetail),
    PathogenAntagonism(PathogenAntagonismDetail),
    BeneficialFungi(BeneficialFungiDetail),
    PhyloDiversity(PhyloDiversityDetail),
    Stratification(StratificationDetail),
    SharedPollinators(SharedPollinatorsDetail),
}

/// Output of one factor calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    /// Normalized score in [0, 1]
    pub score: f64,
    /// Pre-normalization statistic
    pub raw: f64,
    pub detail: FactorDetail,
    /// Missing-attribute conditions absorbed by this factor
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<GuildWarning>,
}

/// Risk factors, combined into the negative score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeFactor {
    PathogenOverlap,
    HerbivoreOverlap,
    StrategyConflict,
    NitrogenFixation,
    SoilPh,
}

impl NegativeFactor {
    pub const ALL: [NegativeFactor; 5] = [
        NegativeFactor::PathogenOverlap,
        NegativeFactor::HerbivoreOverlap,
        NegativeFactor::StrategyConflict,
        NegativeFactor::NitrogenFixation,
        NegativeFactor::SoilPh,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            NegativeFactor::PathogenOverlap => "N1",
            NegativeFactor::HerbivoreOverlap => "N2",
            NegativeFactor::StrategyConflict => "N4",
            NegativeFactor::NitrogenFixation => "N5",
            NegativeFactor::SoilPh => "N6",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NegativeFactor::PathogenOverlap => "Pathogen overlap",
            NegativeFactor::HerbivoreOverlap => "Herbivore overlap",
            NegativeFactor::StrategyConflict => "Growth strategy conflict",
            NegativeFactor::NitrogenFixation => "No nitrogen fixation",
            NegativeFactor::SoilPh => "Soil pH incompatibility",
        }
    }

    pub fn weight(&self, weights: &NegativeWeights) -> f64 {
        match self {
            NegativeFactor::PathogenOverlap => weights.pathogen_overlap,
            NegativeFactor::HerbivoreOverlap => weights.herbivore_overlap,
            NegativeFactor::StrategyConflict => weights.strategy_conflict,
            NegativeFactor::NitrogenFixation => weights.nitrogen_fixation,
            NegativeFactor::SoilPh => weights.soil_ph,
        }
    }

    pub fn compute(&self, ctx: &GuildContext<'_>) -> FactorScore {
        match self {
            NegativeFactor::PathogenOverlap => calculate_pathogen_overlap(ctx),
            NegativeFactor::HerbivoreOverlap => calculate_herbivore_overlap(ctx),
            NegativeFactor::StrategyConflict => calculate_strategy_conflict(ctx),
            NegativeFactor::NitrogenFixation => calculate_nitrogen_fixation(ctx),
            NegativeFactor::SoilPh => calculate_soil_ph(ctx),
        }
    }
}

/// Benefit factors, combined into the positive score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositiveFactor {
    Biocontrol,
    PathogenAntagonism,
    BeneficialFungi,
    PhyloDiversity,
    Stratification,
    SharedPollinators,
}

impl PositiveFactor {
    pub const ALL: [PositiveFactor; 6] = [
        PositiveFactor::Biocontrol,
        PositiveFactor::PathogenAntagonism,
        PositiveFactor::BeneficialFungi,
        PositiveFactor::PhyloDiversity,
        PositiveFactor::Stratification,
        PositiveFactor::SharedPollinators,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PositiveFactor::Biocontrol => "P1",
            PositiveFactor::PathogenAntagonism => "P2",
            PositiveFactor::BeneficialFungi => "P3",
            PositiveFactor::PhyloDiversity => "P4",
            PositiveFactor::Stratification => "P5",
            PositiveFactor::SharedPollinators => "P6",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PositiveFactor::Biocontrol => "Cross-plant biocontrol",
            PositiveFactor::PathogenAntagonism => "Pathogen antagonism",
            PositiveFactor::BeneficialFungi => "Beneficial fungal network",
            PositiveFactor::PhyloDiversity => "Phylogenetic diversity",
            PositiveFactor::Stratification => "Vertical and form stratification",
            PositiveFactor::SharedPollinators => "Shared pollinators",
        }
    }

    pub fn weight(&self, weights: &PositiveWeights) -> f64 {
        match self {
            PositiveFactor::Biocontrol => weights.biocontrol,
            PositiveFactor::PathogenAntagonism => weights.pathogen_antagonism,
            PositiveFactor::BeneficialFungi => weights.beneficial_fungi,
            PositiveFactor::PhyloDiversity => weights.phylo_diversity,
            PositiveFactor::Stratification => weights.stratification,
            PositiveFactor::SharedPollinators => weights.shared_pollinators,
        }
    }

    pub fn compute(&self, ctx: &GuildContext<'_>) -> FactorScore {
        match self {
            PositiveFactor::Biocontrol => calculate_biocontrol(ctx),
            PositiveFactor::PathogenAntagonism => calculate_pathogen_antagonism(ctx),
            PositiveFactor::BeneficialFungi => calculate_beneficial_fungi(ctx),
            PositiveFactor::PhyloDiversity => calculate_phylo_diversity(ctx),
            PositiveFactor::Stratification => calculate_stratification(ctx),
            PositiveFactor::SharedPollinators => calculate_shared_pollinators(ctx),
        }
    }
}
