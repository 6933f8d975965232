//! Structured scoring output
//!
//! `ScoreBreakdown` is the single result type of a guild-scoring call. A
//! vetoed guild carries only the climate assessment and the veto reasons;
//! a scored guild carries every factor with its raw statistic and
//! diagnostics. Everything serializes with serde for downstream report
//! composers.

use crate::climate::{ClimateAssessment, StressKind, VetoReason};
use crate::metrics::{FactorDetail, NegativeFactor, PositiveFactor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-fatal condition attached to a breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuildWarning {
    /// Two or more members exceed the same extreme-stress threshold
    SharedClimateVulnerability { stress: StressKind, species: Vec<String> },
    /// Members excluded from strategy conflict scoring
    MissingStrategy { species: Vec<String> },
    /// Members excluded from phylogenetic diversity
    MissingPhyloEmbedding { species: Vec<String>, resolved_to_zero: bool },
    /// Members excluded from the soil pH range
    MissingSoilPh { species: Vec<String> },
}

impl fmt::Display for GuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuildWarning::SharedClimateVulnerability { stress, species } => write!(
                f,
                "{} species share {} vulnerability: {}",
                species.len(),
                stress,
                species.join(", ")
            ),
            GuildWarning::MissingStrategy { species } => write!(
                f,
                "no CSR strategy, excluded from strategy conflict: {}",
                species.join(", ")
            ),
            GuildWarning::MissingPhyloEmbedding { species, resolved_to_zero } => {
                write!(
                    f,
                    "no phylogenetic embedding, excluded from diversity: {}",
                    species.join(", ")
                )?;
                if *resolved_to_zero {
                    f.write_str(" (fewer than 2 embeddings remain; diversity set to 0)")?;
                }
                Ok(())
            }
            GuildWarning::MissingSoilPh { species } => write!(
                f,
                "no soil pH, excluded from pH range: {}",
                species.join(", ")
            ),
        }
    }
}

/// One factor's contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown<F> {
    pub factor: F,
    pub weight: f64,
    /// Normalized score in [0, 1]
    pub score: f64,
    /// Pre-normalization statistic
    pub raw: f64,
    pub detail: FactorDetail,
}

impl<F> FactorBreakdown<F> {
    pub fn weighted(&self) -> f64 {
        self.weight * self.score
    }
}

/// Human-readable rating of a final score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreInterpretation {
    /// 1 (bad) to 5 (excellent); 0 for a climate veto
    pub rating: u8,
    pub label: String,
    pub description: String,
}

impl ScoreInterpretation {
    pub fn from_score(final_score: f64) -> Self {
        let (rating, label, description) = if final_score >= 0.7 {
            (5, "Excellent", "Strong mutual benefits with few shared risks")
        } else if final_score >= 0.3 {
            (4, "Good", "Benefits outweigh risks")
        } else if final_score >= -0.3 {
            (3, "Neutral", "Benefits and risks roughly balance")
        } else if final_score >= -0.7 {
            (2, "Poor", "Risks outweigh benefits")
        } else {
            (1, "Bad", "Severe shared risks with little benefit")
        };
        Self {
            rating,
            label: label.to_string(),
            description: description.to_string(),
        }
    }

    pub fn vetoed() -> Self {
        Self {
            rating: 0,
            label: "Climate Veto".to_string(),
            description: "Members cannot share a climate".to_string(),
        }
    }
}

/// Sub-scores and aggregates of a guild that passed the climate filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildScores {
    pub negative: Vec<FactorBreakdown<NegativeFactor>>,
    pub positive: Vec<FactorBreakdown<PositiveFactor>>,
    pub negative_score: f64,
    pub positive_score: f64,
    /// `positive_score - negative_score`, in [-1, 1]
    pub final_score: f64,
}

impl GuildScores {
    pub fn negative_factor(&self, factor: NegativeFactor) -> Option<&FactorBreakdown<NegativeFactor>> {
        self.negative.iter().find(|f| f.factor == factor)
    }

    pub fn positive_factor(&self, factor: PositiveFactor) -> Option<&FactorBreakdown<PositiveFactor>> {
        self.positive.iter().find(|f| f.factor == factor)
    }
}

/// Terminal state of a scoring call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GuildOutcome {
    Vetoed { reasons: Vec<VetoReason> },
    Scored(GuildScores),
}

/// Complete result for one guild
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Guild members, sorted
    pub species: Vec<String>,
    pub climate: ClimateAssessment,
    pub outcome: GuildOutcome,
    pub interpretation: ScoreInterpretation,
    pub warnings: Vec<GuildWarning>,
}

impl ScoreBreakdown {
    pub fn is_vetoed(&self) -> bool {
        matches!(self.outcome, GuildOutcome::Vetoed { .. })
    }

    pub fn veto_reasons(&self) -> &[VetoReason] {
        match &self.outcome {
            GuildOutcome::Vetoed { reasons } => reasons,
            GuildOutcome::Scored(_) => &[],
        }
    }

    pub fn scores(&self) -> Option<&GuildScores> {
        match &self.outcome {
            GuildOutcome::Scored(scores) => Some(scores),
            GuildOutcome::Vetoed { .. } => None,
        }
    }

    pub fn final_score(&self) -> Option<f64> {
        self.scores().map(|s| s.final_score)
    }

    pub fn negative_score(&self, factor: NegativeFactor) -> Option<f64> {
        self.scores()?.negative_factor(factor).map(|f| f.score)
    }

    pub fn positive_score(&self, factor: PositiveFactor) -> Option<f64> {
        self.scores()?.positive_factor(factor).map(|f| f.score)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
