//! Guild Scorer - Main coordinator for scoring plant guilds
//!
//! Validates the guild, runs the climate filter, then computes all eleven
//! factors and aggregates them. Includes both sequential and parallel
//! (Rayon) implementations; both produce bit-identical results.
//!
//! State machine: PENDING → VETOED (climate filter failed) or
//! PENDING → SCORED (all factors computed and aggregated). A validation
//! error ends the call without either state.

use crate::aggregator::Aggregator;
use crate::breakdown::{GuildOutcome, GuildWarning, ScoreBreakdown, ScoreInterpretation};
use crate::climate::{check_climate_compatibility, ClimateVerdict};
use crate::config::ScoringConfig;
use crate::data::GuildData;
use crate::error::{GuildError, GuildResult};
use crate::metrics::{FactorScore, GuildContext, GuildMember, NegativeFactor, PositiveFactor};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const MIN_GUILD_SIZE: usize = 2;
pub const MAX_GUILD_SIZE: usize = 10;

/// Main guild scorer
///
/// Holds the read-only stores and configuration; every scoring call borrows
/// them immutably, so one scorer can serve many threads.
pub struct GuildScorer {
    data: GuildData,
    config: ScoringConfig,
    aggregator: Aggregator,
}

/// Pre-normalization statistics of every factor (for recalibrating scales)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScores {
    pub n1_pathogen_overlap: f64,
    pub n2_herbivore_overlap: f64,
    pub n4_strategy_conflict: f64,
    pub n5_nitrogen_fixers: f64,
    pub n6_ph_range: f64,
    pub p1_biocontrol: f64,
    pub p2_pathogen_antagonism: f64,
    pub p3_beneficial_fungi: f64,
    pub p4_mean_phylo_distance: f64,
    pub p5_stratification: f64,
    pub p6_shared_pollinators: f64,
}

impl GuildScorer {
    /// Build a scorer over loaded data, refusing an invalid configuration
    pub fn new(data: GuildData, config: ScoringConfig) -> GuildResult<Self> {
        config.validate()?;
        let aggregator = Aggregator::new(
            config.negative_weights.clone(),
            config.positive_weights.clone(),
        )?;

        tracing::info!(
            species = data.species_count(),
            phylo_dimensions = config.phylo_dimensions,
            "guild scorer initialized"
        );

        Ok(Self { data, config, aggregator })
    }

    /// Build a scorer with the default weights and scale constants
    pub fn with_defaults(data: GuildData) -> GuildResult<Self> {
        Self::new(data, ScoringConfig::default())
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn data(&self) -> &GuildData {
        &self.data
    }

    /// Check size, duplicates and store membership; members come back sorted
    fn resolve_guild<S: AsRef<str>>(&self, plant_ids: &[S]) -> GuildResult<Vec<GuildMember<'_>>> {
        let size = plant_ids.len();
        if !(MIN_GUILD_SIZE..=MAX_GUILD_SIZE).contains(&size) {
            return Err(GuildError::GuildSize { size, min: MIN_GUILD_SIZE, max: MAX_GUILD_SIZE });
        }

        let mut ids: Vec<&str> = plant_ids.iter().map(|id| id.as_ref()).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(GuildError::DuplicateSpecies(pair[0].to_string()));
        }

        ids.into_iter()
            .map(|id| {
                self.data
                    .attributes(id)
                    .map(|attributes| GuildMember {
                        attributes,
                        relationships: self.data.relationships(id),
                    })
                    .ok_or_else(|| GuildError::UnknownSpecies(id.to_string()))
            })
            .collect()
    }

    fn context<'a>(&'a self, members: Vec<GuildMember<'a>>) -> GuildContext<'a> {
        GuildContext {
            members,
            lookups: self.data.lookups(),
            config: &self.config,
        }
    }

    fn climate_verdict(&self, ctx: &GuildContext<'_>) -> ClimateVerdict {
        check_climate_compatibility(&ctx.attributes(), &self.config.climate)
    }

    /// Score a guild, computing factors one after another
    pub fn score_guild<S: AsRef<str>>(&self, plant_ids: &[S]) -> GuildResult<ScoreBreakdown> {
        let ctx = self.context(self.resolve_guild(plant_ids)?);
        let verdict = self.climate_verdict(&ctx);
        if verdict.is_vetoed() {
            return Ok(self.vetoed(&ctx, verdict));
        }

        let negative: Vec<(NegativeFactor, FactorScore)> = NegativeFactor::ALL
            .iter()
            .map(|factor| (*factor, factor.compute(&ctx)))
            .collect();
        let positive: Vec<(PositiveFactor, FactorScore)> = PositiveFactor::ALL
            .iter()
            .map(|factor| (*factor, factor.compute(&ctx)))
            .collect();

        Ok(self.scored(&ctx, verdict, negative, positive))
    }

    /// Score a guild with all factors computed IN PARALLEL
    ///
    /// Negative and positive factor sets run concurrently; results are
    /// collected in fixed factor order, so the output matches `score_guild`.
    pub fn score_guild_parallel<S: AsRef<str>>(&self, plant_ids: &[S]) -> GuildResult<ScoreBreakdown> {
        let ctx = self.context(self.resolve_guild(plant_ids)?);
        let verdict = self.climate_verdict(&ctx);
        if verdict.is_vetoed() {
            return Ok(self.vetoed(&ctx, verdict));
        }

        let (negative, positive) = rayon::join(
            || {
                NegativeFactor::ALL
                    .par_iter()
                    .map(|factor| (*factor, factor.compute(&ctx)))
                    .collect::<Vec<_>>()
            },
            || {
                PositiveFactor::ALL
                    .par_iter()
                    .map(|factor| (*factor, factor.compute(&ctx)))
                    .collect::<Vec<_>>()
            },
        );

        Ok(self.scored(&ctx, verdict, negative, positive))
    }

    /// Score many guilds in parallel; one result per guild, in input order
    pub fn score_guilds(&self, guilds: &[Vec<String>]) -> Vec<GuildResult<ScoreBreakdown>> {
        guilds.par_iter().map(|guild| self.score_guild(guild)).collect()
    }

    /// Raw statistics of every factor, bypassing the climate filter
    pub fn compute_raw_scores<S: AsRef<str>>(&self, plant_ids: &[S]) -> GuildResult<RawScores> {
        let ctx = self.context(self.resolve_guild(plant_ids)?);
        let raw_n = |factor: NegativeFactor| factor.compute(&ctx).raw;
        let raw_p = |factor: PositiveFactor| factor.compute(&ctx).raw;

        Ok(RawScores {
            n1_pathogen_overlap: raw_n(NegativeFactor::PathogenOverlap),
            n2_herbivore_overlap: raw_n(NegativeFactor::HerbivoreOverlap),
            n4_strategy_conflict: raw_n(NegativeFactor::StrategyConflict),
            n5_nitrogen_fixers: raw_n(NegativeFactor::NitrogenFixation),
            n6_ph_range: raw_n(NegativeFactor::SoilPh),
            p1_biocontrol: raw_p(PositiveFactor::Biocontrol),
            p2_pathogen_antagonism: raw_p(PositiveFactor::PathogenAntagonism),
            p3_beneficial_fungi: raw_p(PositiveFactor::BeneficialFungi),
            p4_mean_phylo_distance: raw_p(PositiveFactor::PhyloDiversity),
            p5_stratification: raw_p(PositiveFactor::Stratification),
            p6_shared_pollinators: raw_p(PositiveFactor::SharedPollinators),
        })
    }

    fn species_ids(ctx: &GuildContext<'_>) -> Vec<String> {
        ctx.members.iter().map(|m| m.id().to_string()).collect()
    }

    fn climate_warnings(verdict: &ClimateVerdict) -> Vec<GuildWarning> {
        verdict
            .assessment
            .vulnerabilities
            .iter()
            .map(|v| GuildWarning::SharedClimateVulnerability {
                stress: v.stress,
                species: v.vulnerable_species.clone(),
            })
            .collect()
    }

    fn vetoed(&self, ctx: &GuildContext<'_>, verdict: ClimateVerdict) -> ScoreBreakdown {
        let species = Self::species_ids(ctx);
        tracing::warn!(
            species = ?species,
            reasons = ?verdict.veto_reasons.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
            "guild vetoed by climate filter"
        );

        ScoreBreakdown {
            species,
            warnings: Self::climate_warnings(&verdict),
            climate: verdict.assessment,
            outcome: GuildOutcome::Vetoed { reasons: verdict.veto_reasons },
            interpretation: ScoreInterpretation::vetoed(),
        }
    }

    fn scored(
        &self,
        ctx: &GuildContext<'_>,
        verdict: ClimateVerdict,
        negative: Vec<(NegativeFactor, FactorScore)>,
        positive: Vec<(PositiveFactor, FactorScore)>,
    ) -> ScoreBreakdown {
        let mut warnings = Self::climate_warnings(&verdict);
        for (factor, result) in &negative {
            tracing::debug!(factor = factor.code(), score = result.score, raw = result.raw);
            warnings.extend(result.warnings.iter().cloned());
        }
        for (factor, result) in &positive {
            tracing::debug!(factor = factor.code(), score = result.score, raw = result.raw);
            warnings.extend(result.warnings.iter().cloned());
        }

        let scores = self.aggregator.combine(negative, positive);
        tracing::debug!(
            size = ctx.len(),
            negative = scores.negative_score,
            positive = scores.positive_score,
            final_score = scores.final_score,
            "guild scored"
        );

        ScoreBreakdown {
            species: Self::species_ids(ctx),
            climate: verdict.assessment,
            interpretation: ScoreInterpretation::from_score(scores.final_score),
            outcome: GuildOutcome::Scored(scores),
            warnings,
        }
    }
}
