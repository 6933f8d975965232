//! FACTOR N4: GROWTH STRATEGY CONFLICT
//!
//! Pairwise CSR conflicts, modulated by growth form, height separation and
//! (for Competitor vs Stress-tolerator pairs) the stress-tolerator's light
//! preference.
//!
//! Classification (at most one class per species):
//!   - High-C: C > 60
//!   - High-S: S > 60
//!   - High-R: R > 50
//!
//! Base weight by pair type: C-C 1.0, C-S 0.6, C-R 0.8, R-R 0.3, others 0.
//!
//! Modulation:
//!   1. Growth form (takes precedence): vine + tree ×0.2, tree + herb ×0.4
//!   2. Otherwise height separation: < 2 m ×1.0, < 5 m ×0.6, else ×0.3
//!   3. C-S only: shade-adapted S ×0.0, sun-loving S ×1.5
//!
//! Species without a CSR strategy are excluded, and the pair count used for
//! normalization is taken over the remaining species.

use super::{FactorDetail, FactorScore, GuildContext, GuildMember};
use crate::breakdown::GuildWarning;
use crate::config::StrategyThresholds;
use crate::species::{CsrStrategy, GrowthForm};
use crate::utils::{clamp_unit, unordered_pairs};
use serde::{Deserialize, Serialize};

/// Dominant CSR class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyClass {
    Competitor,
    StressTolerator,
    Ruderal,
}

impl StrategyClass {
    pub fn classify(strategy: &CsrStrategy, thresholds: &StrategyThresholds) -> Option<Self> {
        if strategy.c > thresholds.high_competitor {
            Some(StrategyClass::Competitor)
        } else if strategy.s > thresholds.high_stress_tolerator {
            Some(StrategyClass::StressTolerator)
        } else if strategy.r > thresholds.high_ruderal {
            Some(StrategyClass::Ruderal)
        } else {
            None
        }
    }
}

/// Pair types that carry a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictType {
    #[serde(rename = "C-C")]
    CompetitorCompetitor,
    #[serde(rename = "C-S")]
    CompetitorStress,
    #[serde(rename = "C-R")]
    CompetitorRuderal,
    #[serde(rename = "R-R")]
    RuderalRuderal,
}

impl ConflictType {
    pub fn from_classes(a: StrategyClass, b: StrategyClass) -> Option<Self> {
        use StrategyClass::*;
        match (a, b) {
            (Competitor, Competitor) => Some(ConflictType::CompetitorCompetitor),
            (Competitor, StressTolerator) | (StressTolerator, Competitor) => {
                Some(ConflictType::CompetitorStress)
            }
            (Competitor, Ruderal) | (Ruderal, Competitor) => Some(ConflictType::CompetitorRuderal),
            (Ruderal, Ruderal) => Some(ConflictType::RuderalRuderal),
            _ => None,
        }
    }

    pub fn base_weight(&self) -> f64 {
        match self {
            ConflictType::CompetitorCompetitor => 1.0,
            ConflictType::CompetitorStress => 0.6,
            ConflictType::CompetitorRuderal => 0.8,
            ConflictType::RuderalRuderal => 0.3,
        }
    }
}

/// One non-zero pairwise conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConflict {
    pub species: [String; 2],
    pub conflict_type: ConflictType,
    /// Modulated severity
    pub severity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConflictDetail {
    pub conflicts: Vec<StrategyConflict>,
    /// Members with a CSR strategy
    pub valid_species: usize,
    /// Members excluded for lacking a CSR strategy
    pub excluded_species: Vec<String>,
}

/// Growth-form modulation, falling back to height separation
fn spatial_modulation(a: &GuildMember<'_>, b: &GuildMember<'_>) -> f64 {
    use GrowthForm::*;
    match (a.attributes.growth_form, b.attributes.growth_form) {
        (Vine, Tree) | (Tree, Vine) => 0.2,
        (Tree, Herb) | (Herb, Tree) => 0.4,
        _ => {
            let height_diff = (a.attributes.height_m - b.attributes.height_m).abs();
            if height_diff < 2.0 {
                1.0
            } else if height_diff < 5.0 {
                0.6
            } else {
                0.3
            }
        }
    }
}

/// Light modulation for the stress-tolerant member of a C-S pair
fn light_modulation(light_preference: Option<f64>, thresholds: &StrategyThresholds) -> f64 {
    match light_preference {
        Some(light) if light < thresholds.shade_adapted_below => thresholds.shade_multiplier,
        Some(light) if light > thresholds.sun_loving_above => thresholds.sun_multiplier,
        _ => 1.0,
    }
}

pub fn calculate_strategy_conflict(ctx: &GuildContext<'_>) -> FactorScore {
    let thresholds = &ctx.config.strategy;

    let mut valid: Vec<(GuildMember<'_>, Option<StrategyClass>)> = Vec::with_capacity(ctx.len());
    let mut excluded_species = Vec::new();
    for member in &ctx.members {
        match &member.attributes.strategy {
            Some(strategy) => valid.push((*member, StrategyClass::classify(strategy, thresholds))),
            None => excluded_species.push(member.id().to_string()),
        }
    }

    let mut total = 0.0;
    let mut conflicts = Vec::new();

    for i in 0..valid.len() {
        for j in (i + 1)..valid.len() {
            let (a, class_a) = &valid[i];
            let (b, class_b) = &valid[j];
            let (Some(class_a), Some(class_b)) = (class_a, class_b) else {
                continue;
            };
            let Some(conflict_type) = ConflictType::from_classes(*class_a, *class_b) else {
                continue;
            };

            let mut severity = conflict_type.base_weight() * spatial_modulation(a, b);

            if conflict_type == ConflictType::CompetitorStress {
                let stress_member = if *class_a == StrategyClass::StressTolerator { a } else { b };
                severity *= light_modulation(stress_member.attributes.light_preference, thresholds);
            }

            total += severity;
            if severity > 0.0 {
                conflicts.push(StrategyConflict {
                    species: [a.id().to_string(), b.id().to_string()],
                    conflict_type,
                    severity,
                });
            }
        }
    }

    let pairs = unordered_pairs(valid.len());
    let score = if pairs == 0 { 0.0 } else { clamp_unit(total / pairs as f64) };

    let mut warnings = Vec::new();
    if !excluded_species.is_empty() {
        tracing::warn!(species = ?excluded_species, "no CSR strategy; excluded from strategy conflict");
        warnings.push(GuildWarning::MissingStrategy { species: excluded_species.clone() });
    }

    FactorScore {
        score,
        raw: total,
        detail: FactorDetail::StrategyConflict(StrategyConflictDetail {
            conflicts,
            valid_species: valid.len(),
            excluded_species,
        }),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::data::LookupTables;
    use crate::metrics::test_support::{context, plant};
    use crate::species::{RelationshipSets, SpeciesAttributes};
    use approx::assert_relative_eq;

    fn csr_plant(id: &str, c: f64, s: f64, r: f64, height: f64, form: GrowthForm) -> SpeciesAttributes {
        let mut p = plant(id);
        p.strategy = Some(CsrStrategy { c, s, r });
        p.height_m = height;
        p.growth_form = form;
        p
    }

    fn score(plants: &[SpeciesAttributes]) -> FactorScore {
        let rels = vec![RelationshipSets::default(); plants.len()];
        let lookups = LookupTables::default();
        let config = ScoringConfig::default();
        calculate_strategy_conflict(&context(plants, &rels, &lookups, &config))
    }

    #[test]
    fn test_classification_thresholds() {
        let t = StrategyThresholds::default();
        let classify = |c, s, r| StrategyClass::classify(&CsrStrategy { c, s, r }, &t);
        assert_eq!(classify(61.0, 20.0, 19.0), Some(StrategyClass::Competitor));
        assert_eq!(classify(60.0, 20.0, 20.0), None);
        assert_eq!(classify(10.0, 70.0, 20.0), Some(StrategyClass::StressTolerator));
        assert_eq!(classify(20.0, 20.0, 60.0), Some(StrategyClass::Ruderal));
        assert_eq!(classify(34.0, 33.0, 33.0), None);
    }

    #[test]
    fn test_competitors_of_similar_height_conflict_fully() {
        let result = score(&[
            csr_plant("a", 70.0, 15.0, 15.0, 3.0, GrowthForm::Shrub),
            csr_plant("b", 70.0, 15.0, 15.0, 3.5, GrowthForm::Shrub),
        ]);
        assert_relative_eq!(result.score, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tall_and_short_competitor_trees() {
        let result = score(&[
            csr_plant("a", 65.0, 20.0, 15.0, 20.0, GrowthForm::Tree),
            csr_plant("b", 65.0, 20.0, 15.0, 5.0, GrowthForm::Tree),
        ]);
        assert_relative_eq!(result.score, 0.3, epsilon = 1e-12);
        assert_relative_eq!(result.raw, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_form_modulation_skips_height() {
        // vine + tree: 1.0 × 0.2, despite a large height gap
        let result = score(&[
            csr_plant("a", 70.0, 15.0, 15.0, 20.0, GrowthForm::Tree),
            csr_plant("b", 70.0, 15.0, 15.0, 1.0, GrowthForm::Vine),
        ]);
        assert_relative_eq!(result.score, 0.2, epsilon = 1e-12);

        // tree + herb: 1.0 × 0.4
        let result = score(&[
            csr_plant("a", 70.0, 15.0, 15.0, 20.0, GrowthForm::Tree),
            csr_plant("b", 70.0, 15.0, 15.0, 0.5, GrowthForm::Herb),
        ]);
        assert_relative_eq!(result.score, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_light_preference_modulates_competitor_stress_pairs() {
        let competitor = csr_plant("a", 70.0, 15.0, 15.0, 3.0, GrowthForm::Shrub);
        let mut shade = csr_plant("b", 10.0, 80.0, 10.0, 3.0, GrowthForm::Shrub);
        shade.light_preference = Some(-1.0);
        let result = score(&[competitor.clone(), shade]);
        assert_eq!(result.score, 0.0);

        let mut sun = csr_plant("b", 10.0, 80.0, 10.0, 3.0, GrowthForm::Shrub);
        sun.light_preference = Some(1.0);
        let result = score(&[competitor.clone(), sun]);
        assert_relative_eq!(result.score, 0.9, epsilon = 1e-12);

        let neutral = csr_plant("b", 10.0, 80.0, 10.0, 3.0, GrowthForm::Shrub);
        let result = score(&[competitor, neutral]);
        assert_relative_eq!(result.score, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_strategy_excluded_not_zeroed() {
        let result = score(&[
            csr_plant("a", 70.0, 15.0, 15.0, 3.0, GrowthForm::Shrub),
            csr_plant("b", 70.0, 15.0, 15.0, 3.0, GrowthForm::Shrub),
            plant("c"),
        ]);

        // One valid pair, not three
        assert_relative_eq!(result.score, 1.0, epsilon = 1e-12);
        assert_eq!(
            result.warnings,
            vec![GuildWarning::MissingStrategy { species: vec!["c".to_string()] }]
        );
        match result.detail {
            FactorDetail::StrategyConflict(detail) => {
                assert_eq!(detail.valid_species, 2);
                assert_eq!(detail.excluded_species, vec!["c".to_string()]);
            }
            other => panic!("unexpected detail {:?}", other),
        }
    }

    #[test]
    fn test_stress_tolerators_do_not_conflict() {
        let result = score(&[
            csr_plant("a", 10.0, 80.0, 10.0, 3.0, GrowthForm::Shrub),
            csr_plant("b", 10.0, 80.0, 10.0, 3.0, GrowthForm::Shrub),
        ]);
        assert_eq!(result.score, 0.0);
    }
}
