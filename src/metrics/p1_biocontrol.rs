//! FACTOR P1: CROSS-PLANT BIOCONTROL
//!
//! Pairwise analysis over ordered pairs (A, B): plant B protects plant A
//! when B hosts natural enemies of A's herbivores.
//!
//! Mechanisms:
//!   1. Specific predators: B's animals listed as predators of an A herbivore (×1.0)
//!   2. Specific fungi: B's entomopathogenic fungi listed as parasites of an A herbivore (×1.0)
//!   3. General fungi: A has herbivores, B has entomopathogenic fungi (×0.2 per fungus)
//!
//! Score = tanh(raw / (n(n-1)) × scale)

use super::{AgentMatch, FactorDetail, FactorScore, GuildContext};
use crate::utils::{find_matches, ordered_pairs, squash_density};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

const SPECIFIC_WEIGHT: f64 = 1.0;
const GENERAL_FUNGI_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiocontrolDetail {
    pub specific_predator_matches: usize,
    pub specific_fungi_matches: usize,
    pub general_fungi_bonus: f64,
    /// raw / ordered pairs × scale, before squashing
    pub density: f64,
    /// (herbivore, predator) pairs found, deduplicated
    pub matched_predators: Vec<AgentMatch>,
    /// (herbivore, fungus) pairs found, deduplicated
    pub matched_fungi: Vec<AgentMatch>,
}

pub fn calculate_biocontrol(ctx: &GuildContext<'_>) -> FactorScore {
    let n = ctx.len();
    let lookups = ctx.lookups;

    // Per-member views, built once
    let herbivores: Vec<Vec<&String>> = ctx
        .members
        .iter()
        .map(|m| {
            let mut list: Vec<&String> = m.relationships.herbivores.iter().collect();
            list.sort_unstable();
            list
        })
        .collect();
    let predators: Vec<FxHashSet<&String>> = ctx
        .members
        .iter()
        .map(|m| m.relationships.potential_predators())
        .collect();
    let entomo: Vec<FxHashSet<&String>> = ctx
        .members
        .iter()
        .map(|m| m.relationships.entomopathogenic_fungi.iter().collect())
        .collect();

    let mut specific_predator_matches = 0usize;
    let mut specific_fungi_matches = 0usize;
    let mut general_fungi_bonus = 0.0;
    let mut matched_predators: FxHashSet<AgentMatch> = FxHashSet::default();
    let mut matched_fungi: FxHashSet<AgentMatch> = FxHashSet::default();

    for a in 0..n {
        if herbivores[a].is_empty() {
            continue;
        }
        for b in 0..n {
            if a == b {
                continue;
            }

            for herbivore in &herbivores[a] {
                // Mechanism 1: specific animal predators
                if let Some(known) = lookups.herbivore_predators.get(*herbivore) {
                    for predator in find_matches(&predators[b], known) {
                        specific_predator_matches += 1;
                        matched_predators.insert(AgentMatch {
                            target: herbivore.to_string(),
                            agent: predator.clone(),
                        });
                    }
                }

                // Mechanism 2: specific entomopathogenic fungi
                if let Some(known) = lookups.insect_parasites.get(*herbivore) {
                    for fungus in find_matches(&entomo[b], known) {
                        specific_fungi_matches += 1;
                        matched_fungi.insert(AgentMatch {
                            target: herbivore.to_string(),
                            agent: fungus.clone(),
                        });
                    }
                }
            }

            // Mechanism 3: general entomopathogenic fungi
            if !entomo[b].is_empty() {
                general_fungi_bonus += entomo[b].len() as f64 * GENERAL_FUNGI_WEIGHT;
            }
        }
    }

    let raw = (specific_predator_matches + specific_fungi_matches) as f64 * SPECIFIC_WEIGHT
        + general_fungi_bonus;
    let (density, score) = squash_density(raw, ordered_pairs(n), ctx.config.scales.biocontrol);

    let mut matched_predators: Vec<AgentMatch> = matched_predators.into_iter().collect();
    matched_predators.sort_unstable();
    let mut matched_fungi: Vec<AgentMatch> = matched_fungi.into_iter().collect();
    matched_fungi.sort_unstable();

    FactorScore {
        score,
        raw,
        detail: FactorDetail::Biocontrol(BiocontrolDetail {
            specific_predator_matches,
            specific_fungi_matches,
            general_fungi_bonus,
            density,
            matched_predators,
            matched_fungi,
        }),
        warnings: Vec::new(),
    }
}
