//! FACTOR P2: PATHOGEN ANTAGONISM
//!
//! Ordered pairs (A, B): plant B's mycoparasitic fungi suppress plant A's
//! pathogens.
//!
//! Mechanisms:
//!   1. Specific antagonists: B's mycoparasites listed against an A pathogen (×1.0)
//!   2. General mycoparasites: A has pathogens, B has mycoparasites (×0.3 per fungus)
//!
//! Score = tanh(raw / (n(n-1)) × scale)

use super::{AgentMatch, FactorDetail, FactorScore, GuildContext};
use crate::utils::{find_matches, ordered_pairs, squash_density};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

const SPECIFIC_WEIGHT: f64 = 1.0;
const GENERAL_MYCOPARASITE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathogenAntagonismDetail {
    pub specific_antagonist_matches: usize,
    pub general_mycoparasite_bonus: f64,
    /// raw / ordered pairs × scale, before squashing
    pub density: f64,
    /// (pathogen, antagonist) pairs found, deduplicated
    pub matched_antagonists: Vec<AgentMatch>,
}

pub fn calculate_pathogen_antagonism(ctx: &GuildContext<'_>) -> FactorScore {
    let n = ctx.len();
    let lookups = ctx.lookups;

    let pathogens: Vec<Vec<&String>> = ctx
        .members
        .iter()
        .map(|m| {
            let mut list: Vec<&String> = m.relationships.pathogenic_fungi.iter().collect();
            list.sort_unstable();
            list
        })
        .collect();
    let mycoparasites: Vec<FxHashSet<&String>> = ctx
        .members
        .iter()
        .map(|m| m.relationships.mycoparasite_fungi.iter().collect())
        .collect();

    let mut specific_antagonist_matches = 0usize;
    let mut general_mycoparasite_bonus = 0.0;
    let mut matched: FxHashSet<AgentMatch> = FxHashSet::default();

    for a in 0..n {
        if pathogens[a].is_empty() {
            continue;
        }
        for b in 0..n {
            if a == b || mycoparasites[b].is_empty() {
                continue;
            }

            for pathogen in &pathogens[a] {
                if let Some(known) = lookups.pathogen_antagonists.get(*pathogen) {
                    for antagonist in find_matches(&mycoparasites[b], known) {
                        specific_antagonist_matches += 1;
                        matched.insert(AgentMatch {
                            target: pathogen.to_string(),
                            agent: antagonist.clone(),
                        });
                    }
                }
            }

            general_mycoparasite_bonus += mycoparasites[b].len() as f64 * GENERAL_MYCOPARASITE_WEIGHT;
        }
    }

    let raw = specific_antagonist_matches as f64 * SPECIFIC_WEIGHT + general_mycoparasite_bonus;
    let (density, score) =
        squash_density(raw, ordered_pairs(n), ctx.config.scales.pathogen_antagonism);

    let mut matched_antagonists: Vec<AgentMatch> = matched.into_iter().collect();
    matched_antagonists.sort_unstable();

    FactorScore {
        score,
        raw,
        detail: FactorDetail::PathogenAntagonism(PathogenAntagonismDetail {
            specific_antagonist_matches,
            general_mycoparasite_bonus,
            density,
            matched_antagonists,
        }),
        warnings: Vec::new(),
    }
}
