//! Shared Organism Counter Utility
//!
//! Counts how many plants in a guild share each organism (pathogen,
//! herbivore, pollinator, fungus, ...). Used by the overlap factors
//! (N1, N2, P3, P6) and by the pairwise lookup matching in P1/P2.

use crate::species::RelationshipSets;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An organism associated with at least two guild members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedOrganism {
    pub id: String,
    pub plant_count: usize,
}

/// Count organisms shared across plants in a guild
///
/// `select` yields the organisms of one plant for the roles being counted
/// (e.g. pollinators + flower visitors). Each organism counts at most once
/// per plant, however many roles list it.
///
/// Returns a map of organism_id → plant_count
pub fn count_shared_organisms<'a, F, I>(
    plants: &[&'a RelationshipSets],
    select: F,
) -> FxHashMap<&'a str, usize>
where
    F: Fn(&'a RelationshipSets) -> I,
    I: Iterator<Item = &'a String>,
{
    let mut counts: FxHashMap<&'a str, usize> = FxHashMap::default();

    for plant in plants {
        // Most plants have < 16 organisms per role group
        let mut plant_organisms: SmallVec<[&'a str; 16]> = select(*plant)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
            .collect();

        plant_organisms.sort_unstable();
        plant_organisms.dedup();

        for org in plant_organisms {
            *counts.entry(org).or_insert(0) += 1;
        }
    }

    counts
}

/// Organisms hosted by at least `min_plants` plants, sorted by plant count
/// (descending) then identifier
///
/// The fixed ordering keeps every downstream floating-point sum independent
/// of hash-map iteration order.
pub fn shared_at_least(counts: &FxHashMap<&str, usize>, min_plants: usize) -> Vec<SharedOrganism> {
    let mut shared: Vec<SharedOrganism> = counts
        .iter()
        .filter(|(_, count)| **count >= min_plants)
        .map(|(id, count)| SharedOrganism { id: id.to_string(), plant_count: *count })
        .collect();

    shared.sort_by(|a, b| b.plant_count.cmp(&a.plant_count).then_with(|| a.id.cmp(&b.id)));
    shared
}

/// Quadratic overlap pressure: Σ (shared_count / n_plants)² × severity
pub fn quadratic_overlap<F>(shared: &[SharedOrganism], n_plants: usize, severity: F) -> f64
where
    F: Fn(&SharedOrganism) -> f64,
{
    if n_plants == 0 {
        return 0.0;
    }
    shared
        .iter()
        .map(|org| {
            let overlap_ratio = org.plant_count as f64 / n_plants as f64;
            overlap_ratio.powi(2) * severity(org)
        })
        .sum()
}

/// Find which organisms hosted by a plant appear in a lookup entry
///
/// Returned sorted so callers record matches deterministically.
pub fn find_matches<'a>(
    hosted: &FxHashSet<&'a String>,
    known: &FxHashSet<String>,
) -> Vec<&'a String> {
    let mut matches: Vec<&'a String> = hosted.iter().copied().filter(|org| known.contains(*org)).collect();
    matches.sort_unstable();
    matches
}
