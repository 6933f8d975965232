//! FACTOR N2: HERBIVORE OVERLAP
//!
//! Same quadratic form as N1 over herbivores, severity 0.5, squashed with
//! `tanh(raw / scale)`. An organism that any guild member records as a
//! pollinator or flower visitor is not a pure pest and is dropped before
//! counting.

use super::{FactorDetail, FactorScore, GuildContext};
use crate::utils::{count_shared_organisms, quadratic_overlap, shared_at_least, squash, SharedOrganism};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

const HERBIVORE_SEVERITY: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerbivoreOverlapDetail {
    /// True pests on 2+ members, most widely shared first
    pub shared: Vec<SharedOrganism>,
    /// Herbivores skipped because they also visit the guild's flowers
    pub excluded_visitors: Vec<String>,
}

pub fn calculate_herbivore_overlap(ctx: &GuildContext<'_>) -> FactorScore {
    let plants = ctx.relationships();
    let n = plants.len();

    let guild_visitors: FxHashSet<&String> = plants.iter().flat_map(|p| p.visitors()).collect();

    let visitors = &guild_visitors;
    let counts = count_shared_organisms(&plants, move |p| {
        p.herbivores.iter().filter(move |h| !visitors.contains(h))
    });
    let shared = shared_at_least(&counts, 2);

    let mut excluded_visitors: Vec<String> = plants
        .iter()
        .flat_map(|p| p.herbivores.iter())
        .filter(|h| guild_visitors.contains(h))
        .cloned()
        .collect();
    excluded_visitors.sort_unstable();
    excluded_visitors.dedup();

    let raw = quadratic_overlap(&shared, n, |_| HERBIVORE_SEVERITY);

    FactorScore {
        score: squash(raw, ctx.config.scales.herbivore_overlap),
        raw,
        detail: FactorDetail::HerbivoreOverlap(HerbivoreOverlapDetail { shared, excluded_visitors }),
        warnings: Vec::new(),
    }
}
