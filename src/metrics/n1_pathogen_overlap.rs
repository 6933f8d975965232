//! FACTOR N1: PATHOGEN OVERLAP
//!
//! Fungal pathogens shared by two or more members compound disease risk.
//! Each shared pathogen contributes `(count / n)² × severity`, where severity
//! is 1.0 when any host flags it host-specific and 0.6 otherwise. The sum is
//! squashed with `tanh(raw / scale)`.

use super::{FactorDetail, FactorScore, GuildContext};
use crate::utils::{count_shared_organisms, quadratic_overlap, shared_at_least, squash, SharedOrganism};
use serde::{Deserialize, Serialize};

const HOST_SPECIFIC_SEVERITY: f64 = 1.0;
const GENERALIST_SEVERITY: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathogenOverlapDetail {
    /// Pathogens on 2+ members, most widely shared first
    pub shared: Vec<SharedOrganism>,
    pub host_specific_shared: usize,
}

pub fn calculate_pathogen_overlap(ctx: &GuildContext<'_>) -> FactorScore {
    let plants = ctx.relationships();
    let n = plants.len();

    let counts = count_shared_organisms(&plants, |p| p.pathogenic_fungi.iter());
    let shared = shared_at_least(&counts, 2);

    let is_host_specific = |org: &SharedOrganism| {
        plants.iter().any(|p| p.host_specific_pathogens.contains(&org.id))
    };

    let raw = quadratic_overlap(&shared, n, |org| {
        if is_host_specific(org) {
            HOST_SPECIFIC_SEVERITY
        } else {
            GENERALIST_SEVERITY
        }
    });
    let host_specific_shared = shared.iter().filter(|org| is_host_specific(org)).count();

    FactorScore {
        score: squash(raw, ctx.config.scales.pathogen_overlap),
        raw,
        detail: FactorDetail::PathogenOverlap(PathogenOverlapDetail { shared, host_specific_shared }),
        warnings: Vec::new(),
    }
}
