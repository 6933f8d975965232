//! FACTOR P6: SHARED POLLINATORS
//!
//! Quadratic overlap over the union of pollinators and flower visitors.
//! Shared visitors are a benefit here, so the N1/N2 form is reused with its
//! own scale: `tanh(Σ (count / n)² / scale)`.

use super::{FactorDetail, FactorScore, GuildContext};
use crate::utils::{count_shared_organisms, quadratic_overlap, shared_at_least, squash, SharedOrganism};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedPollinatorsDetail {
    pub shared: Vec<SharedOrganism>,
}

pub fn calculate_shared_pollinators(ctx: &GuildContext<'_>) -> FactorScore {
    let plants = ctx.relationships();
    let n = plants.len();

    let counts = count_shared_organisms(&plants, |p| p.visitors());
    let shared = shared_at_least(&counts, 2);
    let raw = quadratic_overlap(&shared, n, |_| 1.0);

    FactorScore {
        score: squash(raw, ctx.config.scales.shared_pollinators),
        raw,
        detail: FactorDetail::SharedPollinators(SharedPollinatorsDetail { shared }),
        warnings: Vec::new(),
    }
}
