//! FACTOR N6: SOIL pH INCOMPATIBILITY
//!
//! Range of the members' characteristic soil pH: > 2.5 → 1.0, > 1.5 → 0.5,
//! otherwise 0.0. Members without a pH value are left out of the range.

use super::{FactorDetail, FactorScore, GuildContext};
use crate::breakdown::GuildWarning;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilPhDetail {
    pub min_ph: Option<f64>,
    pub max_ph: Option<f64>,
    pub ph_range: f64,
    pub excluded_species: Vec<String>,
}

pub fn calculate_soil_ph(ctx: &GuildContext<'_>) -> FactorScore {
    let mut values = Vec::with_capacity(ctx.len());
    let mut excluded_species = Vec::new();

    for member in &ctx.members {
        match member.attributes.soil_ph_mean {
            Some(ph) if ph.is_finite() => values.push(ph),
            _ => excluded_species.push(member.id().to_string()),
        }
    }

    let min_ph = values.iter().copied().reduce(f64::min);
    let max_ph = values.iter().copied().reduce(f64::max);
    let ph_range = match (min_ph, max_ph) {
        (Some(lo), Some(hi)) => hi - lo,
        _ => 0.0,
    };

    let score = if ph_range > 2.5 {
        1.0
    } else if ph_range > 1.5 {
        0.5
    } else {
        0.0
    };

    let mut warnings = Vec::new();
    if !excluded_species.is_empty() {
        tracing::warn!(species = ?excluded_species, "no soil pH; excluded from pH range");
        warnings.push(GuildWarning::MissingSoilPh { species: excluded_species.clone() });
    }

    FactorScore {
        score,
        raw: ph_range,
        detail: FactorDetail::SoilPh(SoilPhDetail { min_ph, max_ph, ph_range, excluded_species }),
        warnings,
    }
}
