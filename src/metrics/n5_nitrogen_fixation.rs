//! FACTOR N5: NITROGEN FIXATION ABSENCE
//!
//! 0 fixers → 1.0, exactly 1 → 0.5, 2 or more → 0.0.

use super::{FactorDetail, FactorScore, GuildContext};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NitrogenFixationDetail {
    pub fixers: Vec<String>,
}

pub fn calculate_nitrogen_fixation(ctx: &GuildContext<'_>) -> FactorScore {
    let fixers: Vec<String> = ctx
        .members
        .iter()
        .filter(|m| m.attributes.nitrogen_fixation)
        .map(|m| m.id().to_string())
        .collect();

    let score = match fixers.len() {
        0 => 1.0,
        1 => 0.5,
        _ => 0.0,
    };

    FactorScore {
        score,
        raw: fixers.len() as f64,
        detail: FactorDetail::NitrogenFixation(NitrogenFixationDetail { fixers }),
        warnings: Vec::new(),
    }
}
