//! FACTOR P5: VERTICAL AND FORM STRATIFICATION
//!
//! Members that occupy different height layers and growth forms use light
//! and space complementarily.
//!
//! Height component (60%):
//!   0.6 × (layers occupied - 1) / 4 + 0.4 × tanh(height range / scale)
//! Form component (40%):
//!   (distinct forms - 1) / (max forms - 1)

use super::{FactorDetail, FactorScore, GuildContext};
use crate::species::GrowthForm;
use crate::utils::{clamp_unit, squash};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const HEIGHT_WEIGHT: f64 = 0.6;
const FORM_WEIGHT: f64 = 0.4;
const LAYER_WEIGHT: f64 = 0.6;
const RANGE_WEIGHT: f64 = 0.4;
/// Transitions between the five layers
const LAYER_TRANSITIONS: f64 = 4.0;

/// Height layer bins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightLayer {
    /// < 0.5 m
    GroundCover,
    /// 0.5 - 2 m
    LowHerb,
    /// 2 - 5 m
    Shrub,
    /// 5 - 15 m
    SmallTree,
    /// >= 15 m
    LargeTree,
}

impl HeightLayer {
    pub fn from_height(height_m: f64) -> Self {
        if height_m < 0.5 {
            HeightLayer::GroundCover
        } else if height_m < 2.0 {
            HeightLayer::LowHerb
        } else if height_m < 5.0 {
            HeightLayer::Shrub
        } else if height_m < 15.0 {
            HeightLayer::SmallTree
        } else {
            HeightLayer::LargeTree
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratificationDetail {
    pub layers: Vec<HeightLayer>,
    pub height_range: f64,
    pub growth_forms: Vec<GrowthForm>,
    pub height_component: f64,
    pub form_component: f64,
}

pub fn calculate_stratification(ctx: &GuildContext<'_>) -> FactorScore {
    let heights: Vec<f64> = ctx.members.iter().map(|m| m.attributes.height_m).collect();

    let layers: BTreeSet<HeightLayer> = heights.iter().map(|h| HeightLayer::from_height(*h)).collect();
    let forms: BTreeSet<GrowthForm> = ctx.members.iter().map(|m| m.attributes.growth_form).collect();

    let height_range = match (
        heights.iter().copied().reduce(f64::min),
        heights.iter().copied().reduce(f64::max),
    ) {
        (Some(lo), Some(hi)) => hi - lo,
        _ => 0.0,
    };

    let layer_diversity = layers.len().saturating_sub(1) as f64 / LAYER_TRANSITIONS;
    let range_score = squash(height_range, ctx.config.scales.height_range);
    let height_component = LAYER_WEIGHT * layer_diversity + RANGE_WEIGHT * range_score;

    let max_forms = ctx.config.max_growth_forms.max(2);
    let form_component =
        clamp_unit(forms.len().saturating_sub(1) as f64 / (max_forms - 1) as f64);

    let raw = HEIGHT_WEIGHT * height_component + FORM_WEIGHT * form_component;

    FactorScore {
        score: clamp_unit(raw),
        raw,
        detail: FactorDetail::Stratification(StratificationDetail {
            layers: layers.into_iter().collect(),
            height_range,
            growth_forms: forms.into_iter().collect(),
            height_component,
            form_component,
        }),
        warnings: Vec::new(),
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

    fn sized(id: &str, height: f64, form: GrowthForm) -> SpeciesAttributes {
        let mut p = plant(id);
        p.height_m = height;
        p.growth_form = form;
        p
    }

    #[test]
    fn test_layer_bins() {
        assert_eq!(HeightLayer::from_height(0.2), HeightLayer::GroundCover);
        assert_eq!(HeightLayer::from_height(0.5), HeightLayer::LowHerb);
        assert_eq!(HeightLayer::from_height(2.0), HeightLayer::Shrub);
        assert_eq!(HeightLayer::from_height(14.9), HeightLayer::SmallTree);
        assert_eq!(HeightLayer::from_height(15.0), HeightLayer::LargeTree);
    }

    #[test]
    fn test_uniform_guild_scores_zero() {
        let plants = vec![sized("a", 1.0, GrowthForm::Herb), sized("b", 1.0, GrowthForm::Herb)];
        let rels = vec![RelationshipSets::default(); 2];
        let lookups = LookupTables::default();
        let config = ScoringConfig::default();

        let result = calculate_stratification(&context(&plants, &rels, &lookups, &config));
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_layered_guild() {
        let plants = vec![
            sized("a", 0.3, GrowthForm::Herb),
            sized("b", 3.0, GrowthForm::Shrub),
            sized("c", 20.3, GrowthForm::Tree),
        ];
        let rels = vec![RelationshipSets::default(); 3];
        let lookups = LookupTables::default();
        let config = ScoringConfig::default();

        let result = calculate_stratification(&context(&plants, &rels, &lookups, &config));

        let height = 0.6 * (2.0 / 4.0) + 0.4 * libm::tanh(20.0 / 10.0);
        let form = 2.0 / 5.0;
        assert_relative_eq!(result.score, 0.6 * height + 0.4 * form, epsilon = 1e-9);

        match result.detail {
            FactorDetail::Stratification(detail) => {
                assert_eq!(
                    detail.layers,
                    vec![HeightLayer::GroundCover, HeightLayer::Shrub, HeightLayer::LargeTree]
                );
                assert_eq!(detail.growth_forms.len(), 3);
            }
            other => panic!("unexpected detail {:?}", other),
        }
    }
}
