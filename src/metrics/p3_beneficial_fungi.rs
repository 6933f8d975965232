//! FACTOR P3: BENEFICIAL FUNGAL NETWORK
//!
//! Shared mutualists (AMF, EMF, endophytes, saprotrophs) connect members
//! into a common network.
//!
//! Components:
//!   - network: Σ count / n over fungi shared by 2+ members (linear)
//!   - coverage: fraction of members with any beneficial fungus
//!
//! Score = tanh((0.6 × network + 0.4 × coverage) / scale)

use super::{FactorDetail, FactorScore, GuildContext};
use crate::utils::{count_shared_organisms, shared_at_least, squash, SharedOrganism};
use serde::{Deserialize, Serialize};

const NETWORK_WEIGHT: f64 = 0.6;
const COVERAGE_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficialFungiDetail {
    pub shared: Vec<SharedOrganism>,
    pub network_raw: f64,
    pub coverage: f64,
}

pub fn calculate_beneficial_fungi(ctx: &GuildContext<'_>) -> FactorScore {
    let plants = ctx.relationships();
    let n = plants.len();
    if n == 0 {
        return FactorScore {
            score: 0.0,
            raw: 0.0,
            detail: FactorDetail::BeneficialFungi(BeneficialFungiDetail {
                shared: Vec::new(),
                network_raw: 0.0,
                coverage: 0.0,
            }),
            warnings: Vec::new(),
        };
    }

    let counts = count_shared_organisms(&plants, |p| p.beneficial_fungi());
    let shared = shared_at_least(&counts, 2);

    let network_raw: f64 = shared
        .iter()
        .map(|org| org.plant_count as f64 / n as f64)
        .sum();

    let with_fungi = plants.iter().filter(|p| p.has_beneficial_fungi()).count();
    let coverage = with_fungi as f64 / n as f64;

    let raw = NETWORK_WEIGHT * network_raw + COVERAGE_WEIGHT * coverage;

    FactorScore {
        score: squash(raw, ctx.config.scales.beneficial_fungi),
        raw,
        detail: FactorDetail::BeneficialFungi(BeneficialFungiDetail { shared, network_raw, coverage }),
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::data::LookupTables;
    use crate::metrics::test_support::{context, plant, set};
    use crate::species::RelationshipSets;
    use approx::assert_relative_eq;

    #[test]
    fn test_network_and_coverage() {
        let plants = vec![plant("a"), plant("b"), plant("c"), plant("d")];
        let rels = vec![
            RelationshipSets { amf_fungi: set(&["glomus"]), ..Default::default() },
            RelationshipSets {
                amf_fungi: set(&["glomus"]),
                endophytic_fungi: set(&["epichloe"]),
                ..Default::default()
            },
            // Same fungus recorded under two subtypes counts once for this plant
            RelationshipSets {
                saprotrophic_fungi: set(&["epichloe"]),
                endophytic_fungi: set(&["epichloe"]),
                ..Default::default()
            },
            RelationshipSets::default(),
        ];
        let lookups = LookupTables::default();
        let config = ScoringConfig::default();

        let result = calculate_beneficial_fungi(&context(&plants, &rels, &lookups, &config));

        // glomus 2/4 + epichloe 2/4 = 1.0; coverage 3/4
        let expected = 0.6 * 1.0 + 0.4 * 0.75;
        assert_relative_eq!(result.raw, expected, epsilon = 1e-12);
        assert_relative_eq!(result.score, libm::tanh(expected / 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_no_fungi() {
        let plants = vec![plant("a"), plant("b")];
        let rels = vec![RelationshipSets::default(); 2];
        let lookups = LookupTables::default();
        let config = ScoringConfig::default();

        let result = calculate_beneficial_fungi(&context(&plants, &rels, &lookups, &config));
        assert_eq!(result.score, 0.0);
    }
}
