//! Weighted aggregation of factor scores
//!
//! negative = Σ w_i × N_i, positive = Σ w_j × P_j, final = positive - negative.
//! Weights are checked once at construction; both sides summing to 1.0 keeps
//! every aggregate inside its bound without clamping.

use crate::breakdown::{FactorBreakdown, GuildScores};
use crate::config::{NegativeWeights, PositiveWeights};
use crate::error::ConfigError;
use crate::metrics::{FactorScore, NegativeFactor, PositiveFactor};

const WEIGHT_SUM_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Aggregator {
    negative: NegativeWeights,
    positive: PositiveWeights,
}

impl Aggregator {
    pub fn new(negative: NegativeWeights, positive: PositiveWeights) -> Result<Self, ConfigError> {
        let negative_sum = negative.sum();
        if (negative_sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ConfigError::WeightSum { side: "negative", sum: negative_sum });
        }
        let positive_sum = positive.sum();
        if (positive_sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ConfigError::WeightSum { side: "positive", sum: positive_sum });
        }
        Ok(Self { negative, positive })
    }

    pub fn negative_weights(&self) -> &NegativeWeights {
        &self.negative
    }

    pub fn positive_weights(&self) -> &PositiveWeights {
        &self.positive
    }

    /// Combine factor results, given in `NegativeFactor::ALL` / `PositiveFactor::ALL` order
    pub fn combine(
        &self,
        negative: Vec<(NegativeFactor, FactorScore)>,
        positive: Vec<(PositiveFactor, FactorScore)>,
    ) -> GuildScores {
        let negative: Vec<FactorBreakdown<NegativeFactor>> = negative
            .into_iter()
            .map(|(factor, result)| FactorBreakdown {
                factor,
                weight: factor.weight(&self.negative),
                score: result.score,
                raw: result.raw,
                detail: result.detail,
            })
            .collect();
        let positive: Vec<FactorBreakdown<PositiveFactor>> = positive
            .into_iter()
            .map(|(factor, result)| FactorBreakdown {
                factor,
                weight: factor.weight(&self.positive),
                score: result.score,
                raw: result.raw,
                detail: result.detail,
            })
            .collect();

        let negative_score: f64 = negative.iter().map(|f| f.weighted()).sum();
        let positive_score: f64 = positive.iter().map(|f| f.weighted()).sum();
        let final_score = positive_score - negative_score;

        let unit = -WEIGHT_SUM_EPSILON..=1.0 + WEIGHT_SUM_EPSILON;
        let in_bounds = unit.contains(&negative_score)
            && unit.contains(&positive_score)
            && final_score.abs() <= 1.0 + WEIGHT_SUM_EPSILON;
        if !in_bounds {
            tracing::error!(
                negative_score,
                positive_score,
                final_score,
                "aggregate score out of bounds"
            );
        }
        debug_assert!(in_bounds, "aggregate score out of bounds: {}", final_score);

        GuildScores {
            negative,
            positive,
            negative_score,
            positive_score,
            final_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{FactorDetail, NitrogenFixationDetail};
    use approx::assert_relative_eq;

    fn flat(score: f64) -> FactorScore {
        FactorScore {
            score,
            raw: score,
            detail: FactorDetail::NitrogenFixation(NitrogenFixationDetail { fixers: Vec::new() }),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_rejects_drifted_weights() {
        let negative = NegativeWeights { soil_ph: 0.10, ..Default::default() };
        assert!(matches!(
            Aggregator::new(negative, PositiveWeights::default()),
            Err(ConfigError::WeightSum { side: "negative", .. })
        ));
    }

    #[test]
    fn test_extremes_hit_bounds() {
        let aggregator = Aggregator::new(NegativeWeights::default(), PositiveWeights::default()).unwrap();

        let worst = aggregator.combine(
            NegativeFactor::ALL.iter().map(|f| (*f, flat(1.0))).collect(),
            PositiveFactor::ALL.iter().map(|f| (*f, flat(0.0))).collect(),
        );
        assert_relative_eq!(worst.final_score, -1.0, epsilon = 1e-12);

        let best = aggregator.combine(
            NegativeFactor::ALL.iter().map(|f| (*f, flat(0.0))).collect(),
            PositiveFactor::ALL.iter().map(|f| (*f, flat(1.0))).collect(),
        );
        assert_relative_eq!(best.final_score, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weighted_sum() {
        let aggregator = Aggregator::new(NegativeWeights::default(), PositiveWeights::default()).unwrap();
        let negative = NegativeFactor::ALL
            .iter()
            .map(|f| {
                let score = if *f == NegativeFactor::NitrogenFixation { 0.5 } else { 0.0 };
                (*f, flat(score))
            })
            .collect();
        let positive = PositiveFactor::ALL
            .iter()
            .map(|f| {
                let score = if *f == PositiveFactor::PhyloDiversity { 0.5 } else { 0.0 };
                (*f, flat(score))
            })
            .collect();

        let scores = aggregator.combine(negative, positive);
        assert_relative_eq!(scores.negative_score, 0.025, epsilon = 1e-12);
        assert_relative_eq!(scores.positive_score, 0.10, epsilon = 1e-12);
        assert_relative_eq!(scores.final_score, 0.075, epsilon = 1e-12);
    }
}
