//! Normalization Utilities
//!
//! Bounded saturating transforms that map unbounded raw accumulations onto
//! [0, 1], plus the pair counts used to turn pairwise sums into densities.

/// Squash a non-negative raw accumulation into [0, 1) with `tanh(raw / scale)`
pub fn squash(raw: f64, scale: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 0.0;
    }
    clamp_unit(libm::tanh(raw / scale))
}

/// Squash a pairwise sum after dividing by the pair count and applying a
/// density multiplier: `tanh(raw / pairs * multiplier)`
///
/// Returns the pre-squash density alongside the squashed value.
pub fn squash_density(raw: f64, pairs: usize, multiplier: f64) -> (f64, f64) {
    if pairs == 0 {
        return (0.0, 0.0);
    }
    let density = raw / pairs as f64 * multiplier;
    (density, clamp_unit(libm::tanh(density)))
}

/// Clamp to [0, 1]; NaN maps to 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Number of unordered pairs among `n` members: n(n-1)/2
pub fn unordered_pairs(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Number of ordered pairs among `n` members: n(n-1)
pub fn ordered_pairs(n: usize) -> usize {
    n * n.saturating_sub(1)
}

/// Euclidean distance between two equal-length vectors
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
