//! Utility modules for guild scoring
//!
//! Contains shared functionality used across multiple factors:
//! - Normalization: saturating squash and pair-count densities
//! - Organism counting: shared organism network analysis

pub mod normalization;
pub mod organism_counter;

// Re-export commonly used items
pub use normalization::{clamp_unit, euclidean_distance, ordered_pairs, squash, squash_density, unordered_pairs};
pub use organism_counter::{count_shared_organisms, find_matches, quadratic_overlap, shared_at_least, SharedOrganism};
