//! FACTOR P4: PHYLOGENETIC DIVERSITY
//!
//! Mean pairwise Euclidean distance between phylogenetic eigenvector
//! embeddings, squashed with `tanh(mean / scale)`. Distantly related
//! members share fewer specialist pests.
//!
//! An embedding that is absent, has the wrong dimension, or contains a
//! non-finite value is treated as missing. With fewer than two usable
//! embeddings the factor resolves to 0 with a warning.

use super::{FactorDetail, FactorScore, GuildContext};
use crate::breakdown::GuildWarning;
use crate::utils::{euclidean_distance, squash};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhyloDiversityDetail {
    pub mean_distance: f64,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    /// Members with a usable embedding
    pub species_used: usize,
    pub excluded_species: Vec<String>,
}

pub fn calculate_phylo_diversity(ctx: &GuildContext<'_>) -> FactorScore {
    let dimensions = ctx.config.phylo_dimensions;

    let mut embeddings: Vec<&[f64]> = Vec::with_capacity(ctx.len());
    let mut excluded_species = Vec::new();
    for member in &ctx.members {
        match member.attributes.phylo_embedding.as_deref() {
            Some(ev) if ev.len() == dimensions && ev.iter().all(|v| v.is_finite()) => {
                embeddings.push(ev)
            }
            _ => excluded_species.push(member.id().to_string()),
        }
    }

    let mut distances = Vec::new();
    for i in 0..embeddings.len() {
        for j in (i + 1)..embeddings.len() {
            distances.push(euclidean_distance(embeddings[i], embeddings[j]));
        }
    }

    let resolved_to_zero = distances.is_empty();
    let mean_distance = if resolved_to_zero {
        0.0
    } else {
        distances.iter().sum::<f64>() / distances.len() as f64
    };

    let mut warnings = Vec::new();
    if !excluded_species.is_empty() {
        tracing::warn!(
            species = ?excluded_species,
            resolved_to_zero,
            "no usable phylogenetic embedding; excluded from phylogenetic diversity"
        );
        warnings.push(GuildWarning::MissingPhyloEmbedding {
            species: excluded_species.clone(),
            resolved_to_zero,
        });
    }

    let score = if resolved_to_zero {
        0.0
    } else {
        squash(mean_distance, ctx.config.scales.phylo_distance)
    };

    FactorScore {
        score,
        raw: mean_distance,
        detail: FactorDetail::PhyloDiversity(PhyloDiversityDetail {
            mean_distance,
            min_distance: distances.iter().copied().reduce(f64::min),
            max_distance: distances.iter().copied().reduce(f64::max),
            species_used: embeddings.len(),
            excluded_species,
        }),
        warnings,
    }
}
