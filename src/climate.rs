//! CLIMATE FILTER: Three-level admissibility check
//!
//! Runs before any factor is computed.
//!
//! - Level 1: shared annual temperature range (and annual precipitation
//!   range when every member carries one). A negative overlap vetoes.
//! - Level 2: shared winter-hardiness range. An overlap below
//!   `-hardiness_tolerance` vetoes.
//! - Level 3: shared extreme-stress vulnerability. Advisory only.
//!
//! Every level is evaluated so the verdict lists all failing reasons and the
//! Level 3 findings travel with vetoed and scored guilds alike.

use crate::config::ClimateThresholds;
use crate::species::{ClimateRange, SpeciesAttributes, StressExposure};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named extreme-stress indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressKind {
    Drought,
    Frost,
    Heat,
    ColdSpell,
}

impl StressKind {
    pub const ALL: [StressKind; 4] = [
        StressKind::Drought,
        StressKind::Frost,
        StressKind::Heat,
        StressKind::ColdSpell,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StressKind::Drought => "drought",
            StressKind::Frost => "frost",
            StressKind::Heat => "heat",
            StressKind::ColdSpell => "cold spell",
        }
    }

    fn exposure(&self, stress: &StressExposure) -> Option<f64> {
        match self {
            StressKind::Drought => stress.drought,
            StressKind::Frost => stress.frost,
            StressKind::Heat => stress.heat,
            StressKind::ColdSpell => stress.cold_spell,
        }
    }

    fn threshold(&self, thresholds: &ClimateThresholds) -> f64 {
        match self {
            StressKind::Drought => thresholds.drought_days,
            StressKind::Frost => thresholds.frost_days,
            StressKind::Heat => thresholds.heat_days,
            StressKind::ColdSpell => thresholds.cold_spell_days,
        }
    }
}

impl fmt::Display for StressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intersection of every member's range: max of minima to min of maxima
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharedRange {
    pub shared_min: f64,
    pub shared_max: f64,
    /// `shared_max - shared_min`; negative when the ranges are disjoint
    pub overlap: f64,
}

impl SharedRange {
    fn intersect<I>(ranges: I) -> Option<Self>
    where
        I: IntoIterator<Item = ClimateRange>,
    {
        let mut iter = ranges.into_iter();
        let first = iter.next()?;
        let (shared_min, shared_max) = iter.fold((first.min, first.max), |(lo, hi), r| {
            (lo.max(r.min), hi.min(r.max))
        });
        Some(Self {
            shared_min,
            shared_max,
            overlap: shared_max - shared_min,
        })
    }
}

/// Members exceeding one stress threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressVulnerability {
    pub stress: StressKind,
    pub vulnerable_species: Vec<String>,
    /// Fraction of the guild that is vulnerable
    pub fraction: f64,
}

/// Everything the filter measured, reported whether or not the guild vetoes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateAssessment {
    pub temperature: SharedRange,
    pub winter_hardiness: SharedRange,
    /// Present only when every member has precipitation data
    pub precipitation: Option<SharedRange>,
    /// Shared vulnerabilities reaching `min_shared_vulnerable` members
    pub vulnerabilities: Vec<StressVulnerability>,
}

/// Hard admissibility failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VetoReason {
    NoSharedTemperatureRange { overlap: f64 },
    WinterHardinessMismatch { overlap: f64, tolerance: f64 },
    NoSharedPrecipitationRange { overlap: f64 },
}

impl fmt::Display for VetoReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VetoReason::NoSharedTemperatureRange { overlap } => write!(
                f,
                "no shared temperature range (overlap {:.1} °C)",
                overlap
            ),
            VetoReason::WinterHardinessMismatch { overlap, tolerance } => write!(
                f,
                "winter hardiness mismatch (overlap {:.1} °C, tolerance -{:.1} °C)",
                overlap, tolerance
            ),
            VetoReason::NoSharedPrecipitationRange { overlap } => write!(
                f,
                "no shared precipitation range (overlap {:.0} mm)",
                overlap
            ),
        }
    }
}

/// Filter output: the measurements plus every failing veto level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateVerdict {
    pub assessment: ClimateAssessment,
    pub veto_reasons: Vec<VetoReason>,
}

impl ClimateVerdict {
    pub fn is_vetoed(&self) -> bool {
        !self.veto_reasons.is_empty()
    }
}

/// Run all three filter levels over the guild members
///
/// `members` must be non-empty; the scorer only calls this after guild-size
/// validation.
pub fn check_climate_compatibility(
    members: &[&SpeciesAttributes],
    thresholds: &ClimateThresholds,
) -> ClimateVerdict {
    let empty = SharedRange { shared_min: 0.0, shared_max: 0.0, overlap: 0.0 };

    // Level 1: tolerance overlap
    let temperature = SharedRange::intersect(members.iter().map(|m| m.climate.temperature))
        .unwrap_or(empty);

    let precipitation = if members.iter().all(|m| m.climate.precipitation.is_some()) {
        SharedRange::intersect(members.iter().filter_map(|m| m.climate.precipitation))
    } else {
        None
    };

    // Level 2: winter hardiness
    let winter_hardiness =
        SharedRange::intersect(members.iter().map(|m| m.climate.winter_hardiness))
            .unwrap_or(empty);

    let mut veto_reasons = Vec::new();
    if temperature.overlap < 0.0 {
        veto_reasons.push(VetoReason::NoSharedTemperatureRange { overlap: temperature.overlap });
    }
    if let Some(precip) = precipitation {
        if precip.overlap < 0.0 {
            veto_reasons.push(VetoReason::NoSharedPrecipitationRange { overlap: precip.overlap });
        }
    }
    if winter_hardiness.overlap < -thresholds.hardiness_tolerance {
        veto_reasons.push(VetoReason::WinterHardinessMismatch {
            overlap: winter_hardiness.overlap,
            tolerance: thresholds.hardiness_tolerance,
        });
    }

    // Level 3: shared vulnerabilities
    let vulnerabilities = shared_vulnerabilities(members, thresholds);

    ClimateVerdict {
        assessment: ClimateAssessment {
            temperature,
            winter_hardiness,
            precipitation,
            vulnerabilities,
        },
        veto_reasons,
    }
}

fn shared_vulnerabilities(
    members: &[&SpeciesAttributes],
    thresholds: &ClimateThresholds,
) -> Vec<StressVulnerability> {
    let n = members.len();
    StressKind::ALL
        .iter()
        .filter_map(|&stress| {
            let limit = stress.threshold(thresholds);
            let vulnerable_species: Vec<String> = members
                .iter()
                .filter(|m| {
                    stress
                        .exposure(&m.climate.stress)
                        .map_or(false, |days| days > limit)
                })
                .map(|m| m.id.clone())
                .collect();

            if vulnerable_species.len() >= thresholds.min_shared_vulnerable {
                Some(StressVulnerability {
                    stress,
                    fraction: vulnerable_species.len() as f64 / n as f64,
                    vulnerable_species,
                })
            } else {
                None
            }
        })
        .collect()
}
