//! Engine configuration.
//!
//! Everything here is tunable; only the relative ordering of the similarity
//! weights carries meaning (see `MatchWeights`).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Weights for the similarity comparator.
///
/// A candidate pair must agree on variant (and tag, for elements) to score at
/// all. On top of `base`, the comparator adds:
/// - `attributes` × overlap ratio per attribute family (plain, style, class),
///   or the text/native similarity ratio for those variants;
/// - `logical_overlap` × overlap of the logical nodes each side renders;
/// - `location_overlap` × overlap of the LocationSets.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    pub base: f64,
    pub attributes: f64,
    pub logical_overlap: f64,
    pub location_overlap: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            base: 1.0,
            attributes: 1.0,
            logical_overlap: 0.1,
            location_overlap: 0.01,
        }
    }
}

impl MatchWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("base", self.base),
            ("attributes", self.attributes),
            ("logical_overlap", self.logical_overlap),
            ("location_overlap", self.location_overlap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        if self.logical_overlap > self.attributes {
            return Err(ConfigError::WeightOrder {
                higher: "attributes",
                higher_value: self.attributes,
                lower: "logical_overlap",
                lower_value: self.logical_overlap,
            });
        }
        if self.location_overlap > self.logical_overlap {
            return Err(ConfigError::WeightOrder {
                higher: "logical_overlap",
                higher_value: self.logical_overlap,
                lower: "location_overlap",
                lower_value: self.location_overlap,
            });
        }
        Ok(())
    }
}

/// Engine-wide settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub weights: MatchWeights,
    /// Reuse host elements released earlier in the same pass for new records
    /// of the same tag in the same container.
    pub recycle_orphans: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            weights: MatchWeights::default(),
            recycle_orphans: true,
        }
    }
}

impl ReconcileConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()
    }
}
