//! Tunable tolerances of the geometry engine.

use serde::{Deserialize, Serialize};

use crate::geo::{GeoError, GeoResult};

/// Tolerances used by distance and coordinate queries.
///
/// Every field has a default, so a partial JSON document such as
/// `{"jb_threshold": 50.0}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Angle change (degrees) at which a mesh top edge is considered to
    /// turn when it is simplified to a trace for generalised coordinates.
    pub edge_tolerance: f64,
    /// Sites closer than this (km) to a trace segment count as lying on it.
    pub on_trace_tolerance: f64,
    /// Sites further than this (km) from every mesh node skip the
    /// projected-footprint Joyner-Boore refinement.
    pub jb_threshold: f64,
    /// Buffer (km) applied to rupture footprints.
    pub dist_tolerance: f64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            edge_tolerance: 0.1,
            on_trace_tolerance: 1e-3,
            jb_threshold: 40.0,
            dist_tolerance: 0.005,
        }
    }
}

impl GeoConfig {
    pub fn from_json_str(json: &str) -> GeoResult<Self> {
        let config: GeoConfig =
            serde_json::from_str(json).map_err(|e| GeoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GeoResult<()> {
        let fields = [
            ("edge_tolerance", self.edge_tolerance),
            ("on_trace_tolerance", self.on_trace_tolerance),
            ("jb_threshold", self.jb_threshold),
            ("dist_tolerance", self.dist_tolerance),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(GeoError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.on_trace_tolerance == 0.0 {
            return Err(GeoError::Config(
                "on_trace_tolerance must be positive".into(),
            ));
        }
        Ok(())
    }
}
