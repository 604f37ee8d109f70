//! Site and rupture parameters handed to ground-motion models.

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geo::surface::Surface;
use crate::geo::{GeoResult, Mesh, Point};

/// Source-to-site distances (km), each shaped like the site mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistancesContext {
    pub rrup: ArrayD<f64>,
    pub rjb: ArrayD<f64>,
    pub rx: ArrayD<f64>,
    pub ry0: ArrayD<f64>,
}

impl DistancesContext {
    pub fn from_surface(surface: &dyn Surface, sites: &Mesh) -> GeoResult<Self> {
        trace!(sites = sites.len(), "computing distances context");
        Ok(Self {
            rrup: surface.get_min_distance(sites)?,
            rjb: surface.get_joyner_boore_distance(sites)?,
            rx: surface.get_rx_distance(sites)?,
            ry0: surface.get_ry0_distance(sites)?,
        })
    }
}

/// Geometric rupture parameters. The hypocenter is placed at the middle
/// point of the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuptureContext {
    pub strike: f64,
    pub dip: f64,
    pub ztor: f64,
    pub width: f64,
    pub area: f64,
    pub hypocenter: Point,
}

impl RuptureContext {
    pub fn from_surface(surface: &dyn Surface) -> GeoResult<Self> {
        Ok(Self {
            strike: surface.get_strike(),
            dip: surface.get_dip(),
            ztor: surface.get_top_edge_depth(),
            width: surface.get_width(),
            area: surface.get_area(),
            hypocenter: surface.get_middle_point()?,
        })
    }
}
