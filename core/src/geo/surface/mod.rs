//! Rupture surfaces and the distance metrics they provide.
//!
//! Every surface kind implements [`Surface`]; a [`MultiSurface`] composes
//! any of them (including other multi-surfaces) behind trait objects.

pub mod base;
pub mod complex_fault;
pub mod gc2;
pub mod kite;
pub mod multi;
pub mod planar;
pub mod simple_fault;

#[cfg(test)]
mod tests_multi;
#[cfg(test)]
mod tests_planar;

pub use base::FaultMesh;
pub use complex_fault::ComplexFaultSurface;
pub use gc2::Gc2Frame;
pub use kite::{get_discrete_dimensions, KiteSurface};
pub use multi::MultiSurface;
pub use planar::PlanarSurface;
pub use simple_fault::SimpleFaultSurface;

use std::fmt;

use ndarray::ArrayD;

use super::{BoundingBox, GeoResult, Mesh, Point};

/// Geometry and site-distance queries shared by all rupture surfaces.
///
/// Distance queries return arrays shaped like the `sites` mesh. Angles are
/// degrees, lengths kilometres and areas square kilometres.
pub trait Surface: Send + Sync + fmt::Debug {
    /// Closest 3-D distance from each site to the surface.
    fn get_min_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>>;

    /// Point of the surface closest to each site.
    fn get_closest_points(&self, sites: &Mesh) -> GeoResult<Mesh>;

    /// Distance from each site to the surface projection of the rupture.
    /// Never negative; zero above the rupture.
    fn get_joyner_boore_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>>;

    /// Signed distance to the top edge extended along strike, positive on
    /// the hanging-wall side.
    fn get_rx_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>>;

    /// Distance measured parallel to strike from the ends of the rupture;
    /// zero for sites alongside it.
    fn get_ry0_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>>;

    fn get_top_edge_depth(&self) -> f64;

    fn get_strike(&self) -> f64;

    fn get_dip(&self) -> f64;

    fn get_width(&self) -> f64;

    fn get_area(&self) -> f64;

    fn get_bounding_box(&self) -> GeoResult<BoundingBox>;

    fn get_middle_point(&self) -> GeoResult<Point>;

    /// The top edge as a trace for generalised coordinates, simplified so
    /// that direction changes below `tolerance` degrees are dropped.
    fn get_top_edge(&self, tolerance: f64) -> GeoResult<Vec<Point>>;
}
