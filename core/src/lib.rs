pub mod config;
pub mod contexts;
pub mod geo;
pub mod geometry;

pub use config::GeoConfig;
pub use contexts::{DistancesContext, RuptureContext};
pub use geo::surface::Surface;
pub use geo::{GeoError, GeoResult, Line, Mesh, Point, RectangularMesh};

pub fn version() -> &'static str {
    "0.1.0"
}
