//! Geodetic engine: points, lines and meshes on a spherical earth, and the
//! rupture surfaces built from them.
//!
//! Longitudes and latitudes are decimal degrees, depths are kilometres
//! positive downward. Every fallible operation returns [`GeoResult`].

pub mod geodetic;
pub mod line;
pub mod mesh;
pub mod nodalplane;
pub mod point;
pub mod projection;
pub mod surface;

pub use line::Line;
pub use mesh::{Mesh, RectangularMesh};
pub use point::Point;
pub use projection::{BoundingBox, OrthographicProjection};

use thiserror::Error;

/// Mean earth radius in km.
pub const EARTH_RADIUS: f64 = 6371.0;

/// Violations of rupture-surface construction rules.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SurfaceGeometryError {
    #[error("top and bottom edges must be parallel to the earth surface")]
    NonParallelEdges,

    #[error("corners are in the wrong order")]
    WrongCornerOrder,

    #[error("corner points do not lie on the same plane")]
    NonCoplanarCorners,

    #[error("top and bottom edges have different lengths")]
    EdgeLengthMismatch,

    #[error("strike {value} is out of range [0, 360)")]
    StrikeOutOfRange { value: f64 },

    #[error("dip {value} is out of range (0, 90]")]
    DipOutOfRange { value: f64 },

    #[error("the fault trace must have at least two points")]
    TooFewTracePoints,

    #[error("fault trace must be horizontal")]
    NonHorizontalTrace,

    #[error("upper seismogenic depth must be greater than or equal to depth of fault trace")]
    TraceBelowUpperDepth,

    #[error("lower seismogenic depth must be greater than upper seismogenic depth")]
    InvalidSeismogenicDepths,

    #[error("at least two edges are required")]
    TooFewEdges,

    #[error("edge {index} must have at least two points")]
    TooFewEdgePoints { index: usize },

    #[error("edges must be ordered from the shallowest to the deepest")]
    EdgesInWrongOrder,

    #[error("at least two profiles are required")]
    TooFewProfiles,

    #[error("mesh spacing {spacing:.1} km is too big for mean {extent} {length:.1} km")]
    SpacingTooCoarse {
        spacing: f64,
        extent: &'static str,
        length: f64,
    },
}

/// Errors produced by the geodetic engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    #[error(transparent)]
    Surface(#[from] SurfaceGeometryError),

    #[error("a line must contain at least one point")]
    EmptyLine,

    #[error("{operation} needs at least {required} points, got {actual}")]
    TooFewPoints {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("spacing must be positive, got {0}")]
    NonPositiveSpacing(f64),

    #[error("resampling spacing {spacing} km is too coarse for a line of {length:.3} km")]
    ResampleTooCoarse { spacing: f64, length: f64 },

    #[error("fault trace intersects itself")]
    SelfIntersectingTrace,

    #[error("mesh is invalid: {0}")]
    InvalidMesh(String),

    #[error("points collection has longitudinal extent wider than 180 deg")]
    ExtentTooWide,

    #[error("some points are too far from the projection center lon={lon} lat={lat}")]
    ProjectionTooFar { lon: f64, lat: f64 },

    #[error("cannot resolve an overall strike: {0}")]
    Gc2Degenerate(String),

    #[error("not supported: {0}")]
    Unsupported(String),

    #[error("area discrepancy: requested {area}, discretised {length} x {width} (aspect ratio {aspect_ratio})")]
    Discretisation {
        area: f64,
        length: f64,
        width: f64,
        aspect_ratio: f64,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for geodetic operations.
pub type GeoResult<T> = Result<T, GeoError>;

/// Fail with [`GeoError::NonPositiveSpacing`] unless `spacing > 0`.
pub(crate) fn check_spacing(spacing: f64) -> GeoResult<()> {
    if spacing > 0.0 {
        Ok(())
    } else {
        Err(GeoError::NonPositiveSpacing(spacing))
    }
}
