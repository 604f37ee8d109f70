//! Cartesian helpers shared by the geodetic engine.
//!
//! Everything here works in flat space: either the 3-D earth-centred frame
//! produced by [`crate::geo::projection::spherical_to_cartesian`] or a 2-D
//! orthographic projection plane, both in kilometres.

use nalgebra as na;

pub type Vector2 = na::Vector2<f64>;
pub type Vector3 = na::Vector3<f64>;

pub const EPSILON: f64 = 1e-6;

/// Sign of `value`, with zero mapped to zero.
#[inline]
pub fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() < EPSILON
    }
}

impl ApproxEq for Vector2 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).norm_squared() < EPSILON * EPSILON
    }
}

impl ApproxEq for Vector3 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).norm_squared() < EPSILON * EPSILON
    }
}

pub mod utils_2d;
pub mod utils_3d;
