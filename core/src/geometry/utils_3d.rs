//! 3D geometry in the earth-centred Cartesian frame.
//!
//! Planar rupture surfaces are handled as a plane with an in-plane basis so
//! that sites can be expressed as (offset from plane, along strike, down dip).

use super::{Vector3, EPSILON};

// =============================================================================
// Plane Representation
// =============================================================================

/// A plane in Hessian normal form with an orthonormal in-plane basis.
///
/// `uv1` runs from the origin along the top edge, `uv2` completes a
/// right-handed frame with `normal` and points down dip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFrame {
    pub normal: Vector3,
    pub d: f64,
    pub uv1: Vector3,
    pub uv2: Vector3,
    pub origin: Vector3,
}

impl PlaneFrame {
    /// Build the frame of a quadrilateral from three of its corners.
    pub fn from_corners(top_left: Vector3, top_right: Vector3, bottom_left: Vector3) -> Self {
        let normal = normalized(&(top_left - top_right).cross(&(top_left - bottom_left)));
        let d = -normal.dot(&top_left);
        let uv1 = normalized(&(top_right - top_left));
        let uv2 = normal.cross(&uv1);
        Self {
            normal,
            d,
            uv1,
            uv2,
            origin: top_left,
        }
    }

    /// Signed distance from a point to the plane.
    /// Positive = point is on the side the normal points to.
    #[inline]
    pub fn signed_distance(&self, point: &Vector3) -> f64 {
        self.normal.dot(point) + self.d
    }

    /// Express a point as `(distance, x, y)`: its offset from the plane and
    /// the in-plane coordinates of its orthogonal projection.
    pub fn project(&self, point: &Vector3) -> (f64, f64, f64) {
        let dist = self.signed_distance(point);
        let on_plane = point - self.normal * dist;
        let rel = on_plane - self.origin;
        (dist, rel.dot(&self.uv1), rel.dot(&self.uv2))
    }

    /// Inverse of [`PlaneFrame::project`].
    pub fn unproject(&self, dist: f64, x: f64, y: f64) -> Vector3 {
        self.origin + self.uv1 * x + self.uv2 * y + self.normal * dist
    }
}

// =============================================================================
// Vector / Triangle Operations
// =============================================================================

/// Unit vector in the direction of `v`, or zero for a zero-length input.
#[inline]
pub fn normalized(v: &Vector3) -> Vector3 {
    let len = v.norm();
    if len < EPSILON * EPSILON {
        Vector3::zeros()
    } else {
        v / len
    }
}

/// Area of the triangle spanned by three edge vectors (Heron's formula).
pub fn triangle_area(e1: &Vector3, e2: &Vector3, e3: &Vector3) -> f64 {
    let a = e1.norm();
    let b = e2.norm();
    let c = e3.norm();
    let s = (a + b + c) / 2.0;
    (s * (s - a) * (s - b) * (s - c)).max(0.0).sqrt()
}

// =============================================================================
// Tests
// =============================================================================
