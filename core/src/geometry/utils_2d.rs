//! 2D geometry on the projection plane.
//!
//! Coordinates are `[x, y]` pairs in kilometres as returned by
//! [`crate::geo::projection::OrthographicProjection::project`]. These are the
//! building blocks for Joyner-Boore footprints and fault-trace validity checks.

use super::EPSILON;

// =============================================================================
// Point Operations
// =============================================================================

/// Squared distance between two 2D points.
#[inline]
pub fn distance_squared(p1: [f64; 2], p2: [f64; 2]) -> f64 {
    let dx = p2[0] - p1[0];
    let dy = p2[1] - p1[1];
    dx * dx + dy * dy
}

/// Distance between two 2D points.
#[inline]
pub fn distance(p1: [f64; 2], p2: [f64; 2]) -> f64 {
    distance_squared(p1, p2).sqrt()
}

// =============================================================================
// Vector Operations
// =============================================================================

/// 2D cross product (z-component of 3D cross product).
/// Positive if v2 is counter-clockwise from v1.
#[inline]
pub fn cross_2d(v1: [f64; 2], v2: [f64; 2]) -> f64 {
    v1[0] * v2[1] - v1[1] * v2[0]
}

#[inline]
pub fn dot_2d(v1: [f64; 2], v2: [f64; 2]) -> f64 {
    v1[0] * v2[0] + v1[1] * v2[1]
}

#[inline]
fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

// =============================================================================
// Segments
// =============================================================================

/// Closest point on segment `start..end` to `point`.
pub fn closest_point_on_segment(start: [f64; 2], end: [f64; 2], point: [f64; 2]) -> [f64; 2] {
    let d = sub(end, start);
    let len_sq = dot_2d(d, d);
    if len_sq < EPSILON * EPSILON {
        return start;
    }
    let t = (dot_2d(sub(point, start), d) / len_sq).clamp(0.0, 1.0);
    [start[0] + t * d[0], start[1] + t * d[1]]
}

/// Distance from `point` to segment `start..end`.
#[inline]
pub fn distance_to_segment(start: [f64; 2], end: [f64; 2], point: [f64; 2]) -> f64 {
    distance(point, closest_point_on_segment(start, end, point))
}

/// Orientation of the triplet: 1 counter-clockwise, -1 clockwise, 0 collinear.
fn orientation(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> i8 {
    let v = cross_2d(sub(b, a), sub(c, a));
    if v.abs() < EPSILON {
        0
    } else if v > 0.0 {
        1
    } else {
        -1
    }
}

fn on_segment(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> bool {
    p[0] <= a[0].max(b[0]) + EPSILON
        && p[0] >= a[0].min(b[0]) - EPSILON
        && p[1] <= a[1].max(b[1]) + EPSILON
        && p[1] >= a[1].min(b[1]) - EPSILON
}

/// Whether closed segments `p1..p2` and `q1..q2` share at least one point.
pub fn segments_intersect(p1: [f64; 2], p2: [f64; 2], q1: [f64; 2], q2: [f64; 2]) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(p1, p2, q1))
        || (o2 == 0 && on_segment(p1, p2, q2))
        || (o3 == 0 && on_segment(q1, q2, p1))
        || (o4 == 0 && on_segment(q1, q2, p2))
}

/// Whether an open polyline crosses or touches itself anywhere other than at
/// the shared vertex of two consecutive segments.
pub fn polyline_is_simple(points: &[[f64; 2]]) -> bool {
    let n = points.len();
    if n < 4 {
        return true;
    }
    for i in 0..n - 1 {
        for j in (i + 2)..n - 1 {
            if segments_intersect(points[i], points[i + 1], points[j], points[j + 1]) {
                return false;
            }
        }
    }
    true
}

/// Shortest distance from `point` to any segment of an open polyline.
/// A single-vertex polyline degrades to point distance.
pub fn distance_to_polyline(points: &[[f64; 2]], point: [f64; 2]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => distance(*only, point),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment(w[0], w[1], point))
            .fold(f64::INFINITY, f64::min),
    }
}

// =============================================================================
// Polygons
// =============================================================================

/// Signed area of a polygon using the Shoelace formula.
/// Positive = CCW winding, Negative = CW winding.
pub fn polygon_signed_area(vertices: &[[f64; 2]]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += vertices[i][0] * vertices[j][1];
        area -= vertices[j][0] * vertices[i][1];
    }
    area / 2.0
}

/// Winding-number containment test. Works for concave polygons.
pub fn point_in_polygon(point: [f64; 2], polygon: &[[f64; 2]]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut winding = 0i32;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if a[1] <= point[1] {
            if b[1] > point[1] && cross_2d(sub(b, a), sub(point, a)) > 0.0 {
                winding += 1;
            }
        } else if b[1] <= point[1] && cross_2d(sub(b, a), sub(point, a)) < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}

/// Distance from `point` to a closed polygon: zero inside or on the
/// boundary, distance to the nearest edge otherwise.
pub fn distance_to_polygon(polygon: &[[f64; 2]], point: [f64; 2]) -> f64 {
    if point_in_polygon(point, polygon) {
        return 0.0;
    }
    let n = polygon.len();
    (0..n)
        .map(|i| distance_to_segment(polygon[i], polygon[(i + 1) % n], point))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_point_on_segment_clamps() {
        let p = closest_point_on_segment([0.0, 0.0], [10.0, 0.0], [-5.0, 3.0]);
        assert!(distance(p, [0.0, 0.0]) < EPSILON);
        let p = closest_point_on_segment([0.0, 0.0], [10.0, 0.0], [4.0, 3.0]);
        assert!(distance(p, [4.0, 0.0]) < EPSILON);
    }

    #[test]
    fn test_segments_intersect() {
        assert!(segments_intersect([0.0, 0.0], [2.0, 2.0], [0.0, 2.0], [2.0, 0.0]));
        assert!(!segments_intersect([0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]));
        // touching at an endpoint
        assert!(segments_intersect([0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 1.0]));
    }

    #[test]
    fn test_polyline_is_simple() {
        let zigzag = [[0.0, 0.0], [1.0, 1.0], [2.0, 0.0], [3.0, 1.0]];
        assert!(polyline_is_simple(&zigzag));
        let bowtie = [[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 2.0]];
        assert!(!polyline_is_simple(&bowtie));
    }

    #[test]
    fn test_distance_to_polygon() {
        let square = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]];
        assert!(distance_to_polygon(&square, [2.0, 2.0]).abs() < EPSILON);
        assert!((distance_to_polygon(&square, [7.0, 2.0]) - 3.0).abs() < EPSILON);
        assert!((distance_to_polygon(&square, [7.0, 8.0]) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_signed_area() {
        let ccw = [[0.0, 0.0], [2.0, 0.0], [2.0, 3.0], [0.0, 3.0]];
        assert!((polygon_signed_area(&ccw) - 6.0).abs() < EPSILON);
        let cw: Vec<[f64; 2]> = ccw.iter().rev().copied().collect();
        assert!((polygon_signed_area(&cw) + 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_distance_to_polyline_single_vertex() {
        assert!((distance_to_polyline(&[[1.0, 1.0]], [4.0, 5.0]) - 5.0).abs() < EPSILON);
    }
}
