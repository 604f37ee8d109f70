use serde::{Deserialize, Serialize};

use super::{geodetic, projection};
use crate::geometry::{ApproxEq, Vector3};

/// Points closer than this (km) are considered the same location.
pub const EQUALITY_DISTANCE: f64 = 1e-3;

/// A geographic location with depth.
///
/// Equality through `==` is exact; use [`ApproxEq`] for the 1 m tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub depth: f64,
}

impl Point {
    pub fn new(longitude: f64, latitude: f64, depth: f64) -> Self {
        Self {
            longitude,
            latitude,
            depth,
        }
    }

    /// A point on the earth surface.
    pub fn surface(longitude: f64, latitude: f64) -> Self {
        Self::new(longitude, latitude, 0.0)
    }

    /// Distance in km, depth included.
    pub fn distance(&self, other: &Point) -> f64 {
        geodetic::distance(
            self.longitude,
            self.latitude,
            self.depth,
            other.longitude,
            other.latitude,
            other.depth,
        )
    }

    /// Great-circle distance in km, depth ignored.
    pub fn horizontal_distance(&self, other: &Point) -> f64 {
        geodetic::geodetic_distance(self.longitude, self.latitude, other.longitude, other.latitude)
    }

    /// Bearing towards `other` in degrees clockwise from north.
    pub fn azimuth(&self, other: &Point) -> f64 {
        geodetic::azimuth(self.longitude, self.latitude, other.longitude, other.latitude)
    }

    /// The point `horizontal_distance` km away along `azimuth` and
    /// `vertical_increment` km deeper.
    pub fn point_at(&self, horizontal_distance: f64, vertical_increment: f64, azimuth: f64) -> Point {
        let (lon, lat) =
            geodetic::point_at(self.longitude, self.latitude, azimuth, horizontal_distance);
        Point::new(lon, lat, self.depth + vertical_increment)
    }

    /// Points from this one towards `other`, roughly `distance` km apart.
    ///
    /// The first point is `self`. The last one reaches `other` only when the
    /// separation is close to a multiple of `distance`.
    pub fn equally_spaced_points(&self, other: &Point, distance: f64) -> Vec<Point> {
        geodetic::intervals_between(
            self.longitude,
            self.latitude,
            self.depth,
            other.longitude,
            other.latitude,
            other.depth,
            distance,
        )
        .into_iter()
        .map(|[lon, lat, depth]| Point::new(lon, lat, depth))
        .collect()
    }

    pub fn to_cartesian(&self) -> Vector3 {
        projection::spherical_to_cartesian(self.longitude, self.latitude, self.depth)
    }

    pub fn from_cartesian(v: &Vector3) -> Point {
        let (lon, lat, depth) = projection::cartesian_to_spherical(v);
        Point::new(lon, lat, depth)
    }
}

impl ApproxEq for Point {
    fn approx_eq(&self, other: &Self) -> bool {
        self.distance(other) < EQUALITY_DISTANCE
    }
}

impl From<[f64; 3]> for Point {
    fn from([lon, lat, depth]: [f64; 3]) -> Self {
        Point::new(lon, lat, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_at_descends() {
        let p = Point::new(0.0, 0.0, 5.0).point_at(10.0, 3.0, 90.0);
        assert!((p.depth - 8.0).abs() < 1e-12);
        assert!((Point::surface(0.0, 0.0).horizontal_distance(&p) - 10.0).abs() < 1e-6);
        assert!(p.latitude.abs() < 1e-9);
    }

    #[test]
    fn test_equally_spaced_points() {
        let p1 = Point::new(0.0, 0.0, 0.0);
        let p2 = p1.point_at(0.0, 20.0, 0.0);
        let points = p1.equally_spaced_points(&p2, 5.0);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], p1);
        assert!((points[2].depth - 10.0).abs() < 1e-9);
        assert!(points[4].approx_eq(&p2));
    }

    #[test]
    fn test_approx_eq_tolerance() {
        let p = Point::new(30.0, 40.0, 10.0);
        assert!(p.approx_eq(&Point::new(30.0, 40.0, 10.0005)));
        assert!(!p.approx_eq(&Point::new(30.0, 40.0, 10.01)));
    }

    #[test]
    fn test_deserialize_without_depth() {
        let p: Point = serde_json::from_str(r#"{"longitude": 1.5, "latitude": -2.0}"#).unwrap();
        assert_eq!(p, Point::surface(1.5, -2.0));
    }
}
