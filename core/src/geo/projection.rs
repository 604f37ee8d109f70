//! Spherical bounding boxes, orthographic projection and conversions between
//! geographic and Cartesian coordinates.

use serde::{Deserialize, Serialize};

use super::{geodetic, GeoError, GeoResult, Point, EARTH_RADIUS};
use crate::geometry::{utils_2d, Vector3};

/// Longitude/latitude extent of a point collection.
///
/// When the collection straddles the international date line `west` is
/// numerically greater than `east`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub east: f64,
    pub north: f64,
    pub south: f64,
}

impl BoundingBox {
    /// Great-circle middle point of the north-west and south-east corners.
    pub fn middle_point(&self) -> (f64, f64) {
        get_middle_point(self.west, self.north, self.east, self.south)
    }
}

/// Angle from `lon1` to `lon2`, positive eastwards, within `[-180, 180)`.
#[inline]
pub fn get_longitudinal_extent(lon1: f64, lon2: f64) -> f64 {
    (lon2 - lon1 + 180.0).rem_euclid(360.0) - 180.0
}

/// Whether a line between two longitudes crosses the date line.
#[inline]
pub fn cross_idl(lon1: f64, lon2: f64) -> bool {
    lon1 * lon2 < 0.0 && (lon1 - lon2).abs() > 180.0
}

/// Bounding box of a point collection that handles the date line.
///
/// Fails with [`GeoError::ExtentTooWide`] when no hemisphere-sized box can
/// contain every longitude.
pub fn get_spherical_bounding_box(lons: &[f64], lats: &[f64]) -> GeoResult<BoundingBox> {
    if lons.is_empty() || lats.is_empty() {
        return Err(GeoError::InvalidMesh(
            "bounding box of an empty collection".into(),
        ));
    }
    let north = lats.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let south = lats.iter().copied().fold(f64::INFINITY, f64::min);
    let mut west = lons.iter().copied().fold(f64::INFINITY, f64::min);
    let mut east = lons.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if get_longitudinal_extent(west, east) < 0.0 {
        // points lie on both sides of the date line: the actual west is the
        // lowest positive longitude and the actual east the highest negative
        west = lons
            .iter()
            .copied()
            .filter(|&lon| lon > 0.0)
            .fold(f64::INFINITY, f64::min);
        east = lons
            .iter()
            .copied()
            .filter(|&lon| lon < 0.0)
            .fold(f64::NEG_INFINITY, f64::max);
        let contained = lons.iter().all(|&lon| {
            get_longitudinal_extent(west, lon) >= 0.0 && get_longitudinal_extent(lon, east) >= 0.0
        });
        if !contained {
            return Err(GeoError::ExtentTooWide);
        }
    }
    Ok(BoundingBox {
        west,
        east,
        north,
        south,
    })
}

/// Point halfway along the great-circle arc between two points.
pub fn get_middle_point(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> (f64, f64) {
    if lon1 == lon2 && lat1 == lat2 {
        return (lon1, lat1);
    }
    let dist = geodetic::geodetic_distance(lon1, lat1, lon2, lat2);
    let azimuth = geodetic::azimuth(lon1, lat1, lon2, lat2);
    geodetic::point_at(lon1, lat1, azimuth, dist / 2.0)
}

/// Position vector of a point in the earth-centred Cartesian frame (km).
pub fn spherical_to_cartesian(lon: f64, lat: f64, depth: f64) -> Vector3 {
    let phi = lon.to_radians();
    let theta = lat.to_radians();
    let rr = EARTH_RADIUS - depth;
    let cos_theta_r = rr * theta.cos();
    Vector3::new(cos_theta_r * phi.cos(), cos_theta_r * phi.sin(), rr * theta.sin())
}

/// Inverse of [`spherical_to_cartesian`]: `(lon, lat, depth)`.
pub fn cartesian_to_spherical(v: &Vector3) -> (f64, f64, f64) {
    let rr = v.norm();
    let lat = (v.z / rr).clamp(-1.0, 1.0).asin().to_degrees();
    let lon = v.y.atan2(v.x).to_degrees();
    (lon, lat, EARTH_RADIUS - rr)
}

/// Orthographic projection centred on the middle of a bounding box.
///
/// Points further than 45 degrees of arc from the centre are rejected, which
/// keeps distortion of distances in the projected plane small.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicProjection {
    pub bbox: BoundingBox,
    lambda0: f64,
    phi0: f64,
    cos_phi0: f64,
    sin_phi0: f64,
}

impl OrthographicProjection {
    pub fn new(bbox: BoundingBox) -> Self {
        let (lon0, lat0) = bbox.middle_point();
        let phi0 = lat0.to_radians();
        Self {
            bbox,
            lambda0: lon0.to_radians(),
            phi0,
            cos_phi0: phi0.cos(),
            sin_phi0: phi0.sin(),
        }
    }

    /// Projection centred on the bounding box of the given points.
    pub fn from_lons_lats(lons: &[f64], lats: &[f64]) -> GeoResult<Self> {
        Ok(Self::new(get_spherical_bounding_box(lons, lats)?))
    }

    /// Project a geographic point to `[x, y]` in km.
    pub fn project(&self, lon: f64, lat: f64) -> GeoResult<[f64; 2]> {
        let phi = lat.to_radians();
        let cos_phi = phi.cos();
        let lambda = lon.to_radians() - self.lambda0;
        let sin_dist = (((self.phi0 - phi) / 2.0).sin().powi(2)
            + self.cos_phi0 * cos_phi * (lambda / 2.0).sin().powi(2))
        .sqrt();
        if sin_dist > std::f64::consts::FRAC_1_SQRT_2 {
            return Err(GeoError::ProjectionTooFar {
                lon: self.lambda0.to_degrees(),
                lat: self.phi0.to_degrees(),
            });
        }
        let x = cos_phi * lambda.sin();
        let y = self.cos_phi0 * phi.sin() - self.sin_phi0 * cos_phi * lambda.cos();
        Ok([x * EARTH_RADIUS, y * EARTH_RADIUS])
    }

    /// Project many points at once, failing on the first out-of-range one.
    pub fn project_all(&self, lons: &[f64], lats: &[f64]) -> GeoResult<Vec<[f64; 2]>> {
        lons.iter()
            .zip(lats)
            .map(|(&lon, &lat)| self.project(lon, lat))
            .collect()
    }

    /// Map projected `[x, y]` back to `(lon, lat)`.
    pub fn project_back(&self, x: f64, y: f64) -> (f64, f64) {
        let xx = x / EARTH_RADIUS;
        let yy = y / EARTH_RADIUS;
        let cos_c = (1.0 - (xx * xx + yy * yy)).max(0.0).sqrt();
        let phi = (cos_c * self.sin_phi0 + yy * self.cos_phi0).clamp(-1.0, 1.0).asin();
        let lambda = xx.atan2(self.cos_phi0 * cos_c - yy * self.sin_phi0);
        let mut lon = (self.lambda0 + lambda).to_degrees();
        if lon >= 180.0 {
            lon -= 360.0;
        } else if lon <= -180.0 {
            lon += 360.0;
        }
        (lon, phi.to_degrees())
    }
}

/// Copy of `points` without consecutive duplicates.
pub fn clean_points(points: &[Point]) -> Vec<Point> {
    let mut cleaned: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if cleaned.last() != Some(point) {
            cleaned.push(*point);
        }
    }
    cleaned
}

/// Whether the polyline through the given points crosses itself in the
/// projected plane. A closed shape (last point equal to the first) is only
/// reported when `closed_shape` is false.
pub fn line_intersects_itself(lons: &[f64], lats: &[f64], closed_shape: bool) -> GeoResult<bool> {
    if lons.len() <= 3 {
        return Ok(false);
    }
    let proj = OrthographicProjection::from_lons_lats(lons, lats)?;
    let points = proj.project_all(lons, lats)?;
    let n = points.len();
    let closed = utils_2d::distance(points[0], points[n - 1]) < crate::geometry::EPSILON;
    if closed && closed_shape {
        return Ok(!utils_2d::polyline_is_simple(&points[..n - 1]));
    }
    Ok(!utils_2d::polyline_is_simple(&points))
}
