//! Distance metrics shared by every surface backed by a rectangular mesh.

use ndarray::ArrayD;
use tracing::trace;

use super::Surface;
use crate::config::GeoConfig;
use crate::geo::mesh::{downsample_trace, map_sites, Mesh, RectangularMesh};
use crate::geo::projection::{get_spherical_bounding_box, BoundingBox};
use crate::geo::{geodetic, GeoError, GeoResult, Point};
use crate::geometry::sign;

/// A rupture surface discretised as a rectangular mesh, rows along strike
/// and columns down dip.
///
/// Mean strike, dip, width and area are computed once on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultMesh {
    mesh: RectangularMesh,
    strike: f64,
    dip: f64,
    width: f64,
    area: f64,
}

impl FaultMesh {
    /// Wrap a mesh of at least two rows and two columns.
    pub fn new(mesh: RectangularMesh) -> GeoResult<Self> {
        let (rows, cols) = mesh.shape();
        if rows < 2 || cols < 2 {
            return Err(GeoError::InvalidMesh(format!(
                "fault surface needs at least 2x2 nodes, got {rows}x{cols}"
            )));
        }
        let (dip, strike) = mesh.get_mean_inclination_and_azimuth()?;
        let width = mesh.get_mean_width()?;
        let area = mesh.get_cell_dimensions()?.areas.sum();
        Ok(Self {
            mesh,
            strike,
            dip,
            width,
            area,
        })
    }

    pub fn mesh(&self) -> &RectangularMesh {
        &self.mesh
    }

    /// Joyner-Boore distance with explicit tolerances.
    pub fn get_joyner_boore_distance_with(
        &self,
        sites: &Mesh,
        config: &GeoConfig,
    ) -> GeoResult<ArrayD<f64>> {
        self.mesh.get_joyner_boore_distance_with(sites, config)
    }

    /// Signed distance to a top edge of a single segment: the whole great
    /// circle counts.
    fn rx_single_segment(top: &[Point], lon: f64, lat: f64) -> f64 {
        let (p1, p2) = (top[0], top[1]);
        geodetic::distance_to_arc(p1.longitude, p1.latitude, p1.azimuth(&p2), lon, lat)
    }

    /// Signed distance to the top edge, the end segments extended to
    /// infinity. The candidate closest in absolute value wins.
    fn rx_multi_segment(top: &[Point], lon: f64, lat: f64) -> f64 {
        let last = top.len() - 2;
        let mut best = f64::INFINITY;
        for i in 0..=last {
            let (mut p1, mut p2) = (top[i], top[i + 1]);
            if i == 0 {
                // the first segment is walked backwards from its end
                std::mem::swap(&mut p1, &mut p2);
            }
            let mut dist = if i == 0 || i == last {
                geodetic::distance_to_semi_arc(p1.longitude, p1.latitude, p1.azimuth(&p2), lon, lat)
            } else {
                geodetic::min_distance_to_segment(
                    (p1.longitude, p1.latitude),
                    (p2.longitude, p2.latitude),
                    lon,
                    lat,
                )
            };
            if i == 0 {
                dist = -dist;
            }
            if dist.abs() < best.abs() {
                best = dist;
            }
        }
        best
    }
}

impl Surface for FaultMesh {
    fn get_min_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        Ok(self.mesh.get_min_distance(sites))
    }

    fn get_closest_points(&self, sites: &Mesh) -> GeoResult<Mesh> {
        self.mesh.get_closest_points(sites)
    }

    fn get_joyner_boore_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        self.mesh.get_joyner_boore_distance(sites)
    }

    fn get_rx_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        let top = self.mesh.row(0);
        trace!(segments = top.len() - 1, sites = sites.len(), "rx distance");
        if top.len() < 3 {
            Ok(map_sites(sites, |lon, lat, _| Self::rx_single_segment(&top, lon, lat)))
        } else {
            Ok(map_sites(sites, |lon, lat, _| Self::rx_multi_segment(&top, lon, lat)))
        }
    }

    fn get_ry0_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        let top = self.mesh.row(0);
        let (first, last) = (top[0], top[top.len() - 1]);
        let azimuth = (self.strike + 90.0) % 360.0;
        Ok(map_sites(sites, |lon, lat, _| {
            let d1 = geodetic::distance_to_arc(first.longitude, first.latitude, azimuth, lon, lat);
            let d2 = geodetic::distance_to_arc(last.longitude, last.latitude, azimuth, lon, lat);
            if sign(d1) == sign(d2) {
                d1.abs().min(d2.abs())
            } else {
                0.0
            }
        }))
    }

    fn get_top_edge_depth(&self) -> f64 {
        self.mesh
            .row(0)
            .iter()
            .map(|p| p.depth)
            .fold(f64::INFINITY, f64::min)
    }

    fn get_strike(&self) -> f64 {
        self.strike
    }

    fn get_dip(&self) -> f64 {
        self.dip
    }

    fn get_width(&self) -> f64 {
        self.width
    }

    fn get_area(&self) -> f64 {
        self.area
    }

    fn get_bounding_box(&self) -> GeoResult<BoundingBox> {
        let lons: Vec<f64> = self.mesh.lons().iter().copied().collect();
        let lats: Vec<f64> = self.mesh.lats().iter().copied().collect();
        get_spherical_bounding_box(&lons, &lats)
    }

    fn get_middle_point(&self) -> GeoResult<Point> {
        Ok(self.mesh.get_middle_point())
    }

    fn get_top_edge(&self, tolerance: f64) -> GeoResult<Vec<Point>> {
        Ok(downsample_trace(&self.mesh, tolerance))
    }
}

/// Implement [`Surface`] for a type by forwarding to its `FaultMesh` field.
macro_rules! delegate_surface {
    ($ty:ty, $field:ident) => {
        impl $crate::geo::surface::Surface for $ty {
            fn get_min_distance(
                &self,
                sites: &$crate::geo::Mesh,
            ) -> $crate::geo::GeoResult<ndarray::ArrayD<f64>> {
                self.$field.get_min_distance(sites)
            }

            fn get_closest_points(
                &self,
                sites: &$crate::geo::Mesh,
            ) -> $crate::geo::GeoResult<$crate::geo::Mesh> {
                self.$field.get_closest_points(sites)
            }

            fn get_joyner_boore_distance(
                &self,
                sites: &$crate::geo::Mesh,
            ) -> $crate::geo::GeoResult<ndarray::ArrayD<f64>> {
                self.$field.get_joyner_boore_distance(sites)
            }

            fn get_rx_distance(
                &self,
                sites: &$crate::geo::Mesh,
            ) -> $crate::geo::GeoResult<ndarray::ArrayD<f64>> {
                self.$field.get_rx_distance(sites)
            }

            fn get_ry0_distance(
                &self,
                sites: &$crate::geo::Mesh,
            ) -> $crate::geo::GeoResult<ndarray::ArrayD<f64>> {
                self.$field.get_ry0_distance(sites)
            }

            fn get_top_edge_depth(&self) -> f64 {
                self.$field.get_top_edge_depth()
            }

            fn get_strike(&self) -> f64 {
                self.$field.get_strike()
            }

            fn get_dip(&self) -> f64 {
                self.$field.get_dip()
            }

            fn get_width(&self) -> f64 {
                self.$field.get_width()
            }

            fn get_area(&self) -> f64 {
                self.$field.get_area()
            }

            fn get_bounding_box(&self) -> $crate::geo::GeoResult<$crate::geo::BoundingBox> {
                self.$field.get_bounding_box()
            }

            fn get_middle_point(&self) -> $crate::geo::GeoResult<$crate::geo::Point> {
                self.$field.get_middle_point()
            }

            fn get_top_edge(
                &self,
                tolerance: f64,
            ) -> $crate::geo::GeoResult<Vec<$crate::geo::Point>> {
                self.$field.get_top_edge(tolerance)
            }
        }
    };
}

pub(crate) use delegate_surface;

#[cfg(test)]
mod tests {
    use super::*;

    /// Vertical fault along the equator: top row at depth 0, spacing 0.1 deg.
    fn vertical(cols: usize) -> FaultMesh {
        let rows: Vec<Vec<Point>> = (0..3)
            .map(|r| (0..cols).map(|c| Point::new(c as f64 * 0.1, 0.0, r as f64)).collect())
            .collect();
        FaultMesh::new(RectangularMesh::from_points_list(&rows).unwrap()).unwrap()
    }

    fn sites(coords: &[(f64, f64)]) -> Mesh {
        Mesh::from_vectors(
            coords.iter().map(|c| c.0).collect(),
            coords.iter().map(|c| c.1).collect(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_mean_geometry() {
        let surface = vertical(4);
        assert!((surface.get_strike() - 90.0).abs() < 1e-6);
        assert!((surface.get_dip() - 90.0).abs() < 1e-6);
        assert!((surface.get_width() - 2.0).abs() < 1e-3);
        assert!((surface.get_area() - 2.0 * 0.3 * 111.1949).abs() < 0.1);
        assert_eq!(surface.get_top_edge_depth(), 0.0);
    }

    #[test]
    fn test_rejects_single_row() {
        let row = vec![vec![Point::surface(0.0, 0.0), Point::surface(0.1, 0.0)]];
        let mesh = RectangularMesh::from_points_list(&row).unwrap();
        assert!(matches!(FaultMesh::new(mesh), Err(GeoError::InvalidMesh(_))));
    }

    #[test]
    fn test_rx_sign_follows_strike() {
        // strike east: south is to the right
        for cols in [2, 5] {
            let rx = vertical(cols).get_rx_distance(&sites(&[(0.15, -0.1), (0.15, 0.1)])).unwrap();
            assert!((rx[[0]] - 11.1195).abs() < 1e-3, "{cols} columns: {}", rx[[0]]);
            assert!((rx[[1]] + 11.1195).abs() < 1e-3, "{cols} columns: {}", rx[[1]]);
        }
    }

    #[test]
    fn test_ry0_distance() {
        let surface = vertical(4);
        let ry0 = surface
            .get_ry0_distance(&sites(&[(0.15, 0.2), (-0.1, 0.0), (0.5, 0.1)]))
            .unwrap();
        assert_eq!(ry0[[0]], 0.0);
        assert!((ry0[[1]] - 11.1195).abs() < 1e-3);
        assert!((ry0[[2]] - 22.239).abs() < 1e-2);
    }

    #[test]
    fn test_joyner_boore_above_and_beside() {
        let surface = vertical(4);
        let rjb = surface
            .get_joyner_boore_distance(&sites(&[(0.15, 0.0), (0.15, 0.1)]))
            .unwrap();
        assert!(rjb[[0]] < 1e-6);
        assert!((rjb[[1]] - 11.1195).abs() < 0.01);
    }

    #[test]
    fn test_top_edge_downsampled() {
        let edge = vertical(5).get_top_edge(0.1).unwrap();
        assert_eq!(edge.len(), 2);
        assert_eq!(edge[1], Point::surface(0.4, 0.0));
    }
}
