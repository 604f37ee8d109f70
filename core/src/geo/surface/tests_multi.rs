use ndarray::{arr2, ArrayD};

use crate::config::GeoConfig;
use crate::geo::surface::{MultiSurface, PlanarSurface, Surface};
use crate::geo::{BoundingBox, GeoError, GeoResult, Mesh, Point};

/// A surface answering every site query with fixed values.
#[derive(Debug, Clone)]
struct FakeSurface {
    distances: ArrayD<f64>,
    rx: f64,
    top_edge_depth: f64,
    strike: f64,
    dip: f64,
    width: f64,
    area: f64,
    bbox: BoundingBox,
    middle: Point,
}

impl FakeSurface {
    fn new(distances: [[f64; 3]; 2], area: f64) -> Self {
        Self {
            distances: arr2(&distances).into_dyn(),
            rx: 0.0,
            top_edge_depth: 0.0,
            strike: 0.0,
            dip: 90.0,
            width: 1.0,
            area,
            bbox: BoundingBox {
                west: 0.0,
                east: 1.0,
                north: 1.0,
                south: 0.0,
            },
            middle: Point::surface(0.5, 0.5),
        }
    }
}

impl Surface for FakeSurface {
    fn get_min_distance(&self, _sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        Ok(self.distances.clone())
    }

    fn get_closest_points(&self, _sites: &Mesh) -> GeoResult<Mesh> {
        Mesh::new(
            self.distances.clone(),
            self.distances.clone(),
            Some(self.distances.clone()),
        )
    }

    fn get_joyner_boore_distance(&self, _sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        Ok(self.distances.clone())
    }

    fn get_rx_distance(&self, _sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        Ok(self.distances.mapv(|_| self.rx))
    }

    fn get_ry0_distance(&self, _sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        Ok(self.distances.mapv(|_| self.rx + 100.0))
    }

    fn get_top_edge_depth(&self) -> f64 {
        self.top_edge_depth
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
        Ok(self.bbox)
    }

    fn get_middle_point(&self) -> GeoResult<Point> {
        Ok(self.middle)
    }

    fn get_top_edge(&self, _tolerance: f64) -> GeoResult<Vec<Point>> {
        Err(GeoError::Unsupported("fake surface".into()))
    }
}

fn fakes() -> Vec<FakeSurface> {
    let mut surfaces = vec![
        FakeSurface::new([[-1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 10.0),
        FakeSurface::new([[-0.5, 3.0, 2.0], [5.0, 4.0, 5.0]], 20.0),
        FakeSurface::new([[5.0, 4.0, 4.0], [6.0, 6.0, 7.0]], 60.0),
    ];
    for (i, (s, (depth, strike, dip, width))) in surfaces
        .iter_mut()
        .zip([(2.0, 45.0, 30.0, 12.0), (6.0, 70.0, 45.0, 10.0), (10.0, 100.0, 60.0, 14.0)])
        .enumerate()
    {
        s.rx = i as f64;
        s.top_edge_depth = depth;
        s.strike = strike;
        s.dip = dip;
        s.width = width;
    }
    surfaces
}

fn multi(surfaces: Vec<FakeSurface>) -> MultiSurface {
    MultiSurface::new(
        surfaces
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn Surface>)
            .collect(),
    )
    .unwrap()
}

fn grid_sites() -> Mesh {
    Mesh::new(
        arr2(&[[0.0, 0.1, 0.2], [0.0, 0.1, 0.2]]).into_dyn(),
        arr2(&[[0.0, 0.0, 0.0], [0.1, 0.1, 0.1]]).into_dyn(),
        None,
    )
    .unwrap()
}

fn sites(coords: &[(f64, f64)]) -> Mesh {
    Mesh::from_vectors(
        coords.iter().map(|c| c.0).collect(),
        coords.iter().map(|c| c.1).collect(),
        None,
    )
    .unwrap()
}

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {expected}, got {actual}"
    );
}

// =============================================================================
// Aggregation over elements
// =============================================================================

#[test]
fn test_empty_multi_surface_rejected() {
    assert!(MultiSurface::new(Vec::new()).is_err());
}

#[test]
fn test_invalid_config_rejected() {
    let config = GeoConfig {
        jb_threshold: -1.0,
        ..GeoConfig::default()
    };
    let surfaces: Vec<Box<dyn Surface>> = vec![Box::new(fakes().remove(0))];
    assert!(matches!(
        MultiSurface::with_config(surfaces, config),
        Err(GeoError::Config(_))
    ));
}

#[test]
fn test_min_distance_is_elementwise_minimum() {
    let surface = multi(fakes());
    let expected = arr2(&[[-1.0, 2.0, 2.0], [4.0, 4.0, 5.0]]).into_dyn();
    assert_eq!(surface.get_min_distance(&grid_sites()).unwrap(), expected);
    assert_eq!(surface.get_joyner_boore_distance(&grid_sites()).unwrap(), expected);
}

#[test]
fn test_closest_points_come_from_closest_element() {
    let surface = multi(fakes());
    let closest = surface.get_closest_points(&grid_sites()).unwrap();
    let expected = arr2(&[[-1.0, 2.0, 2.0], [4.0, 4.0, 5.0]]).into_dyn();
    assert_eq!(closest.shape(), &[2, 3]);
    assert_eq!(closest.lons(), &expected);
    assert_eq!(closest.lats(), &expected);
}

#[test]
fn test_rx_uses_closest_element() {
    let surface = multi(fakes());
    let rx = surface.get_rx_distance(&grid_sites()).unwrap();
    assert_eq!(rx, arr2(&[[0.0, 0.0, 1.0], [0.0, 1.0, 1.0]]).into_dyn());
}

#[test]
fn test_ties_go_to_first_element() {
    let mut surfaces = fakes();
    surfaces[1].distances = surfaces[0].distances.clone();
    let rx = multi(surfaces[..2].to_vec()).get_rx_distance(&grid_sites()).unwrap();
    assert!(rx.iter().all(|&v| v == 0.0));
}

#[test]
fn test_area_weighted_properties() {
    let surface = multi(fakes());
    assert_close(surface.get_area(), 90.0, 1e-12);
    assert_close(surface.get_top_edge_depth(), 8.2222222, 1e-7);
    assert_close(surface.get_strike(), 87.64579754, 1e-7);
    assert_close(surface.get_dip(), 53.3333333, 1e-7);
    assert_close(surface.get_width(), 12.8888889, 1e-7);
}

#[test]
fn test_strike_mean_is_circular() {
    let mut surfaces = fakes();
    surfaces[0].strike = 350.0;
    surfaces[1].strike = 10.0;
    surfaces[1].area = 10.0;
    let strike = multi(surfaces[..2].to_vec()).get_strike();
    assert!(strike < 1e-9 || (strike - 360.0).abs() < 1e-9, "{strike}");

    let mut shifted = fakes();
    shifted.iter_mut().for_each(|s| s.strike += 360.0);
    assert_close(multi(shifted).get_strike(), multi(fakes()).get_strike(), 1e-9);
}

#[test]
fn test_bounding_box_of_elements() {
    let mut surfaces = fakes();
    surfaces[1].bbox = BoundingBox {
        west: -2.0,
        east: 0.5,
        north: 0.5,
        south: -1.0,
    };
    surfaces[2].bbox = BoundingBox {
        west: 0.5,
        east: 3.0,
        north: 4.0,
        south: 0.5,
    };
    let bbox = multi(surfaces).get_bounding_box().unwrap();
    assert_eq!(
        bbox,
        BoundingBox {
            west: -2.0,
            east: 3.0,
            north: 4.0,
            south: -1.0
        }
    );
}

#[test]
fn test_single_element_delegates() {
    let mut surfaces = fakes();
    surfaces[0].middle = Point::new(3.0, 4.0, 5.0);
    let surface = multi(surfaces[..1].to_vec());
    assert_eq!(surface.get_middle_point().unwrap(), Point::new(3.0, 4.0, 5.0));
    let ry0 = surface.get_ry0_distance(&grid_sites()).unwrap();
    assert!(ry0.iter().all(|&v| v == 100.0));
}

#[test]
fn test_gc2_needs_top_edges() {
    let surface = multi(fakes());
    assert!(matches!(
        surface.get_ry0_distance(&grid_sites()),
        Err(GeoError::Unsupported(_))
    ));
    // cached
    assert!(matches!(surface.gc2_frame(), Err(GeoError::Unsupported(_))));
}

// =============================================================================
// Planar elements
// =============================================================================

/// Vertical surface along the equator between two longitudes, 10 km deep.
fn equatorial(start: f64, end: f64) -> PlanarSurface {
    let strike = if end > start { 90.0 } else { 270.0 };
    PlanarSurface::new(
        strike,
        90.0,
        Point::new(start, 0.0, 0.0),
        Point::new(end, 0.0, 0.0),
        Point::new(end, 0.0, 10.0),
        Point::new(start, 0.0, 10.0),
    )
    .unwrap()
}

#[test]
fn test_single_planar_element_matches_planar() {
    let planar = equatorial(0.0, 0.1);
    let surface = MultiSurface::new(vec![Box::new(planar.clone())]).unwrap();
    let sites = sites(&[(0.05, 0.05), (-0.1, -0.02), (0.3, 0.1)]);
    assert_eq!(surface.get_min_distance(&sites), planar.get_min_distance(&sites));
    assert_eq!(
        surface.get_joyner_boore_distance(&sites),
        planar.get_joyner_boore_distance(&sites)
    );
    assert_eq!(surface.get_rx_distance(&sites), planar.get_rx_distance(&sites));
    assert_eq!(surface.get_ry0_distance(&sites), planar.get_ry0_distance(&sites));
    assert_eq!(surface.get_closest_points(&sites), planar.get_closest_points(&sites));
    assert_eq!(surface.get_middle_point(), planar.get_middle_point());
}

#[test]
fn test_middle_point_of_closest_element() {
    let surface = MultiSurface::new(vec![
        Box::new(equatorial(0.0, 0.1)),
        Box::new(equatorial(0.1, 0.3)),
    ])
    .unwrap();
    // the bounding box centre (0.15, 0) lies on the second element
    let middle = surface.get_middle_point().unwrap();
    assert_close(middle.longitude, 0.2, 1e-9);
    assert_close(middle.depth, 5.0, 1e-9);
}

#[test]
fn test_gc2_concordant_segments() {
    let surface = MultiSurface::new(vec![
        Box::new(equatorial(0.0, 0.1)),
        Box::new(equatorial(0.1, 0.2)),
    ])
    .unwrap();
    let frame = surface.gc2_frame().unwrap();
    assert_eq!(frame.discordant(), &[false, false]);
    assert_close(frame.gc_length(), 0.2 * 111.19492664, 1e-3);

    let (t, u) = surface
        .get_generalised_coordinates(&sites(&[(0.05, 0.0), (-0.05, 0.0)]))
        .unwrap();
    assert_eq!(t[[0]], 0.0);
    assert_close(u[[0]], 5.5597, 1e-3);
    assert_close(u[[1]], -5.5597, 1e-3);

    let ry0 = surface
        .get_ry0_distance(&sites(&[(-0.05, 0.0), (0.15, 0.05), (0.3, 0.0)]))
        .unwrap();
    assert_close(ry0[[0]], 5.5597, 1e-2);
    assert_eq!(ry0[[1]], 0.0);
    assert_close(ry0[[2]], 11.1195, 1e-2);
}

#[test]
fn test_gc2_discordant_segment_is_reversed() {
    // the longer segment runs west, so the short eastward one is discordant
    let surface = MultiSurface::new(vec![
        Box::new(equatorial(0.0, 0.1)),
        Box::new(equatorial(0.3, 0.1)),
    ])
    .unwrap();
    let frame = surface.gc2_frame().unwrap();
    assert_eq!(frame.discordant(), &[true, false]);
    assert!(frame.b_hat().x < -0.99);

    let ry0 = surface
        .get_ry0_distance(&sites(&[(-0.05, 0.0), (0.35, 0.0), (0.15, 0.01)]))
        .unwrap();
    assert_close(ry0[[0]], 5.5597, 1e-2);
    assert_close(ry0[[1]], 5.5597, 1e-2);
    assert_eq!(ry0[[2]], 0.0);
}

#[test]
fn test_gc2_rx_sign() {
    let surface = MultiSurface::new(vec![
        Box::new(equatorial(0.0, 0.1)),
        Box::new(equatorial(0.1, 0.2)),
    ])
    .unwrap();
    // strike east: south of the trace is on the right
    let t = surface
        .get_gc2_rx_distance(&sites(&[(0.1, -0.05), (0.1, 0.05)]))
        .unwrap();
    assert_close(t[[0]], 5.5597, 1e-2);
    assert_close(t[[1]], -5.5597, 1e-2);
}
