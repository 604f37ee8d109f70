use crate::geo::surface::{PlanarSurface, Surface};
use crate::geo::{GeoError, Mesh, Point, SurfaceGeometryError};
use crate::geometry::ApproxEq;

fn planar(strike: f64, dip: f64, corners: [(f64, f64, f64); 4]) -> Result<PlanarSurface, GeoError> {
    let [tl, tr, br, bl] = corners.map(|(lon, lat, depth)| Point::new(lon, lat, depth));
    PlanarSurface::new(strike, dip, tl, tr, br, bl)
}

fn sites(coords: &[(f64, f64)]) -> Mesh {
    Mesh::from_vectors(
        coords.iter().map(|c| c.0).collect(),
        coords.iter().map(|c| c.1).collect(),
        None,
    )
    .unwrap()
}

fn vertical_westward() -> PlanarSurface {
    planar(
        270.0,
        90.0,
        [(0.0, 0.0, 8.0), (-0.1, 0.0, 8.0), (-0.1, 0.0, 9.0), (0.0, 0.0, 9.0)],
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
// Construction
// =============================================================================

#[test]
fn test_top_edge_depths_must_match() {
    let err = planar(
        0.0,
        90.0,
        [(0.0, -1.0, 0.3), (0.0, 1.0, 0.30001), (0.0, 1.0, 0.5), (0.0, -1.0, 0.5)],
    );
    assert_eq!(err, Err(SurfaceGeometryError::NonParallelEdges.into()));
}

#[test]
fn test_twisted_corners_rejected() {
    let err = planar(
        0.0,
        90.0,
        [(0.0, -1.0, 1.0), (0.0, 1.0, 1.0), (0.0, -1.0, 2.0), (0.0, 1.0, 2.0)],
    );
    assert_eq!(err, Err(SurfaceGeometryError::WrongCornerOrder.into()));
}

#[test]
fn test_non_coplanar_corners_rejected() {
    let err = planar(
        0.0,
        90.0,
        [(0.0, -1.0, 1.0), (0.0, 1.0, 1.0), (-0.3, 1.0, 2.0), (0.3, -1.0, 2.0)],
    );
    assert_eq!(err, Err(SurfaceGeometryError::NonCoplanarCorners.into()));
}

#[test]
fn test_unequal_edge_lengths_rejected() {
    let err = planar(
        0.0,
        90.0,
        [(0.0, -1.0, 1.0), (0.0, 1.0, 1.0), (0.0, 1.2, 2.0), (0.0, -1.2, 2.0)],
    );
    assert_eq!(err, Err(SurfaceGeometryError::EdgeLengthMismatch.into()));
}

#[test]
fn test_dip_and_strike_validated() {
    let corners = [(0.0, 0.0, 8.0), (-0.1, 0.0, 8.0), (-0.1, 0.0, 9.0), (0.0, 0.0, 9.0)];
    assert!(matches!(
        planar(270.0, 0.0, corners),
        Err(GeoError::Surface(SurfaceGeometryError::DipOutOfRange { .. }))
    ));
    assert!(matches!(
        planar(360.0, 90.0, corners),
        Err(GeoError::Surface(SurfaceGeometryError::StrikeOutOfRange { .. }))
    ));
}

#[test]
fn test_from_corner_points_derives_strike_and_dip() {
    let surface = PlanarSurface::from_corner_points(
        Point::new(0.0, 0.0, 8.0),
        Point::new(-0.1, 0.0, 8.0),
        Point::new(-0.1, 0.0, 9.0),
        Point::new(0.0, 0.0, 9.0),
    )
    .unwrap();
    assert_close(surface.get_strike(), 270.0, 1e-9);
    assert_close(surface.get_dip(), 90.0, 1e-6);
}

#[test]
fn test_from_array_matches_checked_construction() {
    let [tl, tr, br, bl] = [(0.0, 0.0, 8.0), (-0.1, 0.0, 8.0), (-0.1, 0.0, 9.0), (0.0, 0.0, 9.0)]
        .map(|(lon, lat, depth)| Point::new(lon, lat, depth));
    let checked = PlanarSurface::from_corner_points(tl, tr, br, bl).unwrap();
    let unchecked = PlanarSurface::from_array([tl, tr, bl, br]);
    assert_eq!(unchecked, checked);

    let sites = sites(&[(-0.05, 0.03), (0.2, -0.1)]);
    assert_eq!(
        unchecked.get_joyner_boore_distance(&sites),
        checked.get_joyner_boore_distance(&sites)
    );
    assert_eq!(unchecked.get_rx_distance(&sites), checked.get_rx_distance(&sites));
}

#[test]
fn test_from_array_skips_validation() {
    // bottom corners swapped: rejected when checked
    let corners = [(0.0, -1.0, 1.0), (0.0, 1.0, 1.0), (0.0, 1.0, 2.0), (0.0, -1.0, 2.0)]
        .map(|(lon, lat, depth)| Point::new(lon, lat, depth));
    assert_eq!(
        PlanarSurface::from_corner_points(corners[0], corners[1], corners[3], corners[2]),
        Err(SurfaceGeometryError::WrongCornerOrder.into())
    );
    let surface = PlanarSurface::from_array(corners);
    assert_eq!(surface.top_left(), corners[0]);
    assert_eq!(surface.bottom_right(), corners[3]);
    assert!(surface.get_area().is_finite());
}

// =============================================================================
// Geometry
// =============================================================================

#[test]
fn test_area_and_middle_point() {
    let surface = planar(
        45.0,
        90.0,
        [(0.0, 0.0, 0.0), (0.0, 0.089932, 0.0), (0.0, 0.089932, 10.0), (0.0, 0.0, 10.0)],
    )
    .unwrap();
    assert_close(surface.get_area(), 100.0, 0.1);
    let middle = surface.get_middle_point().unwrap();
    assert!(middle.approx_eq(&Point::new(0.0, 0.044966, 5.0)));
}

#[test]
fn test_width() {
    let surface = planar(
        45.0,
        60.0,
        [(-0.05, -0.05, 8.0), (0.05, 0.05, 8.0), (0.05, 0.05, 10.0), (-0.05, -0.05, 10.0)],
    )
    .unwrap();
    assert_close(surface.get_width(), 2.0, 1e-4);
}

#[test]
fn test_top_edge_and_bounding_box() {
    let surface = vertical_westward();
    assert_eq!(surface.get_top_edge_depth(), 8.0);
    assert_eq!(
        surface.get_top_edge(0.1).unwrap(),
        vec![Point::new(0.0, 0.0, 8.0), Point::new(-0.1, 0.0, 8.0)]
    );
    let bbox = surface.get_bounding_box().unwrap();
    assert_eq!((bbox.west, bbox.east), (-0.1, 0.0));
    assert_eq!((bbox.north, bbox.south), (0.0, 0.0));
}

#[test]
fn test_translate_keeps_dimensions() {
    let surface = vertical_westward();
    let moved = surface.translate(&Point::new(0.0, 0.0, 0.0), &Point::new(0.0, 1.0, 2.0));
    assert_close(moved.get_width(), surface.get_width(), 1e-9);
    assert_close(moved.length(), surface.length(), 1e-9);
    assert_close(moved.top_left().latitude, 1.0, 1e-9);
    assert_close(moved.get_top_edge_depth(), 10.0, 1e-9);
}

// =============================================================================
// Distances
// =============================================================================

#[test]
fn test_min_distance() {
    let surface = vertical_westward();
    let dists = surface
        .get_min_distance(&Mesh::from_points_list(&[
            Point::new(0.0, 0.0, 8.5),
            Point::new(-0.05, 0.0, 0.0),
        ]).unwrap())
        .unwrap();
    assert_close(dists[[0]], 0.0, 1e-6);
    assert_close(dists[[1]], 8.0, 0.01);
}

#[test]
fn test_closest_points() {
    let surface = planar(
        90.0,
        45.0,
        [(-0.1, -0.1, 0.0), (0.1, -0.1, 0.0), (0.1, 0.1, 2.0), (-0.1, 0.1, 2.0)],
    )
    .unwrap();
    let closest = surface.get_closest_points(&sites(&[(0.0, 0.0)])).unwrap();
    let p = closest.points().next().unwrap();
    assert_close(p.longitude, 0.0, 1e-9);
    assert_close(p.latitude, -0.00081824, 1e-7);
    assert_close(p.depth, 1.0113781, 1e-6);
}

#[test]
fn test_joyner_boore_inside_is_zero() {
    let surface = planar(
        90.0,
        45.0,
        [(-1.0, -1.0, 1.0), (1.0, -1.0, 1.0), (1.0, 1.0, 2.0), (-1.0, 1.0, 2.0)],
    )
    .unwrap();
    let dists = surface
        .get_joyner_boore_distance(&sites(&[(0.0, 0.0), (0.5, -0.5)]))
        .unwrap();
    assert_eq!(dists.iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0]);
}

#[test]
fn test_joyner_boore_outside() {
    let surface = vertical_westward();
    let dists = surface
        .get_joyner_boore_distance(&sites(&[(-0.05, 0.05), (0.1, 0.0), (0.1, 0.1)]))
        .unwrap();
    // beside the trace, beyond its end, and off a corner
    assert_close(dists[[0]], 5.5597, 1e-3);
    assert_close(dists[[1]], 11.1195, 1e-3);
    assert_close(dists[[2]], 15.7253, 1e-2);
}

#[test]
fn test_rx_distance() {
    let surface = vertical_westward();
    let dists = surface
        .get_rx_distance(&sites(&[(0.05, 0.05), (0.05, -0.05), (0.05, -1.0), (20.0, 1.0)]))
        .unwrap();
    assert_close(dists[[0]], 5.559752615413244, 1e-6);
    assert_close(dists[[1]], -5.559752615413244, 1e-6);
    assert_close(dists[[2]], -111.19505230826488, 1e-6);
    assert_close(dists[[3]], 111.19505230826488, 0.1);
}

#[test]
fn test_rx_distance_oblique_strike() {
    let surface = planar(
        45.0,
        60.0,
        [(-0.05, -0.05, 8.0), (0.05, 0.05, 8.0), (0.05, 0.05, 9.0), (-0.05, -0.05, 9.0)],
    )
    .unwrap();
    let dists = surface.get_rx_distance(&sites(&[(0.05, 0.0)])).unwrap();
    assert_close(dists[[0]], 3.9313415355436705, 1e-6);
}

#[test]
fn test_ry0_distance() {
    let surface = vertical_westward();
    let dists = surface
        .get_ry0_distance(&sites(&[(-0.05, 0.05), (-0.05, -0.05), (0.05, 0.05), (-0.15, -0.05)]))
        .unwrap();
    assert_eq!(dists[[0]], 0.0);
    assert_eq!(dists[[1]], 0.0);
    assert_close(dists[[2]], 5.55974422, 1e-4);
    assert_close(dists[[3]], 5.55974422, 1e-4);
}

#[test]
fn test_distances_keep_site_shape() {
    let surface = vertical_westward();
    let grid = Mesh::new(
        ndarray::arr2(&[[0.0, 0.1], [0.2, 0.3]]).into_dyn(),
        ndarray::arr2(&[[0.1, 0.1], [0.2, 0.2]]).into_dyn(),
        None,
    )
    .unwrap();
    assert_eq!(surface.get_min_distance(&grid).unwrap().shape(), &[2, 2]);
    assert_eq!(surface.get_joyner_boore_distance(&grid).unwrap().shape(), &[2, 2]);
    assert_eq!(surface.get_closest_points(&grid).unwrap().shape(), &[2, 2]);
}
