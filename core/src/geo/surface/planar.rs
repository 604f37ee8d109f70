//! Rectangular planar rupture surfaces.

use ndarray::ArrayD;

use super::Surface;
use crate::geo::mesh::{map_sites, Mesh};
use crate::geo::nodalplane::{check_dip, check_strike};
use crate::geo::projection::{get_middle_point, get_spherical_bounding_box, BoundingBox};
use crate::geo::{geodetic, GeoResult, Point, SurfaceGeometryError};
use crate::geometry::sign;
use crate::geometry::utils_3d::PlaneFrame;

/// Corners may deviate from a plane (and top/bottom edges may differ in
/// length) by this fraction of the surface area, in km.
const IMPERFECT_RECTANGLE_TOLERANCE: f64 = 0.002;

/// A rectangle given by four corners, with explicit strike and dip.
///
/// Corners are stored as `[top_left, top_right, bottom_left, bottom_right]`
/// where "left" is the start of the top edge when walking along strike.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarSurface {
    strike: f64,
    dip: f64,
    corners: [Point; 4],
    frame: PlaneFrame,
    length: f64,
    width: f64,
}

impl PlanarSurface {
    /// Build and validate a planar surface.
    ///
    /// Top corners must share a depth, as must bottom corners; the four
    /// corners must be coplanar and form a rectangle within tolerance.
    pub fn new(
        strike: f64,
        dip: f64,
        top_left: Point,
        top_right: Point,
        bottom_right: Point,
        bottom_left: Point,
    ) -> GeoResult<Self> {
        if top_left.depth != top_right.depth || bottom_left.depth != bottom_right.depth {
            return Err(SurfaceGeometryError::NonParallelEdges.into());
        }
        check_dip(dip)?;
        check_strike(strike)?;

        let surface = Self::build(strike, dip, [top_left, top_right, bottom_left, bottom_right]);
        let tolerance = surface.width * surface.length * IMPERFECT_RECTANGLE_TOLERANCE;
        let projected = surface.projected_corners();
        if projected.iter().any(|(dist, _, _)| dist.abs() > tolerance) {
            return Err(SurfaceGeometryError::NonCoplanarCorners.into());
        }
        let length1 = projected[1].1 - projected[0].1;
        let length2 = projected[3].1 - projected[2].1;
        if length2 < 0.0 {
            return Err(SurfaceGeometryError::WrongCornerOrder.into());
        }
        if (length1 - length2).abs() > tolerance {
            return Err(SurfaceGeometryError::EdgeLengthMismatch.into());
        }
        Ok(surface)
    }

    /// Surface from corners alone: strike follows the top edge and dip is
    /// derived from the left edge.
    pub fn from_corner_points(
        top_left: Point,
        top_right: Point,
        bottom_right: Point,
        bottom_left: Point,
    ) -> GeoResult<Self> {
        let strike = top_left.azimuth(&top_right);
        let dip = ((bottom_left.depth - top_left.depth) / top_left.distance(&bottom_left))
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees();
        Self::new(strike, dip, top_left, top_right, bottom_right, bottom_left)
    }

    /// Surface from `[top_left, top_right, bottom_left, bottom_right]`
    /// without any validation. Strike and dip are taken from the corners.
    pub fn from_array(corners: [Point; 4]) -> Self {
        let [tl, tr, bl, _] = corners;
        let strike = tl.azimuth(&tr);
        let dip = ((bl.depth - tl.depth) / tl.distance(&bl))
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees();
        Self::build(strike, dip, corners)
    }

    fn build(strike: f64, dip: f64, corners: [Point; 4]) -> Self {
        let frame = PlaneFrame::from_corners(
            corners[0].to_cartesian(),
            corners[1].to_cartesian(),
            corners[2].to_cartesian(),
        );
        let mut surface = Self {
            strike,
            dip,
            corners,
            frame,
            length: 0.0,
            width: 0.0,
        };
        let p = surface.projected_corners();
        surface.length = ((p[1].1 - p[0].1) + (p[3].1 - p[2].1)) / 2.0;
        surface.width = ((p[2].2 - p[0].2) + (p[3].2 - p[1].2)) / 2.0;
        surface
    }

    fn projected_corners(&self) -> [(f64, f64, f64); 4] {
        self.corners.map(|c| self.frame.project(&c.to_cartesian()))
    }

    /// A copy moved the way `p1` would have to move to reach `p2`.
    /// Depths shift by the depth difference.
    pub fn translate(&self, p1: &Point, p2: &Point) -> Self {
        let azimuth = p1.azimuth(p2);
        let distance = p1.horizontal_distance(p2);
        let vertical = p2.depth - p1.depth;
        let corners = self.corners.map(|c| c.point_at(distance, vertical, azimuth));
        let mut moved = Self::build(self.strike, self.dip, corners);
        moved.length = self.length;
        moved.width = self.width;
        moved
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[2]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[3]
    }

    /// `[top_left, top_right, bottom_left, bottom_right]`.
    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    /// Mean length of the top and bottom edges.
    pub fn length(&self) -> f64 {
        self.length
    }

    fn corner_lons(&self) -> [f64; 4] {
        self.corners.map(|c| c.longitude)
    }

    fn corner_lats(&self) -> [f64; 4] {
        self.corners.map(|c| c.latitude)
    }

    /// `(distance to plane, along strike, down dip)` clipped to the
    /// rectangle, for one site.
    fn clipped(&self, lon: f64, lat: f64, depth: f64) -> (f64, f64, f64) {
        let site = Point::new(lon, lat, depth).to_cartesian();
        let (dist, x, y) = self.frame.project(&site);
        (dist, x.clamp(0.0, self.length), y.clamp(0.0, self.width))
    }
}

impl Surface for PlanarSurface {
    fn get_min_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        let length = self.length;
        let width = self.width;
        Ok(map_sites(sites, |lon, lat, depth| {
            let site = Point::new(lon, lat, depth).to_cartesian();
            let (dist, x, y) = self.frame.project(&site);
            let mxx = (-x).max(0.0).max(x - length);
            let myy = (-y).max(0.0).max(y - width);
            (dist * dist + mxx * mxx + myy * myy).sqrt()
        }))
    }

    fn get_closest_points(&self, sites: &Mesh) -> GeoResult<Mesh> {
        let closest = map_sites(sites, |lon, lat, depth| {
            let (_, x, y) = self.clipped(lon, lat, depth);
            let p = Point::from_cartesian(&self.frame.unproject(0.0, x, y));
            (p.longitude, p.latitude, p.depth)
        });
        Mesh::new(
            closest.mapv(|c| c.0),
            closest.mapv(|c| c.1),
            Some(closest.mapv(|c| c.2)),
        )
    }

    fn get_joyner_boore_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        let [tl, tr, bl, _] = self.corners;
        let downdip = (self.strike + 90.0) % 360.0;
        let arcs = [
            (tl, self.strike),
            (bl, self.strike),
            (tl, downdip),
            (tr, downdip),
        ];
        let lons = self.corner_lons();
        let lats = self.corner_lats();
        Ok(map_sites(sites, |lon, lat, _| {
            let d = arcs.map(|(p, az)| {
                geodetic::distance_to_arc(p.longitude, p.latitude, az, lon, lat)
            });
            // sites between both strike-parallel arcs and both
            // dip-parallel arcs are above the rupture
            let same_strike_side = sign(d[0]) == sign(d[1]);
            let same_dip_side = sign(d[2]) == sign(d[3]);
            match (same_strike_side, same_dip_side) {
                (true, true) => geodetic::min_geodetic_distance(&lons, &lats, lon, lat),
                (true, false) => d[0].abs().min(d[1].abs()),
                (false, true) => d[2].abs().min(d[3].abs()),
                (false, false) => 0.0,
            }
        }))
    }

    fn get_rx_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        let tl = self.corners[0];
        Ok(map_sites(sites, |lon, lat, _| {
            geodetic::distance_to_arc(tl.longitude, tl.latitude, self.strike, lon, lat)
        }))
    }

    fn get_ry0_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        let [tl, tr, _, _] = self.corners;
        let azimuth = (self.strike + 90.0) % 360.0;
        Ok(map_sites(sites, |lon, lat, _| {
            let d1 = geodetic::distance_to_arc(tl.longitude, tl.latitude, azimuth, lon, lat);
            let d2 = geodetic::distance_to_arc(tr.longitude, tr.latitude, azimuth, lon, lat);
            if sign(d1) == sign(d2) {
                d1.abs().min(d2.abs())
            } else {
                0.0
            }
        }))
    }

    fn get_top_edge_depth(&self) -> f64 {
        self.corners[0].depth
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
        self.width * self.length
    }

    fn get_bounding_box(&self) -> GeoResult<BoundingBox> {
        get_spherical_bounding_box(&self.corner_lons(), &self.corner_lats())
    }

    fn get_middle_point(&self) -> GeoResult<Point> {
        let [tl, _, _, br] = self.corners;
        let (lon, lat) = get_middle_point(tl.longitude, tl.latitude, br.longitude, br.latitude);
        Ok(Point::new(lon, lat, (tl.depth + br.depth) / 2.0))
    }

    fn get_top_edge(&self, _tolerance: f64) -> GeoResult<Vec<Point>> {
        Ok(vec![self.corners[0], self.corners[1]])
    }
}

impl PlanarSurface {
    /// Per-site `(distance, x, y)` in the plane frame, unclipped.
    pub fn project(&self, sites: &Mesh) -> ArrayD<(f64, f64, f64)> {
        map_sites(sites, |lon, lat, depth| {
            self.frame.project(&Point::new(lon, lat, depth).to_cartesian())
        })
    }

    /// Geographic points for plane-frame coordinates.
    pub fn project_back(&self, dist: f64, x: f64, y: f64) -> Point {
        Point::from_cartesian(&self.frame.unproject(dist, x, y))
    }
}
