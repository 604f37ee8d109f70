//! Polylines of geographic points: fault traces, surface edges and profiles.

use ndarray::{Array2, ArrayD};
use serde::{Deserialize, Serialize};

use super::mesh::Mesh;
use super::projection::{clean_points, line_intersects_itself, OrthographicProjection};
use super::surface::gc2::WeightedCoordinates;
use super::{check_spacing, GeoError, GeoResult, Point};
use crate::geometry::Vector2;

/// Offsets below this (km) snap to the existing vertex when resampling.
const VERTEX_SNAP_DISTANCE: f64 = 1e-5;

/// An ordered, non-empty sequence of points.
///
/// Consecutive duplicates are dropped on construction. Transformations
/// return new lines; [`Line::flip`] is the only in-place mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Line {
    points: Vec<Point>,
}

/// Unit vectors of each segment of a line in its projected plane.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentFrames {
    pub lengths: Vec<f64>,
    /// Along-segment unit vectors.
    pub u_hat: Vec<Vector2>,
    /// Unit vectors normal to each segment, pointing to its right.
    pub t_hat: Vec<Vector2>,
}

impl Line {
    pub fn new(points: Vec<Point>) -> GeoResult<Self> {
        if points.is_empty() {
            return Err(GeoError::EmptyLine);
        }
        Ok(Self {
            points: clean_points(&points),
        })
    }

    /// Build a line from `[lon, lat, depth]` triples.
    pub fn from_coords(coords: &[[f64; 3]]) -> GeoResult<Self> {
        Self::new(coords.iter().copied().map(Point::from).collect())
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a line holds at least one point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Point {
        self.points[0]
    }

    pub fn last(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    pub fn lons(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.longitude).collect()
    }

    pub fn lats(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.latitude).collect()
    }

    /// Length in km, depth included.
    pub fn get_length(&self) -> f64 {
        self.get_lengths().iter().sum()
    }

    /// Length of each segment in km, depth included.
    pub fn get_lengths(&self) -> Vec<f64> {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).collect()
    }

    pub fn get_azimuths(&self) -> Vec<f64> {
        self.points.windows(2).map(|w| w[0].azimuth(&w[1])).collect()
    }

    /// Mean direction of the line, each segment weighted by its surface
    /// length.
    pub fn average_azimuth(&self) -> f64 {
        if self.points.len() == 2 {
            return self.points[0].azimuth(&self.points[1]);
        }
        let (sx, sy) = self.points.windows(2).fold((0.0, 0.0), |(sx, sy), w| {
            let dist = w[0].horizontal_distance(&w[1]);
            let az = w[0].azimuth(&w[1]).to_radians();
            (sx + dist * az.sin(), sy + dist * az.cos())
        });
        sx.atan2(sy).to_degrees().rem_euclid(360.0)
    }

    /// Reverse the point order in place.
    pub fn flip(&mut self) {
        self.points.reverse();
    }

    /// A reversed copy.
    pub fn flipped(&self) -> Line {
        let mut line = self.clone();
        line.flip();
        line
    }

    pub fn is_self_intersecting(&self) -> GeoResult<bool> {
        line_intersects_itself(&self.lons(), &self.lats(), false)
    }

    /// Resample segment by segment at roughly `section_length` km.
    ///
    /// The first point is kept exactly. Each vertex after the second is
    /// approached from the last resampled point, so the last point of the
    /// result lands on the original end only when the remaining distance is
    /// close to a multiple of the spacing.
    pub fn resample(&self, section_length: f64) -> GeoResult<Line> {
        check_spacing(section_length)?;
        if self.points.len() < 2 {
            return Ok(self.clone());
        }
        let mut resampled =
            self.points[0].equally_spaced_points(&self.points[1], section_length);
        for target in &self.points[2..] {
            let last = resampled[resampled.len() - 1];
            let batch = last.equally_spaced_points(target, section_length);
            resampled.extend(batch.into_iter().skip(1));
        }
        if resampled.len() < 2 {
            return Err(GeoError::ResampleTooCoarse {
                spacing: section_length,
                length: self.get_length(),
            });
        }
        Line::new(resampled)
    }

    /// Redistribute exactly `num_points` points proportionally to arc length.
    ///
    /// Interior vertices of the original line are cut through, not kept.
    pub fn resample_to_num_points(&self, num_points: usize) -> GeoResult<Line> {
        if self.points.len() < 2 {
            return Err(GeoError::TooFewPoints {
                operation: "resampling a line",
                required: 2,
                actual: self.points.len(),
            });
        }
        if num_points < 2 {
            return Err(GeoError::TooFewPoints {
                operation: "a resampled line",
                required: 2,
                actual: num_points,
            });
        }
        let section_length = self.get_length() / (num_points - 1) as f64;
        let mut resampled = Vec::with_capacity(num_points);
        resampled.push(self.points[0]);

        let mut segment = 0;
        let mut acc_length = 0.0;
        let mut last_segment_length = 0.0;
        for i in 0..num_points - 1 {
            let tot_length = (i + 1) as f64 * section_length;
            while tot_length > acc_length && segment < self.points.len() - 1 {
                last_segment_length = self.points[segment].distance(&self.points[segment + 1]);
                acc_length += last_segment_length;
                segment += 1;
            }
            let segment = segment.max(1);
            let p1 = self.points[segment - 1];
            let p2 = self.points[segment];
            let offset = tot_length - (acc_length - last_segment_length);
            if offset < VERTEX_SNAP_DISTANCE || last_segment_length <= 0.0 {
                resampled.push(p1);
            } else {
                let fraction = offset / last_segment_length;
                resampled.push(p1.point_at(
                    p1.horizontal_distance(&p2) * fraction,
                    (p2.depth - p1.depth) * fraction,
                    p1.azimuth(&p2),
                ));
            }
        }
        Ok(Line { points: resampled })
    }

    /// Keep the end points and every vertex where the direction changes by
    /// more than `delta` degrees.
    pub fn keep_corners(&self, delta: f64) -> Line {
        if self.points.len() < 3 {
            return self.clone();
        }
        let azimuths = self.get_azimuths();
        let mut kept = vec![self.points[0]];
        for (i, pair) in azimuths.windows(2).enumerate() {
            let change = (pair[1] - pair[0] + 180.0).rem_euclid(360.0) - 180.0;
            if change.abs() > delta {
                kept.push(self.points[i + 1]);
            }
        }
        kept.push(self.last());
        Line { points: kept }
    }

    fn projected(&self) -> GeoResult<(OrthographicProjection, Vec<[f64; 2]>)> {
        let lons = self.lons();
        let lats = self.lats();
        let proj = OrthographicProjection::from_lons_lats(&lons, &lats)?;
        let coords = proj.project_all(&lons, &lats)?;
        Ok((proj, coords))
    }

    /// Segment lengths and unit vectors in the line's own projection.
    pub fn get_tu_hat(&self) -> GeoResult<SegmentFrames> {
        if self.points.len() < 2 {
            return Err(GeoError::TooFewPoints {
                operation: "segment frames",
                required: 2,
                actual: self.points.len(),
            });
        }
        let (_, coords) = self.projected()?;
        let mut frames = SegmentFrames {
            lengths: Vec::with_capacity(coords.len() - 1),
            u_hat: Vec::with_capacity(coords.len() - 1),
            t_hat: Vec::with_capacity(coords.len() - 1),
        };
        for w in coords.windows(2) {
            let d = Vector2::new(w[1][0] - w[0][0], w[1][1] - w[0][1]);
            let len = d.norm();
            frames.lengths.push(len);
            frames.u_hat.push(d / len);
            frames.t_hat.push(Vector2::new(d.y, -d.x) / len);
        }
        Ok(frames)
    }

    /// Local along-segment (`u`) and across-segment (`t`) coordinates of
    /// every site for every segment. Rows are segments, columns are the
    /// sites in logical order.
    pub fn get_ui_ti(
        &self,
        sites: &Mesh,
        frames: &SegmentFrames,
    ) -> GeoResult<(Array2<f64>, Array2<f64>)> {
        let (proj, coords) = self.projected()?;
        let site_xy = proj.project_all(
            &sites.lons().iter().copied().collect::<Vec<_>>(),
            &sites.lats().iter().copied().collect::<Vec<_>>(),
        )?;
        let nseg = frames.lengths.len();
        let mut ui = Array2::zeros((nseg, site_xy.len()));
        let mut ti = Array2::zeros((nseg, site_xy.len()));
        for seg in 0..nseg {
            let origin = coords[seg];
            for (k, xy) in site_xy.iter().enumerate() {
                let r = Vector2::new(xy[0] - origin[0], xy[1] - origin[1]);
                ui[[seg, k]] = r.dot(&frames.u_hat[seg]);
                ti[[seg, k]] = r.dot(&frames.t_hat[seg]);
            }
        }
        Ok((ui, ti))
    }

    /// Generalised `(t, u)` coordinates of each site relative to this line,
    /// shaped like `sites`.
    ///
    /// `t` is positive to the right of the line, `u` is measured along the
    /// line from its first point. Sites lying on the line have `t = 0`.
    pub fn get_tu(&self, sites: &Mesh, on_trace_tolerance: f64) -> GeoResult<(ArrayD<f64>, ArrayD<f64>)> {
        let frames = self.get_tu_hat()?;
        let (ui, ti) = self.get_ui_ti(sites, &frames)?;
        let nsites = ui.ncols();
        let mut tt = Vec::with_capacity(nsites);
        let mut uu = Vec::with_capacity(nsites);
        for k in 0..nsites {
            let mut acc = WeightedCoordinates::default();
            let mut shift = 0.0;
            for (seg, &len) in frames.lengths.iter().enumerate() {
                acc.add(ui[[seg, k]], ti[[seg, k]], len, shift, on_trace_tolerance);
                shift += len;
            }
            let (t, u) = acc.resolve();
            tt.push(t);
            uu.push(u);
        }
        Ok((sites.shaped(tt)?, sites.shaped(uu)?))
    }
}

impl TryFrom<Vec<Point>> for Line {
    type Error = GeoError;

    fn try_from(points: Vec<Point>) -> GeoResult<Self> {
        Line::new(points)
    }
}

impl From<Line> for Vec<Point> {
    fn from(line: Line) -> Self {
        line.points
    }
}
