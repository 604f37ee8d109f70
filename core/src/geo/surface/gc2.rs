//! Generalised coordinates (GC2) over one or more fault traces.
//!
//! Each trace is projected to a plane and its segments oriented so that
//! they all run the same overall way. Every site then gets a strike-normal
//! coordinate `T` and a strike-parallel coordinate `U`: weighted means of
//! its local coordinates relative to each segment.

use ndarray::ArrayD;
use tracing::debug;

use crate::geo::mesh::{try_map_sites, Mesh};
use crate::geo::projection::{get_spherical_bounding_box, OrthographicProjection};
use crate::geo::{GeoError, GeoResult, Point};
use crate::geometry::{sign, Vector2, EPSILON};

/// Running weighted sums of local segment coordinates for one site.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WeightedCoordinates {
    sum_w: f64,
    sum_wt: f64,
    sum_wu: f64,
    on_trace_u: Option<f64>,
}

impl WeightedCoordinates {
    /// Add a segment of length `length` starting `offset` km along the
    /// trace, for a site at local coordinates `(u, t)`.
    pub(crate) fn add(&mut self, u: f64, t: f64, length: f64, offset: f64, tolerance: f64) {
        let weight = if t == 0.0 || t.abs() < tolerance {
            if (0.0..=length).contains(&u) {
                // the site lies on this segment
                self.on_trace_u.get_or_insert(u + offset);
                return;
            }
            1.0 / (u - length) - 1.0 / u
        } else {
            (((length - u) / t).atan() - (-u / t).atan()) / t
        };
        self.sum_w += weight;
        self.sum_wt += weight * t;
        self.sum_wu += weight * (u + offset);
    }

    /// `(t, u)` for the site.
    pub(crate) fn resolve(&self) -> (f64, f64) {
        match self.on_trace_u {
            Some(u) => (0.0, u),
            None => (self.sum_wt / self.sum_w, self.sum_wu / self.sum_w),
        }
    }
}

/// A GC2 coordinate system built from a set of traces.
#[derive(Debug, Clone)]
pub struct Gc2Frame {
    proj: OrthographicProjection,
    /// Projected traces, discordant ones reversed.
    edges: Vec<Vec<Vector2>>,
    lengths: Vec<Vec<f64>>,
    cum_lengths: Vec<Vec<f64>>,
    a_hat: Vector2,
    b_hat: Vector2,
    ejs: Vec<f64>,
    e_tot: f64,
    discordant: Vec<bool>,
    p0: Vector2,
    gc_length: f64,
    on_trace_tolerance: f64,
}

impl Gc2Frame {
    /// Build the frame. Each trace needs at least two points.
    ///
    /// Fails with [`GeoError::Gc2Degenerate`] when the traces cancel out
    /// and no overall strike direction exists.
    pub fn new(traces: &[Vec<Point>], on_trace_tolerance: f64) -> GeoResult<Self> {
        if traces.is_empty() {
            return Err(GeoError::Unsupported(
                "generalised coordinates without any trace".into(),
            ));
        }
        if let Some(short) = traces.iter().find(|t| t.len() < 2) {
            return Err(GeoError::Unsupported(format!(
                "generalised coordinates for a trace of {} point(s)",
                short.len()
            )));
        }

        let lons: Vec<f64> = traces.iter().flatten().map(|p| p.longitude).collect();
        let lats: Vec<f64> = traces.iter().flatten().map(|p| p.latitude).collect();
        let proj = OrthographicProjection::new(get_spherical_bounding_box(&lons, &lats)?);

        let mut edges = Vec::with_capacity(traces.len());
        for trace in traces {
            let edge = trace
                .iter()
                .map(|p| proj.project(p.longitude, p.latitude).map(Vector2::from))
                .collect::<GeoResult<Vec<_>>>()?;
            edges.push(edge);
        }

        // the two end points furthest apart define a_vec, trending east
        let endpoints: Vec<Vector2> = edges
            .iter()
            .flat_map(|e| [e[0], e[e.len() - 1]])
            .collect();
        let (mut irow, mut icol, mut dmax) = (0, 0, f64::NEG_INFINITY);
        for (i, a) in endpoints.iter().enumerate() {
            for (j, b) in endpoints.iter().enumerate() {
                let d = (a - b).norm();
                if d > dmax {
                    (irow, icol, dmax) = (i, j, d);
                }
            }
        }
        let (beginning, ending) = if endpoints[irow].x > endpoints[icol].x {
            (endpoints[icol], endpoints[irow])
        } else {
            (endpoints[irow], endpoints[icol])
        };
        let a_vec = ending - beginning;
        if a_vec.norm() < EPSILON {
            return Err(GeoError::Gc2Degenerate(
                "all trace end points coincide".into(),
            ));
        }
        let a_hat = a_vec.normalize();

        let ejs: Vec<f64> = edges
            .iter()
            .map(|e| (e[e.len() - 1] - e[0]).dot(&a_hat))
            .collect();
        let e_tot: f64 = ejs.iter().sum();
        let sign_etot = sign(e_tot);

        let mut b_vec = Vector2::zeros();
        let mut discordant = Vec::with_capacity(edges.len());
        for (edge, ej) in edges.iter_mut().zip(&ejs) {
            let flip = sign(*ej) * sign_etot < 0.0;
            if flip {
                edge.reverse();
            }
            discordant.push(flip);
            b_vec += edge[edge.len() - 1] - edge[0];
        }
        if b_vec.norm() < EPSILON {
            return Err(GeoError::Gc2Degenerate(
                "trace directions cancel out".into(),
            ));
        }
        let b_hat = b_vec.normalize();
        let p0 = if a_vec.dot(&b_hat) >= 0.0 { beginning } else { ending };

        // lengths follow the oriented edges
        let lengths: Vec<Vec<f64>> = edges
            .iter()
            .map(|e| e.windows(2).map(|w| (w[1] - w[0]).norm()).collect())
            .collect();
        let cum_lengths = lengths
            .iter()
            .map(|l: &Vec<f64>| {
                std::iter::once(0.0)
                    .chain(l.iter().scan(0.0, |acc, x| {
                        *acc += x;
                        Some(*acc)
                    }))
                    .collect()
            })
            .collect();

        let mut frame = Self {
            proj,
            edges,
            lengths,
            cum_lengths,
            a_hat,
            b_hat,
            ejs,
            e_tot,
            discordant,
            p0,
            gc_length: 0.0,
            on_trace_tolerance,
        };
        frame.gc_length = frame
            .edges
            .iter()
            .flatten()
            .map(|xy| frame.coordinates_xy(*xy).1)
            .fold(f64::NEG_INFINITY, f64::max);

        debug!(
            traces = frame.edges.len(),
            discordant = frame.discordant.iter().filter(|&&d| d).count(),
            e_tot = frame.e_tot,
            gc_length = frame.gc_length,
            "GC2 frame ready"
        );
        Ok(frame)
    }

    pub fn a_hat(&self) -> Vector2 {
        self.a_hat
    }

    /// Overall strike direction in the projected plane.
    pub fn b_hat(&self) -> Vector2 {
        self.b_hat
    }

    /// Projection of each trace on `a_hat`, before orientation.
    pub fn ejs(&self) -> &[f64] {
        &self.ejs
    }

    pub fn e_tot(&self) -> f64 {
        self.e_tot
    }

    /// Whether each trace was reversed to follow the overall strike.
    pub fn discordant(&self) -> &[bool] {
        &self.discordant
    }

    /// Origin of the `U` axis in the projected plane.
    pub fn origin(&self) -> Vector2 {
        self.p0
    }

    /// Largest `U` reached by the traces themselves.
    pub fn gc_length(&self) -> f64 {
        self.gc_length
    }

    fn coordinates_xy(&self, site: Vector2) -> (f64, f64) {
        let mut acc = WeightedCoordinates::default();
        for (j, edge) in self.edges.iter().enumerate() {
            let trace_offset = (edge[0] - self.p0).dot(&self.b_hat);
            for (i, seg) in edge.windows(2).enumerate() {
                let length = self.lengths[j][i];
                if length < EPSILON {
                    continue;
                }
                let d = seg[1] - seg[0];
                let u_hat = d / length;
                let t_hat = Vector2::new(d.y, -d.x) / length;
                let r = site - seg[0];
                acc.add(
                    r.dot(&u_hat),
                    r.dot(&t_hat),
                    length,
                    self.cum_lengths[j][i] + trace_offset,
                    self.on_trace_tolerance,
                );
            }
        }
        acc.resolve()
    }

    /// `(T, U)` of a single site.
    pub fn coordinates(&self, lon: f64, lat: f64) -> GeoResult<(f64, f64)> {
        let xy = self.proj.project(lon, lat)?;
        Ok(self.coordinates_xy(Vector2::from(xy)))
    }

    /// `(T, U)` arrays shaped like `sites`.
    pub fn generalised_coordinates(&self, sites: &Mesh) -> GeoResult<(ArrayD<f64>, ArrayD<f64>)> {
        let coords = try_map_sites(sites, |lon, lat, _| self.coordinates(lon, lat))?;
        Ok((coords.mapv(|c| c.0), coords.mapv(|c| c.1)))
    }

    /// Distance beyond either end of the traces along `U`.
    pub fn ry0_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        let (_, uu) = self.generalised_coordinates(sites)?;
        Ok(uu.mapv(|u| {
            if u < 0.0 {
                u.abs()
            } else if u >= self.gc_length {
                u - self.gc_length
            } else {
                0.0
            }
        }))
    }
}
