//! Ruptures made of several independent surface elements.

use std::sync::OnceLock;

use ndarray::{ArrayD, Zip};
use tracing::trace;

use super::gc2::Gc2Frame;
use super::Surface;
use crate::config::GeoConfig;
use crate::geo::projection::{get_spherical_bounding_box, BoundingBox};
use crate::geo::{GeoError, GeoResult, Mesh, Point};

/// One logical rupture surface made of an ordered list of elements.
///
/// Element areas and the generalised coordinate frame are computed on first
/// use and kept for the lifetime of the value; the element list cannot be
/// changed after construction.
#[derive(Debug)]
pub struct MultiSurface {
    surfaces: Vec<Box<dyn Surface>>,
    config: GeoConfig,
    areas: OnceLock<Vec<f64>>,
    gc2: OnceLock<GeoResult<Gc2Frame>>,
}

impl MultiSurface {
    pub fn new(surfaces: Vec<Box<dyn Surface>>) -> GeoResult<Self> {
        Self::with_config(surfaces, GeoConfig::default())
    }

    /// Like [`MultiSurface::new`], with explicit tolerances for top-edge
    /// simplification and the generalised coordinates.
    pub fn with_config(surfaces: Vec<Box<dyn Surface>>, config: GeoConfig) -> GeoResult<Self> {
        if surfaces.is_empty() {
            return Err(GeoError::TooFewPoints {
                operation: "a multi-surface",
                required: 1,
                actual: 0,
            });
        }
        config.validate()?;
        Ok(Self {
            surfaces,
            config,
            areas: OnceLock::new(),
            gc2: OnceLock::new(),
        })
    }

    pub fn surfaces(&self) -> &[Box<dyn Surface>] {
        &self.surfaces
    }

    pub fn config(&self) -> &GeoConfig {
        &self.config
    }

    fn areas(&self) -> &[f64] {
        self.areas
            .get_or_init(|| self.surfaces.iter().map(|s| s.get_area()).collect())
    }

    fn weighted_mean(&self, value: impl Fn(&dyn Surface) -> f64) -> f64 {
        let areas = self.areas();
        let total: f64 = areas.iter().sum();
        self.surfaces
            .iter()
            .zip(areas)
            .map(|(s, a)| a * value(s.as_ref()))
            .sum::<f64>()
            / total
    }

    /// Evaluate `f` on every element, on the rayon pool when the
    /// `parallel` feature is enabled.
    fn per_surface<T, F>(&self, f: F) -> GeoResult<Vec<T>>
    where
        T: Send,
        F: Fn(&dyn Surface) -> GeoResult<T> + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.surfaces.par_iter().map(|s| f(s.as_ref())).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.surfaces.iter().map(|s| f(s.as_ref())).collect()
        }
    }

    /// Element-wise minimum of a per-element site metric.
    fn min_over_surfaces<F>(&self, metric: F) -> GeoResult<ArrayD<f64>>
    where
        F: Fn(&dyn Surface) -> GeoResult<ArrayD<f64>> + Sync + Send,
    {
        let mut all = self.per_surface(metric)?.into_iter();
        let mut out = all
            .next()
            .ok_or_else(|| GeoError::Unsupported("empty multi-surface".into()))?;
        for dists in all {
            Zip::from(&mut out).and(&dists).for_each(|o, &d| {
                if d < *o {
                    *o = d;
                }
            });
        }
        Ok(out)
    }

    /// Index of the closest element for each site, in logical order. Ties
    /// go to the element listed first.
    fn closest_surface(&self, sites: &Mesh) -> GeoResult<Vec<usize>> {
        let dists: Vec<Vec<f64>> = self
            .per_surface(|s| s.get_min_distance(sites))?
            .into_iter()
            .map(|d| d.iter().copied().collect())
            .collect();
        Ok((0..sites.len())
            .map(|k| {
                (1..dists.len()).fold(0, |best, i| if dists[i][k] < dists[best][k] { i } else { best })
            })
            .collect())
    }

    /// Generalised coordinate frame over the top edges of all elements.
    pub fn gc2_frame(&self) -> GeoResult<&Gc2Frame> {
        self.gc2
            .get_or_init(|| {
                let traces = self
                    .surfaces
                    .iter()
                    .map(|s| s.get_top_edge(self.config.edge_tolerance))
                    .collect::<GeoResult<Vec<_>>>()?;
                Gc2Frame::new(&traces, self.config.on_trace_tolerance)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// GC2 `(T, U)` coordinates of each site, shaped like `sites`.
    pub fn get_generalised_coordinates(&self, sites: &Mesh) -> GeoResult<(ArrayD<f64>, ArrayD<f64>)> {
        self.gc2_frame()?.generalised_coordinates(sites)
    }

    /// Strike-normal GC2 coordinate `T` of each site.
    pub fn get_gc2_rx_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        Ok(self.get_generalised_coordinates(sites)?.0)
    }
}

impl Surface for MultiSurface {
    fn get_min_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        self.min_over_surfaces(|s| s.get_min_distance(sites))
    }

    fn get_closest_points(&self, sites: &Mesh) -> GeoResult<Mesh> {
        let closest = self.closest_surface(sites)?;
        let mut picked: Vec<Option<(Vec<f64>, Vec<f64>, Vec<f64>)>> = vec![None; self.surfaces.len()];
        for &i in &closest {
            if picked[i].is_none() {
                picked[i] = Some(self.surfaces[i].get_closest_points(sites)?.flat_coords());
            }
        }
        let n = closest.len();
        let (mut lons, mut lats, mut depths) = (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));
        for (k, &i) in closest.iter().enumerate() {
            if let Some((x, y, z)) = &picked[i] {
                lons.push(x[k]);
                lats.push(y[k]);
                depths.push(z[k]);
            }
        }
        Mesh::new(sites.shaped(lons)?, sites.shaped(lats)?, Some(sites.shaped(depths)?))
    }

    fn get_joyner_boore_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        self.min_over_surfaces(|s| s.get_joyner_boore_distance(sites))
    }

    /// Rx of the element closest to each site.
    fn get_rx_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        let closest = self.closest_surface(sites)?;
        let mut rx: Vec<Option<Vec<f64>>> = vec![None; self.surfaces.len()];
        for &i in &closest {
            if rx[i].is_none() {
                rx[i] = Some(self.surfaces[i].get_rx_distance(sites)?.iter().copied().collect());
            }
        }
        trace!(
            elements = rx.iter().filter(|r| r.is_some()).count(),
            "rx from closest elements"
        );
        let values = closest
            .iter()
            .enumerate()
            .map(|(k, &i)| rx[i].as_ref().map_or(f64::NAN, |r| r[k]))
            .collect();
        sites.shaped(values)
    }

    /// A single element answers directly; several are measured along the
    /// GC2 `U` axis beyond either end of the combined trace.
    fn get_ry0_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        if let [single] = self.surfaces.as_slice() {
            return single.get_ry0_distance(sites);
        }
        self.gc2_frame()?.ry0_distance(sites)
    }

    fn get_top_edge_depth(&self) -> f64 {
        self.weighted_mean(|s| s.get_top_edge_depth())
    }

    /// Area-weighted circular mean of the element strikes.
    fn get_strike(&self) -> f64 {
        let sin = self.weighted_mean(|s| s.get_strike().to_radians().sin());
        let cos = self.weighted_mean(|s| s.get_strike().to_radians().cos());
        sin.atan2(cos).to_degrees().rem_euclid(360.0)
    }

    fn get_dip(&self) -> f64 {
        self.weighted_mean(|s| s.get_dip())
    }

    fn get_width(&self) -> f64 {
        self.weighted_mean(|s| s.get_width())
    }

    fn get_area(&self) -> f64 {
        self.areas().iter().sum()
    }

    fn get_bounding_box(&self) -> GeoResult<BoundingBox> {
        let mut lons = Vec::with_capacity(2 * self.surfaces.len());
        let mut lats = Vec::with_capacity(2 * self.surfaces.len());
        for surface in &self.surfaces {
            let bbox = surface.get_bounding_box()?;
            lons.extend([bbox.west, bbox.east]);
            lats.extend([bbox.north, bbox.south]);
        }
        get_spherical_bounding_box(&lons, &lats)
    }

    /// Middle point of the element closest to the centre of the bounding
    /// box, or of the only element.
    fn get_middle_point(&self) -> GeoResult<Point> {
        if let [single] = self.surfaces.as_slice() {
            return single.get_middle_point();
        }
        let (lon, lat) = self.get_bounding_box()?.middle_point();
        let centre = Mesh::from_vectors(vec![lon], vec![lat], None)?;
        let closest = self.closest_surface(&centre)?;
        self.surfaces[closest[0]].get_middle_point()
    }

    fn get_top_edge(&self, tolerance: f64) -> GeoResult<Vec<Point>> {
        match self.surfaces.as_slice() {
            [single] => single.get_top_edge(tolerance),
            _ => Err(GeoError::Unsupported(
                "a single top edge for several surface elements".into(),
            )),
        }
    }
}
