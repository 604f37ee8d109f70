//! Kite surfaces: faults built from a set of down-dip profiles.

use tracing::{debug, warn};

use super::base::{delegate_surface, FaultMesh};
use super::complex_fault::node_count;
use crate::geo::mesh::RectangularMesh;
use crate::geo::{check_spacing, GeoError, GeoResult, Line, Point, SurfaceGeometryError};

/// Largest accepted relative difference between a requested rupture area
/// and its discretised counterpart.
const MAX_AREA_ERROR: f64 = 0.25;

/// Length and width, both multiples of `sampling`, of a rupture whose area
/// is as close as possible to `area` with aspect ratio `aspect_ratio`.
///
/// Fails with [`GeoError::Discretisation`] when the best candidate is off
/// by more than a quarter of the requested area.
pub fn get_discrete_dimensions(area: f64, sampling: f64, aspect_ratio: f64) -> GeoResult<(f64, f64)> {
    check_spacing(sampling)?;
    let side = (area * aspect_ratio).sqrt() / sampling;
    let len_a = side.ceil() * sampling;
    let wid_a = (len_a / aspect_ratio / sampling).ceil() * sampling;
    let len_b = side.floor() * sampling;
    let wid_b = (len_b / aspect_ratio / sampling).floor() * sampling;

    let candidates = [(len_a, wid_a), (len_a, wid_b), (len_b, wid_a), (len_b, wid_b)];
    let best = candidates
        .iter()
        .copied()
        .filter(|(l, w)| l * w > 0.0)
        .fold(None, |best: Option<(f64, f64)>, (l, w)| match best {
            Some((bl, bw)) if (bl * bw - area).abs() <= (l * w - area).abs() => best,
            _ => Some((l, w)),
        });

    let (length, width) = best.unwrap_or((len_b, wid_b));
    if length * width <= 0.0 || ((length * width - area) / area).abs() > MAX_AREA_ERROR {
        warn!(area, sampling, aspect_ratio, length, width, "rupture cannot be discretised");
        return Err(GeoError::Discretisation {
            area,
            length,
            width,
            aspect_ratio,
        });
    }
    Ok((length, width))
}

/// A fault meshed from profiles ordered along strike, each running from
/// the top of the rupture to its bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct KiteSurface {
    surface: FaultMesh,
    profiles: Vec<Line>,
}

impl KiteSurface {
    /// Mesh the surface spanned by `profiles`.
    ///
    /// Profiles are resampled to a common number of nodes every
    /// `profile_spacing` km (from the longest profile); nodes of equal
    /// index then form the along-strike edges, resampled every
    /// `edge_spacing` km (from the mean edge length). Rows are reversed
    /// if needed so that the surface dips to the right of the top edge.
    pub fn from_profiles(profiles: &[Line], profile_spacing: f64, edge_spacing: f64) -> GeoResult<Self> {
        if profiles.len() < 2 {
            return Err(SurfaceGeometryError::TooFewProfiles.into());
        }
        check_spacing(profile_spacing)?;
        check_spacing(edge_spacing)?;
        if let Some(index) = profiles.iter().position(|p| p.len() < 2) {
            return Err(SurfaceGeometryError::TooFewEdgePoints { index }.into());
        }

        let longest = profiles.iter().map(Line::get_length).fold(0.0, f64::max);
        let num_down = node_count(longest, profile_spacing, "width")?;
        let resampled = profiles
            .iter()
            .map(|p| p.resample_to_num_points(num_down))
            .collect::<GeoResult<Vec<_>>>()?;

        let edges = (0..num_down)
            .map(|r| Line::new(resampled.iter().map(|p| p.points()[r]).collect()))
            .collect::<GeoResult<Vec<_>>>()?;
        let mean_length = edges.iter().map(Line::get_length).sum::<f64>() / edges.len() as f64;
        let num_along = node_count(mean_length, edge_spacing, "length")?;
        let mut rows: Vec<Vec<Point>> = edges
            .iter()
            .map(|e| e.resample_to_num_points(num_along).map(|l| l.points().to_vec()))
            .collect::<GeoResult<_>>()?;

        if dips_left(&rows) {
            debug!("kite profiles dip to the left of the top edge, reversing rows");
            rows.iter_mut().for_each(|row| row.reverse());
        }
        let mesh = RectangularMesh::from_points_list(&rows)?;
        debug!(shape = ?mesh.shape(), "kite surface mesh");
        Ok(Self {
            surface: FaultMesh::new(mesh)?,
            profiles: profiles.to_vec(),
        })
    }

    /// The profiles the surface was built from, as given.
    pub fn profiles(&self) -> &[Line] {
        &self.profiles
    }

    pub fn surface(&self) -> &FaultMesh {
        &self.surface
    }

    pub fn mesh(&self) -> &RectangularMesh {
        self.surface.mesh()
    }
}

/// Whether the bottom row lies to the left of the top row.
fn dips_left(rows: &[Vec<Point>]) -> bool {
    let top = &rows[0];
    let bottom = &rows[rows.len() - 1];
    let strike = top[0].azimuth(&top[top.len() - 1]);
    let mid_top = top[top.len() / 2];
    let mid_bottom = bottom[bottom.len() / 2];
    if mid_top.horizontal_distance(&mid_bottom) < 1e-6 {
        return false;
    }
    let dip_direction = mid_top.azimuth(&mid_bottom);
    (dip_direction - strike).rem_euclid(360.0) > 180.0
}

delegate_surface!(KiteSurface, surface);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::surface::Surface;
    use crate::geometry::ApproxEq;

    /// Profile dipping east from `(lon, lat)` down to 10 km.
    fn profile(lon: f64, lat: f64) -> Line {
        let top = Point::new(lon, lat, 0.0);
        Line::new(vec![top, top.point_at(10.0, 10.0, 90.0)]).unwrap()
    }

    #[test]
    fn test_discrete_dimensions_exact() {
        assert_eq!(get_discrete_dimensions(100.0, 2.5, 1.0).unwrap(), (10.0, 10.0));
    }

    #[test]
    fn test_discrete_dimensions_closest() {
        assert_eq!(get_discrete_dimensions(60.0, 2.0, 1.5).unwrap(), (8.0, 8.0));
    }

    #[test]
    fn test_discrete_dimensions_fail() {
        assert!(matches!(
            get_discrete_dimensions(1.0, 10.0, 1.0),
            Err(GeoError::Discretisation { .. })
        ));
    }

    #[test]
    fn test_from_profiles_south_to_north() {
        // dipping east while walking north: already right-handed
        let profiles = [profile(0.0, 0.0), profile(0.0, 0.1), profile(0.0, 0.2)];
        let surface = KiteSurface::from_profiles(&profiles, 2.0, 2.0).unwrap();
        let (rows, cols) = surface.mesh().shape();
        assert_eq!(rows, 8);
        assert_eq!(cols, 12);
        assert!(surface.get_strike() < 1.0 || surface.get_strike() > 359.0);
        assert!((surface.get_dip() - 45.0).abs() < 0.1);
        assert_eq!(surface.mesh().point(0, 0), Point::surface(0.0, 0.0));
    }

    #[test]
    fn test_from_profiles_reversed_order() {
        let profiles = [profile(0.0, 0.2), profile(0.0, 0.1), profile(0.0, 0.0)];
        let surface = KiteSurface::from_profiles(&profiles, 2.0, 2.0).unwrap();
        assert!(surface.get_strike() < 1.0 || surface.get_strike() > 359.0);
        assert!(surface.mesh().point(0, 0).approx_eq(&Point::surface(0.0, 0.0)));
    }

    #[test]
    fn test_too_few_profiles() {
        assert_eq!(
            KiteSurface::from_profiles(&[profile(0.0, 0.0)], 1.0, 1.0),
            Err(SurfaceGeometryError::TooFewProfiles.into())
        );
    }
}
