//! Point meshes: arbitrary site collections and rectangular rupture grids.
//!
//! Site queries are shape-in, shape-out: a result array always has the
//! shape of the [`Mesh`] of sites it was computed for.

use ndarray::{Array2, ArrayD, Axis, IxDyn, Zip};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::projection::{self, get_middle_point, OrthographicProjection};
use super::{geodetic, GeoError, GeoResult, Point};
use crate::config::GeoConfig;
use crate::geometry::utils_2d;
use crate::geometry::utils_3d::{normalized, triangle_area};
use crate::geometry::{ApproxEq, Vector3, EPSILON};

/// Coordinate tolerance (degrees and km) for [`ApproxEq`] on meshes.
const MESH_EQUALITY_TOLERANCE: f64 = 1e-7;

/// Degrees by which a mean inclination may exceed 90 before it is
/// treated as overturned.
const INCLINATION_NOISE: f64 = 1e-9;

// =============================================================================
// Site mapping
// =============================================================================

/// Evaluate `f(lon, lat, depth)` at every site, keeping the mesh shape.
/// Runs on the rayon pool when the `parallel` feature is enabled.
pub(crate) fn map_sites<T, F>(sites: &Mesh, f: F) -> ArrayD<T>
where
    T: Send,
    F: Fn(f64, f64, f64) -> T + Sync + Send,
{
    let depths = sites.depths_or_zeros();
    let zip = Zip::from(&sites.lons).and(&sites.lats).and(&depths);
    #[cfg(feature = "parallel")]
    let out = zip.par_map_collect(|&lon, &lat, &depth| f(lon, lat, depth));
    #[cfg(not(feature = "parallel"))]
    let out = zip.map_collect(|&lon, &lat, &depth| f(lon, lat, depth));
    out
}

/// Like [`map_sites`] for fallible per-site work; the first error wins.
pub(crate) fn try_map_sites<T, F>(sites: &Mesh, f: F) -> GeoResult<ArrayD<T>>
where
    T: Send,
    F: Fn(f64, f64, f64) -> GeoResult<T> + Sync + Send,
{
    let results = map_sites(sites, f);
    let shape = results.raw_dim();
    let values = results.into_iter().collect::<GeoResult<Vec<T>>>()?;
    ArrayD::from_shape_vec(shape, values).map_err(shape_error)
}

// =============================================================================
// Mesh
// =============================================================================

/// Parallel longitude, latitude and optional depth arrays of one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    lons: ArrayD<f64>,
    lats: ArrayD<f64>,
    depths: Option<ArrayD<f64>>,
}

impl Mesh {
    pub fn new(lons: ArrayD<f64>, lats: ArrayD<f64>, depths: Option<ArrayD<f64>>) -> GeoResult<Self> {
        if lons.shape() != lats.shape() {
            return Err(GeoError::InvalidMesh(format!(
                "lons shape {:?} differs from lats shape {:?}",
                lons.shape(),
                lats.shape()
            )));
        }
        if let Some(depths) = &depths {
            if depths.shape() != lons.shape() {
                return Err(GeoError::InvalidMesh(format!(
                    "depths shape {:?} differs from lons shape {:?}",
                    depths.shape(),
                    lons.shape()
                )));
            }
        }
        if lons.is_empty() {
            return Err(GeoError::InvalidMesh("mesh has no points".into()));
        }
        Ok(Self { lons, lats, depths })
    }

    /// One-dimensional mesh from coordinate vectors.
    pub fn from_vectors(lons: Vec<f64>, lats: Vec<f64>, depths: Option<Vec<f64>>) -> GeoResult<Self> {
        let to_array = |v: Vec<f64>| ArrayD::from_shape_vec(IxDyn(&[v.len()]), v);
        let lons = to_array(lons).map_err(shape_error)?;
        let lats = to_array(lats).map_err(shape_error)?;
        let depths = depths.map(to_array).transpose().map_err(shape_error)?;
        Self::new(lons, lats, depths)
    }

    /// One-dimensional mesh from points. Depths are dropped when every
    /// point lies on the surface.
    pub fn from_points_list(points: &[Point]) -> GeoResult<Self> {
        let lons = points.iter().map(|p| p.longitude).collect();
        let lats = points.iter().map(|p| p.latitude).collect();
        let depths = if points.iter().all(|p| p.depth == 0.0) {
            None
        } else {
            Some(points.iter().map(|p| p.depth).collect())
        };
        Self::from_vectors(lons, lats, depths)
    }

    pub fn shape(&self) -> &[usize] {
        self.lons.shape()
    }

    pub fn len(&self) -> usize {
        self.lons.len()
    }

    /// Always false: construction rejects empty meshes.
    pub fn is_empty(&self) -> bool {
        self.lons.is_empty()
    }

    pub fn lons(&self) -> &ArrayD<f64> {
        &self.lons
    }

    pub fn lats(&self) -> &ArrayD<f64> {
        &self.lats
    }

    pub fn depths(&self) -> Option<&ArrayD<f64>> {
        self.depths.as_ref()
    }

    pub fn depths_or_zeros(&self) -> ArrayD<f64> {
        self.depths
            .clone()
            .unwrap_or_else(|| ArrayD::zeros(self.lons.raw_dim()))
    }

    /// Points in logical (row-major) order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        let depths: Vec<f64> = self.depths_or_zeros().iter().copied().collect();
        self.lons
            .iter()
            .zip(self.lats.iter())
            .zip(depths)
            .map(|((&lon, &lat), depth)| Point::new(lon, lat, depth))
    }

    /// Flat `(lons, lats, depths)` vectors in logical order.
    pub(crate) fn flat_coords(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (
            self.lons.iter().copied().collect(),
            self.lats.iter().copied().collect(),
            self.depths_or_zeros().iter().copied().collect(),
        )
    }

    /// Reshape a vector of per-site values (logical order) to this mesh.
    pub(crate) fn shaped(&self, values: Vec<f64>) -> GeoResult<ArrayD<f64>> {
        ArrayD::from_shape_vec(self.lons.raw_dim(), values).map_err(shape_error)
    }

    /// Distance from each site to the closest point of this mesh, depth
    /// included. Shaped like `sites`.
    pub fn get_min_distance(&self, sites: &Mesh) -> ArrayD<f64> {
        let (lons, lats, depths) = self.flat_coords();
        map_sites(sites, |lon, lat, depth| {
            geodetic::min_idx_dst(&lons, &lats, &depths, lon, lat, depth).1
        })
    }

    /// The point of this mesh closest to each site. Shaped like `sites`.
    pub fn get_closest_points(&self, sites: &Mesh) -> GeoResult<Mesh> {
        let (lons, lats, depths) = self.flat_coords();
        let idx = map_sites(sites, |lon, lat, depth| {
            geodetic::min_idx_dst(&lons, &lats, &depths, lon, lat, depth).0
        });
        let pick = |values: &[f64]| idx.mapv(|i| values[i]);
        let closest_depths = self.depths.as_ref().map(|_| pick(&depths));
        Mesh::new(pick(&lons), pick(&lats), closest_depths)
    }

    /// Surface distances between every pair of points of a one-dimensional
    /// mesh lying on the earth surface.
    pub fn get_distance_matrix(&self) -> GeoResult<Array2<f64>> {
        if self.lons.ndim() != 1 {
            return Err(GeoError::InvalidMesh(
                "distance matrix needs a one-dimensional mesh".into(),
            ));
        }
        if let Some(depths) = &self.depths {
            if depths.iter().any(|&d| d != 0.0) {
                return Err(GeoError::InvalidMesh(
                    "distance matrix needs all points on the earth surface".into(),
                ));
            }
        }
        let (lons, lats, _) = self.flat_coords();
        Ok(Array2::from_shape_fn((lons.len(), lons.len()), |(i, j)| {
            geodetic::geodetic_distance(lons[i], lats[i], lons[j], lats[j])
        }))
    }
}

impl ApproxEq for Mesh {
    fn approx_eq(&self, other: &Self) -> bool {
        let close = |a: &ArrayD<f64>, b: &ArrayD<f64>| {
            a.shape() == b.shape()
                && a.iter()
                    .zip(b.iter())
                    .all(|(x, y)| (x - y).abs() <= MESH_EQUALITY_TOLERANCE)
        };
        let depths_match = match (&self.depths, &other.depths) {
            (Some(a), Some(b)) => close(a, b),
            (None, None) => true,
            _ => false,
        };
        depths_match && close(&self.lons, &other.lons) && close(&self.lats, &other.lats)
    }
}

fn shape_error(err: ndarray::ShapeError) -> GeoError {
    GeoError::InvalidMesh(err.to_string())
}

// =============================================================================
// Rectangular Mesh
// =============================================================================

/// Cartesian vectors spanning the two triangles of every cell.
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// Position vector of every node.
    pub points: Array2<Vector3>,
    /// From each node to the next one in its row, shape `(rows, cols - 1)`.
    pub along_azimuth: Array2<Vector3>,
    /// From each node to the one above it, shape `(rows - 1, cols)`.
    pub updip: Array2<Vector3>,
    /// From the bottom-left to the top-right node of each cell.
    pub diag: Array2<Vector3>,
}

/// Per-cell geometry, each array shaped `(rows - 1, cols - 1)`.
#[derive(Debug, Clone)]
pub struct CellDimensions {
    pub centers: Array2<Vector3>,
    pub lengths: Array2<f64>,
    pub widths: Array2<f64>,
    pub areas: Array2<f64>,
}

/// A grid of points where rows run along strike and columns down dip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangularMesh {
    lons: Array2<f64>,
    lats: Array2<f64>,
    depths: Option<Array2<f64>>,
}

impl RectangularMesh {
    pub fn new(lons: Array2<f64>, lats: Array2<f64>, depths: Option<Array2<f64>>) -> GeoResult<Self> {
        // share validation with the generic mesh
        Mesh::new(
            lons.clone().into_dyn(),
            lats.clone().into_dyn(),
            depths.clone().map(|d| d.into_dyn()),
        )?;
        Ok(Self { lons, lats, depths })
    }

    /// Build from rows of points, all of the same length.
    pub fn from_points_list(rows: &[Vec<Point>]) -> GeoResult<Self> {
        let ncols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != ncols) {
            return Err(GeoError::InvalidMesh("rows have different lengths".into()));
        }
        let shape = (rows.len(), ncols);
        let at = |f: fn(&Point) -> f64| Array2::from_shape_fn(shape, |(r, c)| f(&rows[r][c]));
        let depths = at(|p| p.depth);
        let depths = if depths.iter().all(|&d| d == 0.0) {
            None
        } else {
            Some(depths)
        };
        Self::new(at(|p| p.longitude), at(|p| p.latitude), depths)
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.lons.dim()
    }

    pub fn lons(&self) -> &Array2<f64> {
        &self.lons
    }

    pub fn lats(&self) -> &Array2<f64> {
        &self.lats
    }

    pub fn depths(&self) -> Option<&Array2<f64>> {
        self.depths.as_ref()
    }

    pub fn point(&self, row: usize, col: usize) -> Point {
        let depth = self.depths.as_ref().map_or(0.0, |d| d[[row, col]]);
        Point::new(self.lons[[row, col]], self.lats[[row, col]], depth)
    }

    pub fn row(&self, row: usize) -> Vec<Point> {
        (0..self.shape().1).map(|c| self.point(row, c)).collect()
    }

    pub fn column(&self, col: usize) -> Vec<Point> {
        (0..self.shape().0).map(|r| self.point(r, col)).collect()
    }

    pub fn to_mesh(&self) -> Mesh {
        Mesh {
            lons: self.lons.clone().into_dyn(),
            lats: self.lats.clone().into_dyn(),
            depths: self.depths.clone().map(|d| d.into_dyn()),
        }
    }

    fn flat_lons_lats(&self) -> (Vec<f64>, Vec<f64>) {
        (
            self.lons.iter().copied().collect(),
            self.lats.iter().copied().collect(),
        )
    }

    pub fn get_min_distance(&self, sites: &Mesh) -> ArrayD<f64> {
        self.to_mesh().get_min_distance(sites)
    }

    pub fn get_closest_points(&self, sites: &Mesh) -> GeoResult<Mesh> {
        self.to_mesh().get_closest_points(sites)
    }

    /// Joyner-Boore distance with the default tolerances.
    pub fn get_joyner_boore_distance(&self, sites: &Mesh) -> GeoResult<ArrayD<f64>> {
        self.get_joyner_boore_distance_with(sites, &GeoConfig::default())
    }

    /// Distance from each site to the surface projection of the mesh; zero
    /// for sites above it.
    ///
    /// Surface distance to the nearest node is exact enough beyond
    /// `config.jb_threshold`. Closer sites are measured against the
    /// projected cell polygons instead.
    pub fn get_joyner_boore_distance_with(
        &self,
        sites: &Mesh,
        config: &GeoConfig,
    ) -> GeoResult<ArrayD<f64>> {
        let (lons, lats) = self.flat_lons_lats();
        let mut distances = map_sites(sites, |lon, lat, _| {
            geodetic::min_geodetic_distance(&lons, &lats, lon, lat)
        });
        if !distances.iter().any(|&d| d < config.jb_threshold) {
            return Ok(distances);
        }

        let footprint = Footprint::new(self)?;
        if footprint.degenerate {
            warn!(
                buffer_km = config.dist_tolerance,
                "mesh footprint has no area, buffering it"
            );
        }
        for ((dist, &lon), &lat) in distances
            .iter_mut()
            .zip(sites.lons().iter())
            .zip(sites.lats().iter())
        {
            if *dist < config.jb_threshold {
                let xy = footprint.proj.project(lon, lat)?;
                *dist = (footprint.distance(xy) - config.dist_tolerance).max(0.0);
            }
        }
        Ok(distances)
    }

    /// Node in the middle of the mesh, or the great-circle middle of the
    /// two or four nodes closest to the middle.
    pub fn get_middle_point(&self) -> Point {
        let (rows, _) = self.shape();
        let mid_row = rows / 2;
        if rows % 2 == 1 {
            self.row_middle_point(mid_row)
        } else {
            middle_of(&self.row_middle_point(mid_row - 1), &self.row_middle_point(mid_row))
        }
    }

    fn row_middle_point(&self, row: usize) -> Point {
        let (_, cols) = self.shape();
        let mid_col = cols / 2;
        if cols % 2 == 1 {
            self.point(row, mid_col)
        } else {
            middle_of(&self.point(row, mid_col - 1), &self.point(row, mid_col))
        }
    }

    pub fn triangulate(&self) -> Triangulation {
        let (rows, cols) = self.shape();
        let points = Array2::from_shape_fn((rows, cols), |(r, c)| self.point(r, c).to_cartesian());
        let along_azimuth = Array2::from_shape_fn((rows, cols.saturating_sub(1)), |(r, c)| {
            points[[r, c + 1]] - points[[r, c]]
        });
        let updip = Array2::from_shape_fn((rows.saturating_sub(1), cols), |(r, c)| {
            points[[r, c]] - points[[r + 1, c]]
        });
        let diag = Array2::from_shape_fn(
            (rows.saturating_sub(1), cols.saturating_sub(1)),
            |(r, c)| points[[r, c + 1]] - points[[r + 1, c]],
        );
        Triangulation {
            points,
            along_azimuth,
            updip,
            diag,
        }
    }

    fn require_cells(&self, what: &str) -> GeoResult<()> {
        let (rows, cols) = self.shape();
        if rows < 2 || cols < 2 {
            return Err(GeoError::InvalidMesh(format!(
                "{what} is only defined for a mesh of more than one row and more than one column"
            )));
        }
        Ok(())
    }

    /// Centroid, length along rows, width along columns and area of every
    /// cell, each cell split into a top-left and a bottom-right triangle.
    pub fn get_cell_dimensions(&self) -> GeoResult<CellDimensions> {
        self.require_cells("cell dimensions")?;
        let tri = self.triangulate();
        let (rows, cols) = self.shape();
        let shape = (rows - 1, cols - 1);

        let mut centers = Array2::from_elem(shape, Vector3::zeros());
        let mut lengths = Array2::zeros(shape);
        let mut widths = Array2::zeros(shape);
        let mut areas = Array2::zeros(shape);
        for r in 0..rows - 1 {
            for c in 0..cols - 1 {
                let top = tri.along_azimuth[[r, c]];
                let left = tri.updip[[r, c]];
                let bottom = tri.along_azimuth[[r + 1, c]];
                let right = tri.updip[[r, c + 1]];
                let diag = tri.diag[[r, c]];
                let tl_area = triangle_area(&top, &left, &diag);
                let br_area = triangle_area(&bottom, &right, &diag);
                let area = tl_area + br_area;

                let p = &tri.points;
                let tl_center = (p[[r, c]] + p[[r, c + 1]] + p[[r + 1, c]]) / 3.0;
                let br_center = (p[[r, c + 1]] + p[[r + 1, c]] + p[[r + 1, c + 1]]) / 3.0;
                if area > 0.0 {
                    centers[[r, c]] = (tl_center * tl_area + br_center * br_area) / area;
                    lengths[[r, c]] = (top.norm() * tl_area + bottom.norm() * br_area) / area;
                    widths[[r, c]] = (left.norm() * tl_area + right.norm() * br_area) / area;
                } else {
                    centers[[r, c]] = (tl_center + br_center) / 2.0;
                    lengths[[r, c]] = (top.norm() + bottom.norm()) / 2.0;
                    widths[[r, c]] = (left.norm() + right.norm()) / 2.0;
                }
                areas[[r, c]] = area;
            }
        }
        Ok(CellDimensions {
            centers,
            lengths,
            widths,
            areas,
        })
    }

    /// Area-weighted mean inclination in `[0, 90]` and azimuth in `[0, 360)`
    /// of the mesh triangles, both averaged as circular quantities.
    pub fn get_mean_inclination_and_azimuth(&self) -> GeoResult<(f64, f64)> {
        self.require_cells("inclination and azimuth")?;
        if let Some(depths) = &self.depths {
            let (rows, _) = self.shape();
            for r in 1..rows {
                let shallower = depths
                    .row(r)
                    .iter()
                    .zip(depths.row(r - 1).iter())
                    .any(|(below, above)| below < above);
                if shallower {
                    return Err(GeoError::InvalidMesh(
                        "each mesh row must be no shallower than the previous one".into(),
                    ));
                }
            }
        }

        let tri = self.triangulate();
        let (rows, cols) = self.shape();
        let up = tri.points.mapv(|p| normalized(&p));

        // per cell: (area, normal, along-strike edge, node) for both triangles
        let mut triangles = Vec::with_capacity(2 * (rows - 1) * (cols - 1));
        for r in 0..rows - 1 {
            for c in 0..cols - 1 {
                let diag = tri.diag[[r, c]];
                let (e1, e2) = (tri.along_azimuth[[r, c]], tri.updip[[r, c]]);
                triangles.push((triangle_area(&e1, &e2, &diag), normalized(&e1.cross(&e2)), e1, (r, c)));
                let (e1, e2) = (tri.along_azimuth[[r + 1, c]], tri.updip[[r, c + 1]]);
                triangles.push((
                    triangle_area(&e1, &e2, &diag),
                    normalized(&e1.cross(&e2)),
                    e1,
                    (r + 1, c + 1),
                ));
            }
        }

        let mut inclination = if self.depths.is_none() {
            0.0
        } else {
            let (xx, yy) = triangles.iter().fold((0.0, 0.0), |(xx, yy), (area, normal, _, node)| {
                let cos = up[*node].dot(normal).clamp(-1.0, 1.0);
                (xx + area * cos, yy + area * (1.0 - cos * cos).max(0.0).sqrt())
            });
            yy.atan2(xx).to_degrees()
        };

        let z_unit = Vector3::z();
        let (xx, yy) = triangles.iter().fold((0.0, 0.0), |(xx, yy), (area, _, edge, node)| {
            let p = tri.points[*node];
            // east- and north-pointing unit vectors tangent to the sphere
            let east = normalized(&(p + z_unit).cross(&p));
            let north = normalized(&p.cross(&east));
            let edge = normalized(edge);
            let sign = if edge.dot(&east) < 0.0 { -1.0 } else { 1.0 };
            let cos = edge.dot(&north);
            (xx + area * cos, yy + area * (1.0 - cos * cos).max(0.0).sqrt() * sign)
        });
        let mut azimuth = yy.atan2(xx).to_degrees();
        if azimuth < 0.0 {
            azimuth += 360.0;
        }
        // rounding noise on vertical surfaces must not reverse the azimuth
        if inclination > 90.0 + INCLINATION_NOISE {
            // keep the inclination in [0, 90] by facing the other way
            inclination = 180.0 - inclination;
            azimuth = (azimuth + 180.0) % 360.0;
        }
        Ok((inclination.min(90.0), azimuth))
    }

    /// Mean down-dip extent of the mesh, columns weighted by their mean
    /// cell length.
    pub fn get_mean_width(&self) -> GeoResult<f64> {
        let cells = self.get_cell_dimensions()?;
        let widths = cells.widths.sum_axis(Axis(0));
        let column_areas = cells.areas.sum_axis(Axis(0));
        let weighted_lengths = (&cells.lengths * &cells.areas).sum_axis(Axis(0));
        let mean_lengths = Zip::from(&weighted_lengths)
            .and(&column_areas)
            .map_collect(|&l, &a| if a > 0.0 { l / a } else { 0.0 });
        let total = mean_lengths.sum();
        if total <= 0.0 {
            return Ok(widths.mean().unwrap_or(0.0));
        }
        Ok((&widths * &mean_lengths).sum() / total)
    }
}

fn middle_of(p1: &Point, p2: &Point) -> Point {
    let (lon, lat) = get_middle_point(p1.longitude, p1.latitude, p2.longitude, p2.latitude);
    Point::new(lon, lat, (p1.depth + p2.depth) / 2.0)
}

/// Horizontal projection of a rectangular mesh: its cells as quadrilaterals,
/// or a polyline when the mesh is a single row or column.
struct Footprint {
    proj: OrthographicProjection,
    cells: Vec<[[f64; 2]; 4]>,
    outline: Vec<[f64; 2]>,
    degenerate: bool,
}

impl Footprint {
    fn new(mesh: &RectangularMesh) -> GeoResult<Self> {
        let (lons, lats) = mesh.flat_lons_lats();
        let proj = OrthographicProjection::new(projection::get_spherical_bounding_box(&lons, &lats)?);
        let (rows, cols) = mesh.shape();
        let xy = proj.project_all(&lons, &lats)?;
        let at = |r: usize, c: usize| xy[r * cols + c];

        if rows < 2 || cols < 2 {
            return Ok(Self {
                proj,
                cells: Vec::new(),
                outline: xy.clone(),
                degenerate: true,
            });
        }
        let mut cells = Vec::with_capacity((rows - 1) * (cols - 1));
        let mut area = 0.0;
        for r in 0..rows - 1 {
            for c in 0..cols - 1 {
                let cell = [at(r, c), at(r, c + 1), at(r + 1, c + 1), at(r + 1, c)];
                area += utils_2d::polygon_signed_area(&cell).abs();
                cells.push(cell);
            }
        }
        Ok(Self {
            proj,
            cells,
            outline: Vec::new(),
            degenerate: area < EPSILON,
        })
    }

    fn distance(&self, xy: [f64; 2]) -> f64 {
        if self.cells.is_empty() {
            return utils_2d::distance_to_polyline(&self.outline, xy);
        }
        self.cells
            .iter()
            .map(|cell| utils_2d::distance_to_polygon(cell, xy))
            .fold(f64::INFINITY, f64::min)
    }
}

// =============================================================================
// Downsampling
// =============================================================================

/// Column indices where the top-row direction changes by more than
/// `tolerance` degrees, always including the first and last columns.
fn find_turning_points(mesh: &RectangularMesh, tolerance: f64) -> Vec<usize> {
    let top = mesh.row(0);
    let azimuths: Vec<f64> = top.windows(2).map(|w| w[0].azimuth(&w[1])).collect();
    let mut idx = vec![0];
    if let Some(&first) = azimuths.first() {
        let mut reference = first;
        for (i, &az) in azimuths.iter().enumerate().skip(1) {
            if (az - reference).abs() > tolerance {
                idx.push(i);
                reference = az;
            }
        }
    }
    let last = top.len() - 1;
    if idx[idx.len() - 1] != last {
        idx.push(last);
    }
    idx
}

/// Simplified top edge: the top-row nodes where the trace turns.
pub fn downsample_trace(mesh: &RectangularMesh, tolerance: f64) -> Vec<Point> {
    find_turning_points(mesh, tolerance)
        .into_iter()
        .map(|c| mesh.point(0, c))
        .collect()
}

/// Keep only the mesh columns at which the top edge turns.
pub fn downsample_mesh(mesh: &RectangularMesh, tolerance: f64) -> GeoResult<RectangularMesh> {
    let idx = find_turning_points(mesh, tolerance);
    let (rows, _) = mesh.shape();
    let pick = |a: &Array2<f64>| Array2::from_shape_fn((rows, idx.len()), |(r, k)| a[[r, idx[k]]]);
    RectangularMesh::new(
        pick(&mesh.lons),
        pick(&mesh.lats),
        mesh.depths.as_ref().map(pick),
    )
}
