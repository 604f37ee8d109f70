//! Faults described by a sequence of edges from the top of the rupture to
//! its bottom.

use tracing::debug;

use super::base::{delegate_surface, FaultMesh};
use crate::geo::mesh::RectangularMesh;
use crate::geo::{check_spacing, GeoResult, Line, Point, SurfaceGeometryError};

/// Number of mesh nodes along a mean extent of `length` km.
pub(super) fn node_count(length: f64, spacing: f64, extent: &'static str) -> GeoResult<usize> {
    let count = (length / spacing).round_ties_even() + 1.0;
    if count <= 1.0 {
        return Err(SurfaceGeometryError::SpacingTooCoarse {
            spacing,
            extent,
            length,
        }
        .into());
    }
    Ok(count as usize)
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len() as f64;
    values.sum::<f64>() / n
}

/// A fault whose geometry varies freely with depth, meshed between its
/// edges.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexFaultSurface {
    surface: FaultMesh,
}

impl ComplexFaultSurface {
    pub fn new(mesh: RectangularMesh) -> GeoResult<Self> {
        Ok(Self {
            surface: FaultMesh::new(mesh)?,
        })
    }

    /// Validate the parameters accepted by [`Self::from_fault_data`]: at
    /// least two edges of at least two points each, sorted from the
    /// shallowest to the deepest by mean depth, and a positive spacing.
    pub fn check_fault_data(edges: &[Line], mesh_spacing: f64) -> GeoResult<()> {
        if edges.len() < 2 {
            return Err(SurfaceGeometryError::TooFewEdges.into());
        }
        if let Some(index) = edges.iter().position(|edge| edge.len() < 2) {
            return Err(SurfaceGeometryError::TooFewEdgePoints { index }.into());
        }
        let mean_depths: Vec<f64> = edges
            .iter()
            .map(|edge| mean(edge.points().iter().map(|p| p.depth)))
            .collect();
        if mean_depths.windows(2).any(|w| w[1] < w[0]) {
            return Err(SurfaceGeometryError::EdgesInWrongOrder.into());
        }
        check_spacing(mesh_spacing)
    }

    /// Mesh the surface between `edges`.
    ///
    /// Every edge is resampled to the same number of nodes, chosen from
    /// the mean edge length. Matching nodes are joined top to bottom and
    /// those lines resampled again from the mean width.
    pub fn from_fault_data(edges: &[Line], mesh_spacing: f64) -> GeoResult<Self> {
        Self::check_fault_data(edges, mesh_spacing)?;

        let mean_length = mean(edges.iter().map(Line::get_length));
        let num_hor = node_count(mean_length, mesh_spacing, "length")?;
        let resampled = edges
            .iter()
            .map(|edge| edge.resample_to_num_points(num_hor))
            .collect::<GeoResult<Vec<_>>>()?;

        let vertical = (0..num_hor)
            .map(|c| Line::new(resampled.iter().map(|edge| edge.points()[c]).collect()))
            .collect::<GeoResult<Vec<_>>>()?;
        let mean_width = mean(vertical.iter().map(Line::get_length));
        let num_vert = node_count(mean_width, mesh_spacing, "width")?;
        let columns = vertical
            .iter()
            .map(|line| line.resample_to_num_points(num_vert))
            .collect::<GeoResult<Vec<_>>>()?;

        let rows: Vec<Vec<Point>> = (0..num_vert)
            .map(|r| columns.iter().map(|column| column.points()[r]).collect())
            .collect();
        let mesh = RectangularMesh::from_points_list(&rows)?;
        debug!(shape = ?mesh.shape(), mean_length, mean_width, "complex fault mesh");
        Self::new(mesh)
    }

    pub fn surface(&self) -> &FaultMesh {
        &self.surface
    }

    pub fn mesh(&self) -> &RectangularMesh {
        self.surface.mesh()
    }
}

delegate_surface!(ComplexFaultSurface, surface);
