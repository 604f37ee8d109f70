//! Faults described by a surface trace, a constant dip and the seismogenic
//! depth range.

use tracing::debug;

use super::base::{delegate_surface, FaultMesh};
use crate::geo::mesh::RectangularMesh;
use crate::geo::nodalplane::check_dip;
use crate::geo::{GeoError, GeoResult, Line, Point, SurfaceGeometryError};

/// A planar-dipping fault draped below a (possibly bent) trace.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleFaultSurface {
    surface: FaultMesh,
}

impl SimpleFaultSurface {
    /// Wrap an existing mesh, rows along strike.
    pub fn new(mesh: RectangularMesh) -> GeoResult<Self> {
        Ok(Self {
            surface: FaultMesh::new(mesh)?,
        })
    }

    /// Validate the parameters accepted by [`Self::from_fault_data`].
    pub fn check_fault_data(
        fault_trace: &Line,
        upper_seismogenic_depth: f64,
        lower_seismogenic_depth: f64,
        dip: f64,
        mesh_spacing: f64,
    ) -> GeoResult<()> {
        if fault_trace.len() < 2 {
            return Err(SurfaceGeometryError::TooFewTracePoints.into());
        }
        let trace_depth = fault_trace.first().depth;
        if fault_trace.points().iter().any(|p| p.depth != trace_depth) {
            return Err(SurfaceGeometryError::NonHorizontalTrace.into());
        }
        if fault_trace.is_self_intersecting()? {
            return Err(GeoError::SelfIntersectingTrace);
        }
        check_dip(dip)?;
        if lower_seismogenic_depth <= upper_seismogenic_depth {
            return Err(SurfaceGeometryError::InvalidSeismogenicDepths.into());
        }
        if upper_seismogenic_depth < trace_depth {
            return Err(SurfaceGeometryError::TraceBelowUpperDepth.into());
        }
        crate::geo::check_spacing(mesh_spacing)
    }

    /// Build the surface by projecting the resampled trace down dip to the
    /// upper and lower seismogenic depths, perpendicular to the overall
    /// trace direction, and filling each column at `mesh_spacing`.
    pub fn from_fault_data(
        fault_trace: &Line,
        upper_seismogenic_depth: f64,
        lower_seismogenic_depth: f64,
        dip: f64,
        mesh_spacing: f64,
    ) -> GeoResult<Self> {
        Self::check_fault_data(
            fault_trace,
            upper_seismogenic_depth,
            lower_seismogenic_depth,
            dip,
            mesh_spacing,
        )?;
        let mesh = RectangularMesh::from_points_list(&Self::mesh_rows(
            fault_trace,
            upper_seismogenic_depth,
            lower_seismogenic_depth,
            dip,
            mesh_spacing,
        )?)?;
        debug!(shape = ?mesh.shape(), dip, "simple fault mesh");
        Self::new(mesh)
    }

    fn mesh_rows(
        fault_trace: &Line,
        upper_seismogenic_depth: f64,
        lower_seismogenic_depth: f64,
        dip: f64,
        mesh_spacing: f64,
    ) -> GeoResult<Vec<Vec<Point>>> {
        let trace_depth = fault_trace.first().depth;
        let azimuth = (fault_trace.first().azimuth(&fault_trace.last()) + 90.0) % 360.0;
        let tan_dip = dip.to_radians().tan();
        let vdist_top = upper_seismogenic_depth - trace_depth;
        let vdist_bottom = lower_seismogenic_depth - trace_depth;
        let (hdist_top, hdist_bottom) = (vdist_top / tan_dip, vdist_bottom / tan_dip);

        let columns: Vec<Vec<Point>> = fault_trace
            .resample(mesh_spacing)?
            .points()
            .iter()
            .map(|p| {
                let top = p.point_at(hdist_top, vdist_top, azimuth);
                let bottom = p.point_at(hdist_bottom, vdist_bottom, azimuth);
                top.equally_spaced_points(&bottom, mesh_spacing)
            })
            .collect();
        let nrows = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != nrows) {
            return Err(GeoError::InvalidMesh(
                "down-dip columns have different lengths".into(),
            ));
        }
        Ok((0..nrows)
            .map(|r| columns.iter().map(|column| column[r]).collect())
            .collect())
    }

    pub fn surface(&self) -> &FaultMesh {
        &self.surface
    }

    pub fn mesh(&self) -> &RectangularMesh {
        self.surface.mesh()
    }
}

delegate_surface!(SimpleFaultSurface, surface);
