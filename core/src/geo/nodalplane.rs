//! Range checks for fault plane orientation angles.

use super::SurfaceGeometryError;

/// Strike must lie in `[0, 360)`.
pub fn check_strike(strike: f64) -> Result<(), SurfaceGeometryError> {
    if (0.0..360.0).contains(&strike) {
        Ok(())
    } else {
        Err(SurfaceGeometryError::StrikeOutOfRange { value: strike })
    }
}

/// Dip must lie in `(0, 90]`.
pub fn check_dip(dip: f64) -> Result<(), SurfaceGeometryError> {
    if dip > 0.0 && dip <= 90.0 {
        Ok(())
    } else {
        Err(SurfaceGeometryError::DipOutOfRange { value: dip })
    }
}
