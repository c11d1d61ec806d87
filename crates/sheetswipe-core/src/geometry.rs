//! Host-supplied sheet geometry.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Measured size of the sheet, read-only input to every percent-of-height threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetGeometry {
    height_px: f64,
}

impl SheetGeometry {
    /// Build geometry from a measured height. Heights must be finite and positive,
    /// otherwise every `abs(dy) / height` ratio downstream is meaningless.
    pub fn new(height_px: f64) -> Result<Self> {
        if !height_px.is_finite() || height_px <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "sheet height must be a positive finite number, got {}",
                height_px
            )));
        }
        Ok(Self { height_px })
    }

    #[inline]
    pub fn height_px(&self) -> f64 {
        self.height_px
    }

    /// Fraction of the sheet height covered by a drag of `dy` pixels.
    #[inline]
    pub fn percent_dragged(&self, dy: f64) -> f64 {
        percent_dragged(dy, self.height_px)
    }
}

/// `abs(dy) / sheet_height`, the scale-invariant distance metric.
///
/// A degenerate height yields 0.0 so that no percentage threshold can fire.
#[inline]
pub fn percent_dragged(dy: f64, sheet_height: f64) -> f64 {
    if sheet_height <= 0.0 || !sheet_height.is_finite() {
        return 0.0;
    }
    dy.abs() / sheet_height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_heights() {
        assert!(SheetGeometry::new(0.0).is_err());
        assert!(SheetGeometry::new(-10.0).is_err());
        assert!(SheetGeometry::new(f64::NAN).is_err());
        assert!(SheetGeometry::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_percent_dragged() {
        let geometry = SheetGeometry::new(600.0).unwrap();
        assert!((geometry.percent_dragged(60.0) - 0.1).abs() < 1e-9);
        assert!((geometry.percent_dragged(-60.0) - 0.1).abs() < 1e-9);
        assert_eq!(percent_dragged(50.0, 0.0), 0.0);
    }
}
