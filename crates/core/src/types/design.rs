//! Placement parameters for the custom-design compositor.

use serde::{Deserialize, Serialize};

/// Errors for out-of-range design transform parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DesignTransformError {
    /// Scale percentage outside the slider range.
    #[error("scale must be between {min} and {max} percent (got {got})")]
    ScaleOutOfRange { min: u32, max: u32, got: u32 },
    /// Rotation outside [0, 360).
    #[error("rotation must be in [0, 360) degrees")]
    RotationOutOfRange,
    /// Offset outside the bounded placement area.
    #[error("offset must be between -{bound} and {bound} display units (got {got})")]
    OffsetOutOfRange { bound: i32, got: i32 },
}

/// How a user logo is placed on the garment canvas.
///
/// - `scale` is a percentage of the nominal overlay size, 50-150.
/// - `rotation` is degrees clockwise about the overlay centre, `[0, 360)`.
/// - `x`/`y` are display-unit offsets from the canvas centre, each bounded
///   to ±50.
///
/// Parameters arrive from clients, so the struct deserializes freely and is
/// checked with [`DesignTransform::validate`] before any compositing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignTransform {
    pub scale: u32,
    pub rotation: f32,
    pub x: i32,
    pub y: i32,
}

impl DesignTransform {
    /// Minimum scale percentage.
    pub const MIN_SCALE: u32 = 50;
    /// Maximum scale percentage.
    pub const MAX_SCALE: u32 = 150;
    /// Offset bound in display units, applied to both axes.
    pub const OFFSET_BOUND: i32 = 50;

    /// A validated transform.
    ///
    /// # Errors
    ///
    /// Returns [`DesignTransformError`] if any parameter is outside its range.
    pub fn new(scale: u32, rotation: f32, x: i32, y: i32) -> Result<Self, DesignTransformError> {
        let transform = Self {
            scale,
            rotation,
            x,
            y,
        };
        transform.validate()?;
        Ok(transform)
    }

    /// The identity placement: 100% scale, no rotation, centred.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            scale: 100,
            rotation: 0.0,
            x: 0,
            y: 0,
        }
    }

    /// Check all parameters against their ranges.
    ///
    /// # Errors
    ///
    /// Returns the first [`DesignTransformError`] encountered.
    pub fn validate(&self) -> Result<(), DesignTransformError> {
        if !(Self::MIN_SCALE..=Self::MAX_SCALE).contains(&self.scale) {
            return Err(DesignTransformError::ScaleOutOfRange {
                min: Self::MIN_SCALE,
                max: Self::MAX_SCALE,
                got: self.scale,
            });
        }
        if !self.rotation.is_finite() || self.rotation < 0.0 || self.rotation >= 360.0 {
            return Err(DesignTransformError::RotationOutOfRange);
        }
        for offset in [self.x, self.y] {
            if offset.abs() > Self::OFFSET_BOUND {
                return Err(DesignTransformError::OffsetOutOfRange {
                    bound: Self::OFFSET_BOUND,
                    got: offset,
                });
            }
        }
        Ok(())
    }
}

impl Default for DesignTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_valid() {
        assert!(DesignTransform::identity().validate().is_ok());
    }

    #[test]
    fn test_boundary_values() {
        assert!(DesignTransform::new(50, 0.0, -50, 50).is_ok());
        assert!(DesignTransform::new(150, 359.9, 50, -50).is_ok());
    }

    #[test]
    fn test_scale_out_of_range() {
        assert!(matches!(
            DesignTransform::new(49, 0.0, 0, 0),
            Err(DesignTransformError::ScaleOutOfRange { got: 49, .. })
        ));
        assert!(matches!(
            DesignTransform::new(151, 0.0, 0, 0),
            Err(DesignTransformError::ScaleOutOfRange { got: 151, .. })
        ));
    }

    #[test]
    fn test_rotation_out_of_range() {
        assert!(matches!(
            DesignTransform::new(100, 360.0, 0, 0),
            Err(DesignTransformError::RotationOutOfRange)
        ));
        assert!(matches!(
            DesignTransform::new(100, -1.0, 0, 0),
            Err(DesignTransformError::RotationOutOfRange)
        ));
        assert!(matches!(
            DesignTransform::new(100, f32::NAN, 0, 0),
            Err(DesignTransformError::RotationOutOfRange)
        ));
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(matches!(
            DesignTransform::new(100, 0.0, 51, 0),
            Err(DesignTransformError::OffsetOutOfRange { got: 51, .. })
        ));
        assert!(matches!(
            DesignTransform::new(100, 0.0, 0, -51),
            Err(DesignTransformError::OffsetOutOfRange { got: -51, .. })
        ));
    }

    #[test]
    fn test_serde_field_names() {
        let transform = DesignTransform::new(120, 45.0, 10, -5).expect("valid");
        let json = serde_json::to_value(transform).expect("serialize");
        assert_eq!(json["scale"], 120);
        assert_eq!(json["x"], 10);
        let back: DesignTransform = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, transform);
    }
}
