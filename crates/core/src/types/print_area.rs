//! Printable rectangle inside a product's template image.

use serde::{Deserialize, Serialize};

/// Errors produced by [`PrintArea::validate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PrintAreaError {
    /// `x` or `y` is negative.
    #[error("print area origin must not be negative")]
    NegativeOrigin,
    /// Width or height is zero or negative.
    #[error("print area width and height must be positive")]
    EmptyArea,
    /// The rectangle extends past the template image.
    #[error("print area ({right}x{bottom}) exceeds the template image ({width}x{height})")]
    OutOfBounds {
        /// Right edge of the rectangle.
        right: i64,
        /// Bottom edge of the rectangle.
        bottom: i64,
        /// Template image width.
        width: u32,
        /// Template image height.
        height: u32,
    },
}

/// Printable area in template-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintArea {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PrintArea {
    /// Column defaults for a product created outside the admin form.
    pub const COLUMN_DEFAULT: Self = Self::new(150, 200, 300, 400);

    /// Defaults offered by the admin "create product" form.
    pub const FORM_DEFAULT: Self = Self::new(270, 210, 300, 360);

    /// Create a print area.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check the rectangle's geometry and, when the template image size is
    /// known, that it lies entirely within the image.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self, template_size: Option<(u32, u32)>) -> Result<(), PrintAreaError> {
        if self.x < 0 || self.y < 0 {
            return Err(PrintAreaError::NegativeOrigin);
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(PrintAreaError::EmptyArea);
        }

        if let Some((width, height)) = template_size {
            let right = i64::from(self.x) + i64::from(self.width);
            let bottom = i64::from(self.y) + i64::from(self.height);
            if right > i64::from(width) || bottom > i64::from(height) {
                return Err(PrintAreaError::OutOfBounds {
                    right,
                    bottom,
                    width,
                    height,
                });
            }
        }

        Ok(())
    }
}

impl Default for PrintArea {
    fn default() -> Self {
        Self::COLUMN_DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid_geometry() {
        assert!(PrintArea::COLUMN_DEFAULT.validate(None).is_ok());
        assert!(PrintArea::FORM_DEFAULT.validate(None).is_ok());
    }

    #[test]
    fn test_negative_origin() {
        let area = PrintArea::new(-1, 0, 10, 10);
        assert_eq!(area.validate(None), Err(PrintAreaError::NegativeOrigin));
    }

    #[test]
    fn test_empty_area() {
        let area = PrintArea::new(0, 0, 0, 10);
        assert_eq!(area.validate(None), Err(PrintAreaError::EmptyArea));
    }

    #[test]
    fn test_fits_exactly() {
        let area = PrintArea::new(100, 100, 500, 500);
        assert!(area.validate(Some((600, 600))).is_ok());
    }

    #[test]
    fn test_out_of_bounds() {
        let area = PrintArea::new(270, 210, 300, 360);
        assert!(matches!(
            area.validate(Some((500, 500))),
            Err(PrintAreaError::OutOfBounds {
                right: 570,
                bottom: 570,
                ..
            })
        ));
    }

    #[test]
    fn test_no_overflow_near_i32_max() {
        let area = PrintArea::new(i32::MAX, 0, i32::MAX, 1);
        assert!(area.validate(Some((u32::MAX, 10))).is_ok());
    }
}
