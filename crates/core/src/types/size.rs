//! Garment size chosen in the customiser.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Size label attached to a saved design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GarmentSize {
    S,
    M,
    L,
    XL,
}

impl GarmentSize {
    /// Sizes offered in the customiser, smallest first.
    pub const ALL: [Self; 4] = [Self::S, Self::M, Self::L, Self::XL];

    /// Parse a size submitted by the customiser form.
    ///
    /// Anything outside the offered sizes (including an empty string) yields
    /// `None`; the design is then saved without a size.
    #[must_use]
    pub fn from_form(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "S" => Some(Self::S),
            "M" => Some(Self::M),
            "L" => Some(Self::L),
            "XL" => Some(Self::XL),
            _ => None,
        }
    }

    /// Stored label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::XL => "XL",
        }
    }
}

impl fmt::Display for GarmentSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_form() {
        assert_eq!(GarmentSize::from_form("xl"), Some(GarmentSize::XL));
        assert_eq!(GarmentSize::from_form(" M "), Some(GarmentSize::M));
        assert_eq!(GarmentSize::from_form(""), None);
        assert_eq!(GarmentSize::from_form("XXL"), None);
    }
}
