//! Chip family detection.

use std::fmt;

/// The device family, which toggles family-specific backend behavior.
///
/// The 7-series family scales route delay estimates by 3/2, has a cell
/// timing table, needs the clock pip blacklist and names its register clock
/// port `CK`. Everything else is treated as UltraScale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChipFamily {
    /// Xilinx 7-series.
    Xc7,
    /// Xilinx UltraScale and UltraScale+.
    UltraScale,
}

impl ChipFamily {
    /// Detects the family from a chip name.
    pub fn detect(chip_name: &str) -> Self {
        if chip_name.starts_with("xc7") {
            ChipFamily::Xc7
        } else {
            ChipFamily::UltraScale
        }
    }

    /// Returns `true` for the 7-series family.
    pub fn is_xc7(self) -> bool {
        self == ChipFamily::Xc7
    }
}

impl fmt::Display for ChipFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChipFamily::Xc7 => write!(f, "xc7"),
            ChipFamily::UltraScale => write!(f, "ultrascale"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_by_prefix() {
        assert_eq!(ChipFamily::detect("xc7a35tcsg324-1"), ChipFamily::Xc7);
        assert_eq!(ChipFamily::detect("xc7z020"), ChipFamily::Xc7);
        assert_eq!(ChipFamily::detect("xcku040"), ChipFamily::UltraScale);
        assert_eq!(ChipFamily::detect("xczu7ev"), ChipFamily::UltraScale);
    }

    #[test]
    fn prefix_must_be_at_start() {
        assert_eq!(ChipFamily::detect("my_xc7_clone"), ChipFamily::UltraScale);
    }
}
