//! Page geometry in PDF user-space points

/// Tolerance used when comparing page dimensions, in points
const SIZE_TOLERANCE: f32 = 0.01;

/// A page's visible rectangle (its MediaBox)
///
/// The coordinate system has its origin at the bottom-left of the page,
/// but `x0`/`y0` need not be zero for every document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x0: f32,
    pub y0: f32,
    pub width: f32,
    pub height: f32,
}

impl PageBox {
    /// Build a box from a `[llx lly urx ury]` rectangle, normalizing corner order
    pub fn from_corners(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self {
            x0: llx.min(urx),
            y0: lly.min(ury),
            width: (urx - llx).abs(),
            height: (ury - lly).abs(),
        }
    }

    /// US Letter size (8.5" × 11"), the fallback when a page declares no MediaBox
    pub fn letter() -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            width: 612.0,
            height: 792.0,
        }
    }

    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            width: 595.28,
            height: 841.89,
        }
    }

    /// Whether two boxes describe the same page area
    pub fn same_size(&self, other: &PageBox) -> bool {
        (self.width - other.width).abs() < SIZE_TOLERANCE
            && (self.height - other.height).abs() < SIZE_TOLERANCE
            && (self.x0 - other.x0).abs() < SIZE_TOLERANCE
            && (self.y0 - other.y0).abs() < SIZE_TOLERANCE
    }
}

impl Default for PageBox {
    fn default() -> Self {
        Self::letter()
    }
}
