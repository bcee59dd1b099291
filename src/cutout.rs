//! Placement of the square cutout reserved for a logo in the middle of the code.

use crate::VIEWPORT_SIZE;

/// Fraction of the grid, per side of the center module, given over to the cutout.
pub const CUTOUT_FACTOR: f64 = 0.18;

/// Extra viewport units added to the cutout so the mask never leaves a hairline gap.
pub const CUTOUT_MARGIN: f64 = 2.0;

/// The centered cutout square, in viewport units.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CutoutRegion {
    /// Width and height of the cutout.
    pub size: f64,
    /// Offset of the cutout from the top-left corner, on both axes.
    pub position: f64,
    /// Number of modules the cutout spans per side. Always odd.
    pub modules: usize,
}

impl CutoutRegion {
    /// Computes the cutout for a grid of `module_count` modules per side.
    ///
    /// The span is `2 * floor(module_count * 0.18) - 1` modules, never less than one, so the
    /// region stays aligned to the module grid and symmetric around the center module. An
    /// empty grid yields an empty region at the center of the viewport.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qirust_rounded::cutout::CutoutRegion;
    ///
    /// let region = CutoutRegion::compute(25);
    /// assert_eq!(region.modules, 7);
    /// assert_eq!(region.size, 282.0);
    /// assert_eq!(region.position, 359.0);
    /// ```
    pub fn compute(module_count: usize) -> Self {
        if module_count == 0 {
            return Self {
                size: 0.0,
                position: VIEWPORT_SIZE / 2.0,
                modules: 0,
            };
        }

        let module_width = VIEWPORT_SIZE / module_count as f64;
        let half = (module_count as f64 * CUTOUT_FACTOR).floor() as usize;
        let modules = (2 * half).saturating_sub(1).max(1);
        let size = module_width * modules as f64 + CUTOUT_MARGIN;
        Self {
            size,
            position: (VIEWPORT_SIZE - size) / 2.0,
            modules,
        }
    }
}
