#![deny(bare_trait_objects)]
#![allow(clippy::float_cmp)]

//! Scan conversion of line sink commands into coverage masks.
//!
//! The [`Renderer`](struct.Renderer.html) is a terminal [`LineSink`](../linework_path/trait.LineSink.html):
//! it accumulates the edges it receives and [`rasterize`](struct.Renderer.html#method.rasterize)
//! turns them into an 8 bit [`AlphaMask`](struct.AlphaMask.html) using the configured
//! [`FillRule`](../linework_path/enum.FillRule.html).
//!
//! Sub-paths are filled as if they were closed, whether or not they end with a `close`.
//!
//! # Examples
//!
//! ```
//! use linework_path::LineSink;
//! use linework_path::math::point;
//! use linework_raster::{RasterOptions, Renderer};
//!
//! let mut renderer = Renderer::new(4, 4, RasterOptions::default());
//!
//! renderer.move_to(point(1.0, 1.0)).unwrap();
//! renderer.line_to(point(3.0, 1.0)).unwrap();
//! renderer.line_to(point(3.0, 3.0)).unwrap();
//! renderer.line_to(point(1.0, 3.0)).unwrap();
//! renderer.end().unwrap();
//!
//! let mask = renderer.rasterize();
//! assert_eq!(mask.get(0, 0), 0);
//! assert_eq!(mask.get(1, 1), 255);
//! assert_eq!(mask.get(2, 2), 255);
//! ```

pub extern crate linework_path as path;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod mask;
mod renderer;

pub use crate::mask::AlphaMask;
pub use crate::path::math;
pub use crate::path::FillRule;
pub use crate::renderer::{Edge, Renderer};

/// Parameters for the renderer.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct RasterOptions {
    /// See the SVG specification.
    ///
    /// Default value: `FillRule::NonZero`.
    pub fill_rule: FillRule,

    /// Number of sample rows per pixel row.
    ///
    /// Coverage is exact horizontally, this controls the vertical precision.
    ///
    /// Default value: `RasterOptions::DEFAULT_SUBPIXEL_ROWS`.
    pub subpixel_rows: u32,
}

impl RasterOptions {
    pub const DEFAULT_FILL_RULE: FillRule = FillRule::NonZero;
    pub const DEFAULT_SUBPIXEL_ROWS: u32 = 4;

    pub const DEFAULT: Self = RasterOptions {
        fill_rule: Self::DEFAULT_FILL_RULE,
        subpixel_rows: Self::DEFAULT_SUBPIXEL_ROWS,
    };

    #[inline]
    pub fn even_odd() -> Self {
        Self::DEFAULT.with_fill_rule(FillRule::EvenOdd)
    }

    #[inline]
    pub fn non_zero() -> Self {
        Self::DEFAULT.with_fill_rule(FillRule::NonZero)
    }

    #[inline]
    pub const fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }

    #[inline]
    pub fn with_subpixel_rows(mut self, rows: u32) -> Self {
        assert!(rows > 0);
        self.subpixel_rows = rows;
        self
    }
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn raster_options_builder() {
    let options = RasterOptions::even_odd().with_subpixel_rows(16);
    assert_eq!(options.fill_rule, FillRule::EvenOdd);
    assert_eq!(options.subpixel_rows, 16);
    assert_eq!(RasterOptions::non_zero(), RasterOptions::default());
}

#[test]
#[should_panic]
fn zero_subpixel_rows() {
    let _ = RasterOptions::default().with_subpixel_rows(0);
}
