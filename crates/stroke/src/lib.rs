#![deny(bare_trait_objects)]
#![allow(clippy::float_cmp)]

//! Stroke outline generation on top of the line sink protocol.
//!
//! The [`Stroker`](struct.Stroker.html) is a [`LineSink`](../linework_path/trait.LineSink.html)
//! that receives the commands describing the center line of a path and emits the outline
//! of the stroked shape, as closed polygons, into another sink. The outline is meant to be
//! filled with the `NonZero` fill rule: inner joins overlap with the rest of the shape.
//!
//! ## Joins
//!
//! Consecutive segments are simply connected unless the producer sent a `line_join` hint
//! between them, in which case the configured [`LineJoin`](enum.LineJoin.html) is built on
//! the outer side of the corner. The flattener sends these hints at the boundaries of the
//! input path's segments and not between the chords of a flattened curve.
//!
//! ## Caps
//!
//! Open sub-paths get caps at both ends once it is known that no more segments are coming,
//! that is on `move_to` or `end`. Closed sub-paths get no caps.
//!
//! # Examples
//!
//! ```
//! use linework_path::{LineSink, Recorder};
//! use linework_path::math::point;
//! use linework_stroke::{LineCap, StrokeOptions, Stroker};
//!
//! let options = StrokeOptions::default()
//!     .with_line_width(2.0)
//!     .with_line_cap(LineCap::Round);
//! let mut stroker = Stroker::new(Recorder::new(), options);
//!
//! stroker.move_to(point(0.0, 0.0)).unwrap();
//! stroker.line_to(point(10.0, 0.0)).unwrap();
//! stroker.line_join().unwrap();
//! stroker.line_to(point(10.0, 10.0)).unwrap();
//! stroker.end().unwrap();
//!
//! let outline = stroker.into_inner();
//! assert!(outline.segments().len() > 6);
//! ```

pub extern crate linework_path as path;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod stroker;

pub use crate::path::math;
pub use crate::stroker::Stroker;

/// Line cap as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinecapProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineCap {
    /// The stroke for each sub-path does not extend beyond its two endpoints.
    /// A zero length sub-path will therefore not have any stroke.
    Butt,
    /// At the end of each sub-path, the shape representing the stroke will be
    /// extended by a rectangle with the same width as the stroke width and
    /// whose length is half of the stroke width. If a sub-path has zero length,
    /// then the resulting effect is that the stroke for that sub-path consists
    /// solely of a square with side length equal to the stroke width, centered
    /// at the sub-path's point.
    Square,
    /// At each end of each sub-path, the shape representing the stroke will be
    /// extended by a half circle with a radius equal to the stroke width.
    /// If a sub-path has zero length, then the resulting effect is that the
    /// stroke for that sub-path consists solely of a full circle centered at
    /// the sub-path's point.
    Round,
}

/// Line join as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinejoinProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineJoin {
    /// A sharp corner is to be used to join path segments.
    /// Falls back to `Bevel` when the miter is longer than the miter limit.
    Miter,
    /// A round corner is to be used to join path segments.
    Round,
    /// A bevelled corner is to be used to join path segments.
    /// The bevel shape is a triangle that fills the area between the two stroked
    /// segments.
    Bevel,
}

/// Parameters for the stroker.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct StrokeOptions {
    /// What cap to use at the start of each sub-path.
    ///
    /// Also used for zero-length sub-paths.
    ///
    /// Default value: `LineCap::Butt`.
    pub start_cap: LineCap,

    /// What cap to use at the end of each sub-path.
    ///
    /// Default value: `LineCap::Butt`.
    pub end_cap: LineCap,

    /// See the SVG specification.
    ///
    /// Only applied where the input has a `line_join` hint.
    ///
    /// Default value: `LineJoin::Miter`.
    pub line_join: LineJoin,

    /// Line width
    ///
    /// Default value: `StrokeOptions::DEFAULT_LINE_WIDTH`.
    pub line_width: f32,

    /// See the SVG specification.
    ///
    /// Must be greater than or equal to 1.0.
    /// Default value: `StrokeOptions::DEFAULT_MITER_LIMIT`.
    pub miter_limit: f32,

    /// Maximum allowed distance between round joins and caps and the arcs
    /// they approximate.
    ///
    /// Default value: `StrokeOptions::DEFAULT_TOLERANCE`.
    pub tolerance: f32,
}

impl StrokeOptions {
    /// Minimum miter limit as defined by the SVG specification.
    ///
    /// See [StrokeMiterLimitProperty](https://svgwg.org/specs/strokes/#StrokeMiterlimitProperty)
    pub const MINIMUM_MITER_LIMIT: f32 = 1.0;
    /// Default miter limit as defined by the SVG specification.
    ///
    /// See [StrokeMiterLimitProperty](https://svgwg.org/specs/strokes/#StrokeMiterlimitProperty)
    pub const DEFAULT_MITER_LIMIT: f32 = 4.0;
    pub const DEFAULT_LINE_CAP: LineCap = LineCap::Butt;
    pub const DEFAULT_LINE_JOIN: LineJoin = LineJoin::Miter;
    pub const DEFAULT_LINE_WIDTH: f32 = 1.0;
    pub const DEFAULT_TOLERANCE: f32 = 0.1;

    pub const DEFAULT: Self = StrokeOptions {
        start_cap: Self::DEFAULT_LINE_CAP,
        end_cap: Self::DEFAULT_LINE_CAP,
        line_join: Self::DEFAULT_LINE_JOIN,
        line_width: Self::DEFAULT_LINE_WIDTH,
        miter_limit: Self::DEFAULT_MITER_LIMIT,
        tolerance: Self::DEFAULT_TOLERANCE,
    };

    #[inline]
    pub fn tolerance(tolerance: f32) -> Self {
        Self::DEFAULT.with_tolerance(tolerance)
    }

    #[inline]
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        assert!(tolerance.is_finite() && tolerance > 0.0);
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub const fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.start_cap = cap;
        self.end_cap = cap;
        self
    }

    #[inline]
    pub const fn with_start_cap(mut self, cap: LineCap) -> Self {
        self.start_cap = cap;
        self
    }

    #[inline]
    pub const fn with_end_cap(mut self, cap: LineCap) -> Self {
        self.end_cap = cap;
        self
    }

    #[inline]
    pub const fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    #[inline]
    pub fn with_line_width(mut self, width: f32) -> Self {
        assert!(width.is_finite() && width >= 0.0);
        self.line_width = width;
        self
    }

    #[inline]
    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        assert!(limit >= Self::MINIMUM_MITER_LIMIT);
        self.miter_limit = limit;
        self
    }
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn stroke_options_builder() {
    let options = StrokeOptions::tolerance(0.5)
        .with_line_width(3.0)
        .with_start_cap(LineCap::Round)
        .with_end_cap(LineCap::Square)
        .with_line_join(LineJoin::Bevel)
        .with_miter_limit(2.0);

    assert_eq!(options.tolerance, 0.5);
    assert_eq!(options.line_width, 3.0);
    assert_eq!(options.start_cap, LineCap::Round);
    assert_eq!(options.end_cap, LineCap::Square);
    assert_eq!(options.line_join, LineJoin::Bevel);
    assert_eq!(options.miter_limit, 2.0);
    assert_eq!(StrokeOptions::default(), StrokeOptions::DEFAULT);
}

#[test]
#[should_panic]
fn miter_limit_below_minimum() {
    let _ = StrokeOptions::default().with_miter_limit(0.5);
}
