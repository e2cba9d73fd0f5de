#![deny(bare_trait_objects)]

//! Draw 2D paths through a line sink protocol.
//!
//! Path producers, pass-through sinks and terminal sinks communicate through the
//! [`LineSink`](path/trait.LineSink.html) trait: a small set of commands (`move_to`,
//! `line_to`, `close`, `end`, the `line_join` hint and `dispose`) with a well defined
//! state machine. This crate reexports the crates that implement the protocol's
//! participants:
//!
//! - [path](path/index.html): the protocol itself, the state machine shared by all sinks,
//!   the [`Flattener`](path/flatten/struct.Flattener.html) that turns curves into line
//!   segments, recording and transforming sinks and the sink pool.
//! - [stroke](stroke/index.html): the [`Stroker`](stroke/struct.Stroker.html), which turns
//!   the center line of a path into the outline of its stroke.
//! - [raster](raster/index.html): the [`Renderer`](raster/struct.Renderer.html), which
//!   scan converts the commands it receives into a coverage mask.
//!
//! The [`Canvas`](struct.Canvas.html) wires them together.
//!
//! # Examples
//!
//! ```
//! use linework::math::point;
//! use linework::raster::RasterOptions;
//! use linework::stroke::StrokeOptions;
//! use linework::Canvas;
//!
//! let canvas = Canvas::new(16, 16);
//!
//! let fill = canvas.fill(&RasterOptions::default(), |path| {
//!     path.move_to(point(2.0, 2.0))?;
//!     path.line_to(point(14.0, 2.0))?;
//!     path.quadratic_bezier_to(point(14.0, 14.0), point(2.0, 14.0))?;
//!     path.close()
//! }).unwrap();
//!
//! let stroke = canvas.stroke(&StrokeOptions::default().with_line_width(2.0), |path| {
//!     path.move_to(point(2.0, 8.0))?;
//!     path.line_to(point(14.0, 8.0))
//! }).unwrap();
//!
//! assert_eq!(fill.get(8, 4), 255);
//! assert_eq!(stroke.get(8, 7), 255);
//! assert_eq!(stroke.get(8, 4), 0);
//! ```

pub extern crate linework_path;
pub extern crate linework_raster;
pub extern crate linework_stroke;

pub use linework_path as path;
pub use linework_raster as raster;
pub use linework_stroke as stroke;
pub use path::geom;

pub use path::math;

mod canvas;

pub use crate::canvas::Canvas;

use crate::path::{Flattener, SinkError, SinkResult};
use crate::raster::{AlphaMask, RasterOptions, Renderer};
use crate::stroke::{StrokeOptions, Stroker};

/// Fills a path into a new `width` x `height` mask.
///
/// Shorthand for `Canvas::new(width, height).fill(options, draw)`. Use a
/// [`Canvas`](struct.Canvas.html) to reuse the renderer's memory across paths.
pub fn fill_path<F>(
    width: u32,
    height: u32,
    options: &RasterOptions,
    draw: F,
) -> Result<AlphaMask, SinkError>
where
    F: FnOnce(&mut Flattener<&mut Renderer>) -> SinkResult,
{
    Canvas::new(width, height).fill(options, draw)
}

/// Strokes a path into a new `width` x `height` mask.
///
/// Shorthand for `Canvas::new(width, height).stroke(options, draw)`.
pub fn stroke_path<F>(
    width: u32,
    height: u32,
    options: &StrokeOptions,
    draw: F,
) -> Result<AlphaMask, SinkError>
where
    F: FnOnce(&mut Flattener<Stroker<&mut Renderer>>) -> SinkResult,
{
    Canvas::new(width, height).stroke(options, draw)
}
