#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]

//! The line sink protocol.
//!
//! A [`LineSink`](sink/trait.LineSink.html) receives a sequence of straight line drawing
//! commands: `move_to`, `line_to`, `close`, `end`, plus the `line_join` hint and the
//! `dispose` teardown call. Producers such as the [`Flattener`](flatten/struct.Flattener.html)
//! drive a sink, pass-through sinks such as the stroker transform the stream and forward it,
//! and terminal sinks such as the renderer accumulate it.
//!
//! This crate is reexported in [linework](https://docs.rs/linework/).
//!
//! # Examples
//!
//! ```
//! use linework_path::{Command, Recorder, LineSink};
//! use linework_path::math::point;
//!
//! let mut sink = Recorder::new();
//! sink.move_to(point(0.0, 0.0)).unwrap();
//! sink.line_to(point(10.0, 0.0)).unwrap();
//! sink.line_join().unwrap();
//! sink.line_to(point(10.0, 10.0)).unwrap();
//! sink.close().unwrap();
//! sink.end().unwrap();
//! sink.dispose();
//!
//! assert_eq!(sink.commands().len(), 7);
//! assert_eq!(sink.commands()[2], Command::LineJoin);
//! ```

pub use lyon_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod commands;
pub mod error;
mod events;
pub mod flatten;
pub mod pool;
pub mod recorder;
pub mod sink;
pub mod state;
pub mod transformed;

#[doc(inline)]
pub use crate::commands::{Command, Verb};
#[doc(inline)]
pub use crate::error::{SinkError, SinkResult};
pub use crate::events::PathEvent;
#[doc(inline)]
pub use crate::flatten::Flattener;
#[doc(inline)]
pub use crate::pool::{PooledSink, SinkPool};
#[doc(inline)]
pub use crate::recorder::{NullSink, Recorder};
#[doc(inline)]
pub use crate::sink::{LineSink, Reusable};
#[doc(inline)]
pub use crate::state::{SinkState, Validated};
#[doc(inline)]
pub use crate::transformed::Transformed;

pub mod traits {
    //! `linework_path` traits reexported here for convenience.

    pub use crate::sink::LineSink;
    pub use crate::sink::Reusable;
}

pub mod math {
    //! f32 version of the lyon_geom types used everywhere. Most other linework crates
    //! reexport them.

    use crate::geom::euclid;

    /// Alias for ```euclid::default::Point2D<f32>```.
    pub type Point = euclid::default::Point2D<f32>;

    /// Alias for ```euclid::default::Vector2D<f32>```.
    pub type Vector = euclid::default::Vector2D<f32>;

    /// Alias for ```euclid::default::Box2D<f32>```
    pub type Box2D = euclid::default::Box2D<f32>;

    /// Alias for ```euclid::default::Transform2D<f32>```
    pub type Transform = euclid::default::Transform2D<f32>;

    /// An angle in radians (f32).
    pub type Angle = euclid::Angle<f32>;

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }
}

/// The fill rule defines how to determine what is inside and what is outside of the shape.
///
/// See the SVG specification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillRule {
    EvenOdd,
    NonZero,
}

impl FillRule {
    #[inline]
    pub fn is_in(&self, winding_number: i32) -> bool {
        match *self {
            FillRule::EvenOdd => winding_number % 2 != 0,
            FillRule::NonZero => winding_number != 0,
        }
    }

    #[inline]
    pub fn is_out(&self, winding_number: i32) -> bool {
        !self.is_in(winding_number)
    }
}

#[cfg(test)]
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn fill_rule_winding() {
    assert!(FillRule::EvenOdd.is_in(1));
    assert!(FillRule::EvenOdd.is_in(-3));
    assert!(FillRule::EvenOdd.is_out(2));
    assert!(FillRule::NonZero.is_in(2));
    assert!(FillRule::NonZero.is_in(-1));
    assert!(FillRule::NonZero.is_out(0));
}
