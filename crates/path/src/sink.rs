//! The line sink interface.
//!
//! ## Overview
//!
//! A [`LineSink`](trait.LineSink.html) accepts a series of line drawing commands:
//!
//! - `move_to` starts a sub-path and sets both the current position and the
//!   sub-path's start position.
//! - `line_to` draws a segment from the current position.
//! - `close` is equivalent to a `line_to` back to the start of the sub-path. The sub-path
//!   stays open: a following `line_to` draws from the start position.
//! - `line_join` is a hint that the join at the current position must use an explicit
//!   join style rather than being treated as a straight continuation.
//! - `end` finalizes the path, which for example lets a stroker emit its caps.
//! - `dispose` releases the sink's resources. It is the last call made on a sink.
//!
//! Producers typically hold a `&mut dyn LineSink` or a generic `S: LineSink` for the
//! duration of one path traversal.
//!
//! ## Examples
//!
//! ```
//! use linework_path::{LineSink, Recorder, SinkError, Verb};
//! use linework_path::math::point;
//!
//! fn triangle(sink: &mut dyn LineSink) -> Result<(), SinkError> {
//!     sink.move_to(point(0.0, 0.0))?;
//!     sink.line_to(point(1.0, 0.0))?;
//!     sink.line_to(point(0.0, 1.0))?;
//!     sink.close()?;
//!     sink.end()
//! }
//!
//! let mut recorder = Recorder::new();
//! triangle(&mut recorder).unwrap();
//! assert_eq!(recorder.segments().len(), 3);
//!
//! // Segments can't be added outside of a sub-path.
//! assert_eq!(
//!     recorder.line_to(point(1.0, 1.0)),
//!     Err(SinkError::IllegalState { verb: Verb::LineTo }),
//! );
//! ```

use crate::commands::Command;
use crate::error::SinkResult;
use crate::math::Point;

use std::iter::IntoIterator;

/// The line drawing command interface.
///
/// Every implementation follows the same state machine (see
/// [`SinkState`](../state/struct.SinkState.html)) and reports violations through
/// [`SinkError`](../error/enum.SinkError.html) at the offending call.
pub trait LineSink {
    /// Moves the current drawing position to `at` and starts a new sub-path there.
    ///
    /// If a sub-path is in progress it is abandoned without being closed.
    fn move_to(&mut self, at: Point) -> SinkResult;

    /// Hints that the segment ending at the current position should be joined to the
    /// following one using an explicit join.
    ///
    /// Sinks that don't deal with joins forward the hint to their output, or ignore it
    /// if they have none. Calling this with no sub-path in progress is a no-op.
    fn line_join(&mut self) -> SinkResult;

    /// Draws a line from the current drawing position to `to`, which becomes the new
    /// current position.
    ///
    /// A sub-path must be in progress.
    fn line_to(&mut self, to: Point) -> SinkResult;

    /// Draws a line from the current position back to the start of the sub-path.
    ///
    /// A sub-path must be in progress. It remains in progress with the current position
    /// at its start.
    fn close(&mut self) -> SinkResult;

    /// Ends the current path.
    ///
    /// It may be necessary to end a path in order to allow end caps to be drawn.
    /// Ending with no sub-path in progress is a no-op.
    fn end(&mut self) -> SinkResult;

    /// Releases the resources held by the sink.
    ///
    /// This is the last call made on a sink. Calling it again does nothing.
    fn dispose(&mut self);

    /// Applies one command.
    fn command(&mut self, command: Command) -> SinkResult {
        match command {
            Command::MoveTo(at) => self.move_to(at),
            Command::LineTo(to) => self.line_to(to),
            Command::LineJoin => self.line_join(),
            Command::Close => self.close(),
            Command::End => self.end(),
            Command::Dispose => {
                self.dispose();
                Ok(())
            }
        }
    }

    /// Applies commands from an iterator, stopping at the first error.
    fn extend<Cmds>(&mut self, commands: Cmds) -> SinkResult
    where
        Cmds: IntoIterator<Item = Command>,
        Self: Sized,
    {
        for cmd in commands {
            self.command(cmd)?;
        }

        Ok(())
    }
}

/// Sinks that can be brought back to their initial state and handed out again.
///
/// Used by the [`SinkPool`](../pool/struct.SinkPool.html).
pub trait Reusable {
    /// Returns to the idle state, clearing any accumulated output while keeping
    /// allocations around.
    fn reset(&mut self);

    /// Whether `dispose` was called. A disposed sink is never reused.
    fn is_disposed(&self) -> bool;
}

impl<'l, S: LineSink + ?Sized> LineSink for &'l mut S {
    #[inline]
    fn move_to(&mut self, at: Point) -> SinkResult {
        (**self).move_to(at)
    }

    #[inline]
    fn line_join(&mut self) -> SinkResult {
        (**self).line_join()
    }

    #[inline]
    fn line_to(&mut self, to: Point) -> SinkResult {
        (**self).line_to(to)
    }

    #[inline]
    fn close(&mut self) -> SinkResult {
        (**self).close()
    }

    #[inline]
    fn end(&mut self) -> SinkResult {
        (**self).end()
    }

    #[inline]
    fn dispose(&mut self) {
        (**self).dispose()
    }
}

impl<S: LineSink + ?Sized> LineSink for Box<S> {
    #[inline]
    fn move_to(&mut self, at: Point) -> SinkResult {
        (**self).move_to(at)
    }

    #[inline]
    fn line_join(&mut self) -> SinkResult {
        (**self).line_join()
    }

    #[inline]
    fn line_to(&mut self, to: Point) -> SinkResult {
        (**self).line_to(to)
    }

    #[inline]
    fn close(&mut self) -> SinkResult {
        (**self).close()
    }

    #[inline]
    fn end(&mut self) -> SinkResult {
        (**self).end()
    }

    #[inline]
    fn dispose(&mut self) {
        (**self).dispose()
    }
}

impl<'l, S: Reusable + ?Sized> Reusable for &'l mut S {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }
}

impl<S: Reusable + ?Sized> Reusable for Box<S> {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }
}

#[test]
fn dyn_sinks() {
    use crate::math::point;
    use crate::Recorder;

    let mut recorder = Recorder::new();
    {
        let sink: &mut dyn LineSink = &mut recorder;
        sink.move_to(point(0.0, 0.0)).unwrap();
        sink.line_to(point(1.0, 0.0)).unwrap();
        sink.end().unwrap();
    }

    let mut boxed: Box<dyn LineSink> = Box::new(Recorder::new());
    boxed.move_to(point(0.0, 0.0)).unwrap();
    boxed.close().unwrap();
    boxed.dispose();

    assert_eq!(recorder.commands().len(), 3);
}

#[test]
fn extend_stops_at_first_error() {
    use crate::math::point;
    use crate::{Recorder, SinkError, Verb};

    let mut recorder = Recorder::new();
    let result = recorder.extend(vec![
        Command::MoveTo(point(0.0, 0.0)),
        Command::End,
        Command::LineTo(point(1.0, 1.0)),
        Command::MoveTo(point(2.0, 2.0)),
    ]);

    assert_eq!(result, Err(SinkError::IllegalState { verb: Verb::LineTo }));
    assert_eq!(
        recorder.commands(),
        &[Command::MoveTo(point(0.0, 0.0)), Command::End]
    );
}
