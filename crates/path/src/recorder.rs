//! Sinks that record or discard commands.
//!
//! The [`Recorder`](struct.Recorder.html) keeps the exact sequence of accepted commands
//! along with the segments they describe, which makes it the reference implementation
//! to test producers and pass-through sinks against.

use crate::commands::Command;
use crate::error::SinkResult;
use crate::geom::LineSegment;
use crate::math::Point;
use crate::sink::{LineSink, Reusable};
use crate::state::SinkState;

/// A sink that records every accepted command.
///
/// Commands that the protocol treats as no-ops (`line_join` or `end` with no
/// sub-path in progress, a second `dispose`) are not recorded. Rejected commands
/// are not recorded either.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    commands: Vec<Command>,
    segments: Vec<LineSegment<f32>>,
    state: SinkState,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder with room for `commands` commands and as many segments.
    pub fn with_capacity(commands: usize) -> Self {
        Recorder {
            commands: Vec::with_capacity(commands),
            segments: Vec::with_capacity(commands),
            state: SinkState::new(),
        }
    }

    /// The commands received so far, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The segments drawn so far, including the ones produced by `close`.
    pub fn segments(&self) -> &[LineSegment<f32>] {
        &self.segments
    }

    pub fn state(&self) -> &SinkState {
        &self.state
    }

    /// Replays the recorded commands into another sink.
    pub fn replay(&self, sink: &mut dyn LineSink) -> SinkResult {
        for cmd in &self.commands {
            sink.command(*cmd)?;
        }

        Ok(())
    }
}

impl LineSink for Recorder {
    fn move_to(&mut self, at: Point) -> SinkResult {
        self.state.move_to(at)?;
        self.commands.push(Command::MoveTo(at));

        Ok(())
    }

    fn line_join(&mut self) -> SinkResult {
        if self.state.line_join()? {
            self.commands.push(Command::LineJoin);
        }

        Ok(())
    }

    fn line_to(&mut self, to: Point) -> SinkResult {
        let from = self.state.line_to(to)?;
        self.commands.push(Command::LineTo(to));
        self.segments.push(LineSegment { from, to });

        Ok(())
    }

    fn close(&mut self) -> SinkResult {
        let (from, to) = self.state.close()?;
        self.commands.push(Command::Close);
        self.segments.push(LineSegment { from, to });

        Ok(())
    }

    fn end(&mut self) -> SinkResult {
        if self.state.end()? {
            self.commands.push(Command::End);
        }

        Ok(())
    }

    fn dispose(&mut self) {
        if self.state.dispose() {
            self.commands.push(Command::Dispose);
        }
    }
}

impl Reusable for Recorder {
    fn reset(&mut self) {
        self.commands.clear();
        self.segments.clear();
        self.state.reset();
    }

    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }
}

/// A sink that validates commands and discards them.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSink {
    state: SinkState,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineSink for NullSink {
    fn move_to(&mut self, at: Point) -> SinkResult {
        self.state.move_to(at)
    }

    fn line_join(&mut self) -> SinkResult {
        self.state.line_join().map(|_| ())
    }

    fn line_to(&mut self, to: Point) -> SinkResult {
        self.state.line_to(to).map(|_| ())
    }

    fn close(&mut self) -> SinkResult {
        self.state.close().map(|_| ())
    }

    fn end(&mut self) -> SinkResult {
        self.state.end().map(|_| ())
    }

    fn dispose(&mut self) {
        self.state.dispose();
    }
}

impl Reusable for NullSink {
    fn reset(&mut self) {
        self.state.reset();
    }

    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }
}

#[cfg(test)]
use crate::error::SinkError;
#[cfg(test)]
use crate::commands::Verb;
#[cfg(test)]
use crate::math::point;

#[cfg(test)]
fn seg(x0: f32, y0: f32, x1: f32, y1: f32) -> LineSegment<f32> {
    LineSegment {
        from: point(x0, y0),
        to: point(x1, y1),
    }
}

#[test]
fn record_full_sequence() {
    crate::init_logger();

    let mut sink = Recorder::new();
    sink.move_to(point(0.0, 0.0)).unwrap();
    sink.line_to(point(10.0, 0.0)).unwrap();
    sink.line_join().unwrap();
    sink.line_to(point(10.0, 10.0)).unwrap();
    sink.close().unwrap();
    sink.end().unwrap();
    sink.dispose();

    assert_eq!(
        sink.commands(),
        &[
            Command::MoveTo(point(0.0, 0.0)),
            Command::LineTo(point(10.0, 0.0)),
            Command::LineJoin,
            Command::LineTo(point(10.0, 10.0)),
            Command::Close,
            Command::End,
            Command::Dispose,
        ]
    );
}

#[test]
fn single_point_has_no_segment() {
    let mut sink = Recorder::new();
    sink.move_to(point(3.0, 4.0)).unwrap();
    sink.line_join().unwrap();
    sink.end().unwrap();

    assert!(sink.segments().is_empty());
}

#[test]
fn close_right_after_move_to() {
    let mut sink = Recorder::new();
    sink.move_to(point(3.0, 4.0)).unwrap();
    sink.close().unwrap();
    sink.end().unwrap();

    assert_eq!(sink.segments(), &[seg(3.0, 4.0, 3.0, 4.0)]);
}

#[test]
fn line_to_after_close_starts_from_sub_path_start() {
    let mut sink = Recorder::new();
    sink.move_to(point(0.0, 0.0)).unwrap();
    sink.line_to(point(10.0, 0.0)).unwrap();
    sink.close().unwrap();
    sink.line_to(point(10.0, 10.0)).unwrap();
    sink.end().unwrap();

    assert_eq!(
        sink.segments(),
        &[
            seg(0.0, 0.0, 10.0, 0.0),
            seg(10.0, 0.0, 0.0, 0.0),
            seg(0.0, 0.0, 10.0, 10.0),
        ]
    );
}

#[test]
fn move_to_abandons_sub_path_without_closing() {
    let mut sink = Recorder::new();
    sink.move_to(point(0.0, 0.0)).unwrap();
    sink.line_to(point(10.0, 0.0)).unwrap();
    sink.move_to(point(5.0, 5.0)).unwrap();
    sink.line_to(point(6.0, 5.0)).unwrap();
    sink.end().unwrap();

    assert_eq!(
        sink.segments(),
        &[seg(0.0, 0.0, 10.0, 0.0), seg(5.0, 5.0, 6.0, 5.0)]
    );
}

#[test]
fn idle_line_join_is_dropped() {
    let mut sink = Recorder::new();
    sink.line_join().unwrap();
    sink.move_to(point(0.0, 0.0)).unwrap();
    sink.end().unwrap();
    sink.line_join().unwrap();

    assert_eq!(
        sink.commands(),
        &[Command::MoveTo(point(0.0, 0.0)), Command::End]
    );
}

#[test]
fn idle_segments_are_rejected() {
    let mut sink = Recorder::new();
    assert_eq!(
        sink.line_to(point(1.0, 0.0)),
        Err(SinkError::IllegalState { verb: Verb::LineTo })
    );
    assert_eq!(
        sink.close(),
        Err(SinkError::IllegalState { verb: Verb::Close })
    );

    sink.move_to(point(0.0, 0.0)).unwrap();
    sink.end().unwrap();
    assert_eq!(
        sink.close(),
        Err(SinkError::IllegalState { verb: Verb::Close })
    );
    assert!(sink.segments().is_empty());
}

#[test]
fn double_dispose() {
    let mut sink = Recorder::new();
    sink.dispose();
    sink.dispose();

    assert_eq!(sink.commands(), &[Command::Dispose]);
    assert_eq!(
        sink.move_to(point(0.0, 0.0)),
        Err(SinkError::UseAfterDispose { verb: Verb::MoveTo })
    );
}

#[test]
fn replay_into_another_sink() {
    crate::init_logger();

    let mut a = Recorder::new();
    a.move_to(point(0.0, 0.0)).unwrap();
    a.line_to(point(1.0, 1.0)).unwrap();
    a.line_join().unwrap();
    a.line_to(point(2.0, 0.0)).unwrap();
    a.end().unwrap();

    let mut b = Recorder::with_capacity(a.commands().len());
    assert!(b.commands().is_empty());
    assert!(b.state().is_idle());
    a.replay(&mut b).unwrap();

    assert_eq!(a.commands(), b.commands());
    assert_eq!(a.segments(), b.segments());
}

#[test]
fn null_sink_validates() {
    let mut sink = NullSink::new();
    assert!(sink.line_to(point(1.0, 0.0)).is_err());
    sink.move_to(point(0.0, 0.0)).unwrap();
    sink.line_to(point(1.0, 0.0)).unwrap();
    sink.end().unwrap();
    sink.dispose();
    sink.dispose();
    assert!(sink.is_disposed());
}
