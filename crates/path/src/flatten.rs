//! Approximation of curved paths with line sink commands.
//!
//! The [`Flattener`](struct.Flattener.html) connects a general path source to a
//! [`LineSink`](../sink/trait.LineSink.html). Quadratic and cubic bézier segments are
//! approximated with sequences of `line_to` commands such that the maximum distance
//! between a curve and its approximation stays below the tolerance.
//!
//! Segment boundaries of the input path are marked with `line_join` hints. The chords
//! of a single flattened curve are not, so that a downstream stroker can connect them
//! cheaply while still emitting proper joins at the corners of the input path.
//!
//! # Examples
//!
//! ```
//! use linework_path::{Command, Flattener, Recorder};
//! use linework_path::math::point;
//!
//! let mut flattener = Flattener::new(Recorder::new(), 0.05);
//!
//! flattener.move_to(point(0.0, 0.0)).unwrap();
//! flattener.line_to(point(1.0, 0.0)).unwrap();
//! flattener.quadratic_bezier_to(point(2.0, 0.0), point(2.0, 1.0)).unwrap();
//! flattener.close().unwrap();
//! flattener.end().unwrap();
//!
//! let recorder = flattener.into_inner();
//! // The quadratic bézier curve starts with a join and is followed by
//! // several line segments.
//! assert_eq!(recorder.commands()[2], Command::LineJoin);
//! assert!(recorder.segments().len() > 3);
//! ```

use crate::commands::Verb;
use crate::error::SinkResult;
use crate::events::PathEvent;
use crate::geom::{CubicBezierSegment, LineSegment, QuadraticBezierSegment};
use crate::math::Point;
use crate::sink::{LineSink, Reusable};
use crate::state::{check_finite, SinkState};

use std::iter::IntoIterator;

/// A producer that turns curved paths into line sink commands.
pub struct Flattener<S> {
    sink: S,
    state: SinkState,
    tolerance: f32,
    has_segments: bool,
}

impl<S: LineSink> Flattener<S> {
    /// Creates a flattener writing into `sink`.
    ///
    /// # Panics
    ///
    /// If `tolerance` is not a strictly positive finite number.
    pub fn new(sink: S, tolerance: f32) -> Self {
        assert!(tolerance.is_finite() && tolerance > 0.0);

        Flattener {
            sink,
            state: SinkState::new(),
            tolerance,
            has_segments: false,
        }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn set_tolerance(&mut self, tolerance: f32) {
        assert!(tolerance.is_finite() && tolerance > 0.0);
        self.tolerance = tolerance
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    /// The current position, if a sub-path is in progress.
    pub fn current_position(&self) -> Option<Point> {
        self.state.current_position()
    }

    pub fn move_to(&mut self, at: Point) -> SinkResult {
        self.state.move_to(at)?;
        self.has_segments = false;

        self.sink.move_to(at)
    }

    pub fn line_to(&mut self, to: Point) -> SinkResult {
        self.state.line_to(to)?;
        self.begin_segment()?;

        self.sink.line_to(to)
    }

    /// Adds a quadratic bézier curve to the current sub-path.
    ///
    /// Errors are reported with the `line_to` verb since that is what the curve
    /// turns into.
    pub fn quadratic_bezier_to(&mut self, ctrl: Point, to: Point) -> SinkResult {
        check_finite(Verb::LineTo, ctrl)?;
        let from = self.state.line_to(to)?;
        self.begin_segment()?;

        let curve = QuadraticBezierSegment { from, ctrl, to };
        let tolerance = self.tolerance;
        let sink = &mut self.sink;
        let mut chords = Chords::new();
        curve.for_each_flattened(tolerance, &mut |segment| chords.push(sink, segment));

        chords.finish(sink, to)
    }

    /// Adds a cubic bézier curve to the current sub-path.
    ///
    /// Errors are reported with the `line_to` verb since that is what the curve
    /// turns into.
    pub fn cubic_bezier_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) -> SinkResult {
        check_finite(Verb::LineTo, ctrl1)?;
        check_finite(Verb::LineTo, ctrl2)?;
        let from = self.state.line_to(to)?;
        self.begin_segment()?;

        let curve = CubicBezierSegment {
            from,
            ctrl1,
            ctrl2,
            to,
        };
        let tolerance = self.tolerance;
        let sink = &mut self.sink;
        let mut chords = Chords::new();
        curve.for_each_flattened(tolerance, &mut |segment| chords.push(sink, segment));

        chords.finish(sink, to)
    }

    pub fn close(&mut self) -> SinkResult {
        self.state.close()?;
        self.begin_segment()?;

        self.sink.close()
    }

    pub fn end(&mut self) -> SinkResult {
        self.has_segments = false;
        if self.state.end()? {
            self.sink.end()?;
        }

        Ok(())
    }

    /// Releases the flattener and propagates `dispose` to the sink.
    pub fn dispose(&mut self) {
        if self.state.dispose() {
            log::debug!("flattener disposed");
            self.sink.dispose();
        }
    }

    /// Applies the provided path event.
    ///
    /// `End { close: true }` closes the sub-path before ending it.
    pub fn path_event(&mut self, event: PathEvent) -> SinkResult {
        match event {
            PathEvent::Begin { at } => self.move_to(at),
            PathEvent::Line { to, .. } => self.line_to(to),
            PathEvent::Quadratic { ctrl, to, .. } => self.quadratic_bezier_to(ctrl, to),
            PathEvent::Cubic {
                ctrl1, ctrl2, to, ..
            } => self.cubic_bezier_to(ctrl1, ctrl2, to),
            PathEvent::End { close, .. } => {
                if close {
                    self.close()?;
                }
                self.end()
            }
        }
    }

    /// Applies events from an iterator, stopping at the first error.
    pub fn extend<Evts>(&mut self, events: Evts) -> SinkResult
    where
        Evts: IntoIterator<Item = PathEvent>,
    {
        for evt in events {
            self.path_event(evt)?;
        }

        Ok(())
    }

    fn begin_segment(&mut self) -> SinkResult {
        if self.has_segments {
            self.sink.line_join()?;
        }
        self.has_segments = true;

        Ok(())
    }
}

impl<S: LineSink + Reusable> Reusable for Flattener<S> {
    fn reset(&mut self) {
        self.state.reset();
        self.has_segments = false;
        self.sink.reset();
    }

    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }
}

/// Forwards the chords of a flattened curve, replacing the last one's endpoint with
/// the exact endpoint of the curve.
struct Chords {
    pending: Option<Point>,
    result: SinkResult,
}

impl Chords {
    fn new() -> Self {
        Chords {
            pending: None,
            result: Ok(()),
        }
    }

    fn push<S: LineSink>(&mut self, sink: &mut S, segment: &LineSegment<f32>) {
        if self.result.is_err() {
            return;
        }
        if let Some(p) = self.pending.take() {
            self.result = sink.line_to(p);
        }
        self.pending = Some(segment.to);
    }

    fn finish<S: LineSink>(self, sink: &mut S, to: Point) -> SinkResult {
        self.result?;

        sink.line_to(to)
    }
}

#[cfg(test)]
use crate::commands::Command;
#[cfg(test)]
use crate::error::SinkError;
#[cfg(test)]
use crate::math::point;
#[cfg(test)]
use crate::Recorder;

#[test]
fn joins_between_segments() {
    crate::init_logger();

    let mut flattener = Flattener::new(Recorder::new(), 0.1);
    flattener.move_to(point(0.0, 0.0)).unwrap();
    flattener.line_to(point(10.0, 0.0)).unwrap();
    flattener.line_to(point(10.0, 10.0)).unwrap();
    flattener.close().unwrap();
    flattener.end().unwrap();
    flattener.dispose();

    assert_eq!(
        flattener.into_inner().commands(),
        &[
            Command::MoveTo(point(0.0, 0.0)),
            Command::LineTo(point(10.0, 0.0)),
            Command::LineJoin,
            Command::LineTo(point(10.0, 10.0)),
            Command::LineJoin,
            Command::Close,
            Command::End,
            Command::Dispose,
        ]
    );
}

#[test]
fn curve_chords_have_no_joins() {
    let mut flattener = Flattener::new(Recorder::new(), 0.01);
    flattener.move_to(point(0.0, 0.0)).unwrap();
    flattener
        .cubic_bezier_to(point(0.0, 10.0), point(10.0, 10.0), point(10.0, 0.0))
        .unwrap();
    flattener.end().unwrap();

    let recorder = flattener.into_inner();
    let commands = recorder.commands();
    assert!(commands.len() > 4);
    assert!(!commands.contains(&Command::LineJoin));
    assert_eq!(commands[commands.len() - 2], Command::LineTo(point(10.0, 0.0)));

    // The chords stay within the convex hull of the curve.
    for segment in recorder.segments() {
        assert!(segment.to.x >= -0.001 && segment.to.x <= 10.001);
        assert!(segment.to.y >= -0.001 && segment.to.y <= 10.001);
    }
}

#[test]
fn quadratic_curve_ends_exactly_at_endpoint() {
    let mut flattener = Flattener::new(Recorder::new(), 0.05);
    flattener.move_to(point(0.0, 0.0)).unwrap();
    flattener.line_to(point(1.0, 0.0)).unwrap();
    flattener
        .quadratic_bezier_to(point(2.0, 0.0), point(2.0, 1.0))
        .unwrap();
    assert_eq!(flattener.current_position(), Some(point(2.0, 1.0)));
    flattener.end().unwrap();

    let recorder = flattener.into_inner();
    let segments = recorder.segments();
    assert_eq!(segments.last().map(|s| s.to), Some(point(2.0, 1.0)));
    // Consecutive chords are connected.
    for pair in segments.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
    // Exactly one join, at the boundary between the line and the curve.
    let joins = recorder
        .commands()
        .iter()
        .filter(|cmd| **cmd == Command::LineJoin)
        .count();
    assert_eq!(joins, 1);
}

#[test]
fn path_events() {
    let events = [
        PathEvent::Begin {
            at: point(0.0, 0.0),
        },
        PathEvent::Line {
            from: point(0.0, 0.0),
            to: point(5.0, 0.0),
        },
        PathEvent::End {
            last: point(5.0, 0.0),
            first: point(0.0, 0.0),
            close: true,
        },
        PathEvent::Begin {
            at: point(1.0, 1.0),
        },
        PathEvent::End {
            last: point(1.0, 1.0),
            first: point(1.0, 1.0),
            close: false,
        },
    ];

    let mut flattener = Flattener::new(Recorder::new(), 0.1);
    flattener.extend(events.iter().cloned()).unwrap();

    assert_eq!(
        flattener.sink().commands(),
        &[
            Command::MoveTo(point(0.0, 0.0)),
            Command::LineTo(point(5.0, 0.0)),
            Command::LineJoin,
            Command::Close,
            Command::End,
            Command::MoveTo(point(1.0, 1.0)),
            Command::End,
        ]
    );
}

#[test]
fn curved_path_events() {
    crate::init_logger();

    let events = [
        PathEvent::Begin {
            at: point(0.0, 0.0),
        },
        PathEvent::Quadratic {
            from: point(0.0, 0.0),
            ctrl: point(5.0, 5.0),
            to: point(10.0, 0.0),
        },
        PathEvent::Cubic {
            from: point(10.0, 0.0),
            ctrl1: point(12.0, -4.0),
            ctrl2: point(16.0, 4.0),
            to: point(20.0, 0.0),
        },
        PathEvent::End {
            last: point(20.0, 0.0),
            first: point(0.0, 0.0),
            close: false,
        },
    ];

    let mut flattener = Flattener::new(Recorder::new(), 0.1);
    flattener.extend(events.iter().cloned()).unwrap();

    let commands = flattener.sink().commands();
    assert_eq!(commands.first(), Some(&Command::MoveTo(point(0.0, 0.0))));
    assert_eq!(commands.last(), Some(&Command::End));
    assert_eq!(
        commands[commands.len() - 2],
        Command::LineTo(point(20.0, 0.0))
    );
    assert!(commands.contains(&Command::LineTo(point(10.0, 0.0))));
    // One join between the two curves, none between chords.
    let joins = commands
        .iter()
        .filter(|cmd| **cmd == Command::LineJoin)
        .count();
    assert_eq!(joins, 1);
    assert!(!commands.contains(&Command::Close));
}

#[test]
fn curves_are_validated() {
    crate::init_logger();

    let mut flattener = Flattener::new(Recorder::new(), 0.1);
    assert_eq!(
        flattener.quadratic_bezier_to(point(1.0, 1.0), point(2.0, 0.0)),
        Err(SinkError::IllegalState { verb: Verb::LineTo })
    );

    flattener.move_to(point(0.0, 0.0)).unwrap();
    assert_eq!(
        flattener.cubic_bezier_to(point(f32::NAN, 1.0), point(1.0, 1.0), point(2.0, 0.0)),
        Err(SinkError::InvalidArgument { verb: Verb::LineTo })
    );

    assert_eq!(
        flattener.sink().commands(),
        &[Command::MoveTo(point(0.0, 0.0))]
    );
}

#[test]
fn dispose_is_propagated_once() {
    let mut flattener = Flattener::new(Recorder::new(), 0.1);
    flattener.dispose();
    flattener.dispose();

    assert_eq!(
        flattener.move_to(point(0.0, 0.0)),
        Err(SinkError::UseAfterDispose { verb: Verb::MoveTo })
    );
    assert_eq!(flattener.sink().commands(), &[Command::Dispose]);
}
