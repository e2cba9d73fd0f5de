//! The line sink state machine.
//!
//! Every sink in this workspace embeds a [`SinkState`](struct.SinkState.html) and runs
//! each incoming command through it before acting on it, so that they all accept and
//! reject exactly the same command sequences:
//!
//! ```text
//!            move_to            line_to, line_join, close, move_to
//!   Idle ------------------> Open <-----------------------------+
//!    ^ |                      | |                               |
//!    | | end, line_join       | +-------------------------------+
//!    | +------+               |
//!    |        |               | end
//!    +--------+---------------+
//!
//!   Idle, Open --dispose--> Disposed (terminal)
//! ```
//!
//! [`Validated`](struct.Validated.html) wraps an arbitrary sink with the same checks.

use crate::commands::Verb;
use crate::error::{SinkError, SinkResult};
use crate::math::Point;
use crate::sink::{LineSink, Reusable};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Open,
    Disposed,
}

/// Tracks the protocol state of a sink, its current position and sub-path start.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SinkState {
    phase: Phase,
    start: Point,
    current: Point,
}

impl Default for SinkState {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkState {
    pub fn new() -> Self {
        SinkState {
            phase: Phase::Idle,
            start: Point::new(0.0, 0.0),
            current: Point::new(0.0, 0.0),
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Whether a sub-path is in progress.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.phase == Phase::Disposed
    }

    /// The current drawing position, if a sub-path is in progress.
    pub fn current_position(&self) -> Option<Point> {
        if self.is_open() {
            Some(self.current)
        } else {
            None
        }
    }

    /// The position of the last `move_to`, if a sub-path is in progress.
    pub fn start_position(&self) -> Option<Point> {
        if self.is_open() {
            Some(self.start)
        } else {
            None
        }
    }

    /// Validates a `move_to` and opens a sub-path at `at`.
    pub fn move_to(&mut self, at: Point) -> SinkResult {
        self.check_alive(Verb::MoveTo)?;
        check_finite(Verb::MoveTo, at)?;

        self.phase = Phase::Open;
        self.start = at;
        self.current = at;

        Ok(())
    }

    /// Validates a `line_to` and advances the current position.
    ///
    /// Returns the position the segment starts from.
    pub fn line_to(&mut self, to: Point) -> Result<Point, SinkError> {
        self.check_alive(Verb::LineTo)?;
        check_finite(Verb::LineTo, to)?;
        self.check_open(Verb::LineTo)?;

        let from = self.current;
        self.current = to;

        Ok(from)
    }

    /// Validates a `close` and moves the current position back to the sub-path start.
    ///
    /// Returns the closing segment's endpoints.
    pub fn close(&mut self) -> Result<(Point, Point), SinkError> {
        self.check_alive(Verb::Close)?;
        self.check_open(Verb::Close)?;

        let from = self.current;
        self.current = self.start;

        Ok((from, self.start))
    }

    /// Validates a `line_join` hint.
    ///
    /// Returns whether the hint applies, that is whether a sub-path is in progress.
    /// Hints given outside of a sub-path are dropped.
    pub fn line_join(&self) -> Result<bool, SinkError> {
        self.check_alive(Verb::LineJoin)?;

        Ok(self.is_open())
    }

    /// Validates an `end` and returns to the idle state.
    ///
    /// Returns whether a sub-path was in progress. Ending an idle sink is a no-op.
    pub fn end(&mut self) -> Result<bool, SinkError> {
        self.check_alive(Verb::End)?;

        let was_open = self.is_open();
        self.phase = Phase::Idle;

        Ok(was_open)
    }

    /// Marks the sink as disposed.
    ///
    /// Returns `true` the first time, `false` if the sink was already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }

        self.phase = Phase::Disposed;

        true
    }

    /// Returns to the idle state. A disposed state stays disposed.
    pub fn reset(&mut self) {
        if !self.is_disposed() {
            *self = SinkState::new();
        }
    }

    #[inline]
    fn check_alive(&self, verb: Verb) -> SinkResult {
        if self.is_disposed() {
            log::warn!("{verb} called on a disposed sink");
            return Err(SinkError::UseAfterDispose { verb });
        }

        Ok(())
    }

    #[inline]
    fn check_open(&self, verb: Verb) -> SinkResult {
        if !self.is_open() {
            return Err(SinkError::IllegalState { verb });
        }

        Ok(())
    }
}

/// Returns `InvalidArgument` if `p` has a NaN or infinite coordinate.
#[inline]
pub fn check_finite(verb: Verb, p: Point) -> SinkResult {
    if !p.x.is_finite() || !p.y.is_finite() {
        return Err(SinkError::InvalidArgument { verb });
    }

    Ok(())
}

/// A sink adapter that checks the protocol state machine and forwards the accepted
/// commands to the wrapped sink.
///
/// Commands that are no-ops according to the protocol (`line_join` or `end` with no
/// sub-path in progress, repeated `dispose`) are not forwarded, so the wrapped sink
/// only ever observes well-formed sequences. Commands rejected by the wrapped sink
/// leave the state unchanged.
pub struct Validated<S> {
    sink: S,
    state: SinkState,
}

impl<S: LineSink> Validated<S> {
    pub fn new(sink: S) -> Self {
        Validated {
            sink,
            state: SinkState::new(),
        }
    }

    pub fn state(&self) -> &SinkState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<S: LineSink> LineSink for Validated<S> {
    fn move_to(&mut self, at: Point) -> SinkResult {
        let mut state = self.state;
        state.move_to(at)?;
        self.sink.move_to(at)?;
        self.state = state;

        Ok(())
    }

    fn line_join(&mut self) -> SinkResult {
        let mut state = self.state;
        if state.line_join()? {
            self.sink.line_join()?;
        }
        self.state = state;

        Ok(())
    }

    fn line_to(&mut self, to: Point) -> SinkResult {
        let mut state = self.state;
        state.line_to(to)?;
        self.sink.line_to(to)?;
        self.state = state;

        Ok(())
    }

    fn close(&mut self) -> SinkResult {
        let mut state = self.state;
        state.close()?;
        self.sink.close()?;
        self.state = state;

        Ok(())
    }

    fn end(&mut self) -> SinkResult {
        let mut state = self.state;
        if state.end()? {
            self.sink.end()?;
        }
        self.state = state;

        Ok(())
    }

    fn dispose(&mut self) {
        if self.state.dispose() {
            self.sink.dispose();
        }
    }
}

impl<S: LineSink + Reusable> Reusable for Validated<S> {
    fn reset(&mut self) {
        self.state.reset();
        self.sink.reset();
    }

    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }
}

#[cfg(test)]
use crate::math::point;

#[test]
fn state_transitions() {
    let mut state = SinkState::new();
    assert!(state.is_idle());
    assert_eq!(state.current_position(), None);

    state.move_to(point(1.0, 2.0)).unwrap();
    assert!(state.is_open());
    assert_eq!(state.line_to(point(3.0, 2.0)), Ok(point(1.0, 2.0)));
    assert_eq!(state.current_position(), Some(point(3.0, 2.0)));

    assert_eq!(state.close(), Ok((point(3.0, 2.0), point(1.0, 2.0))));
    assert!(state.is_open());
    assert_eq!(state.current_position(), Some(point(1.0, 2.0)));

    // After close, line_to draws from the sub-path start.
    assert_eq!(state.line_to(point(5.0, 5.0)), Ok(point(1.0, 2.0)));

    assert_eq!(state.end(), Ok(true));
    assert!(state.is_idle());
    assert_eq!(state.end(), Ok(false));
}

#[test]
fn state_rejects_out_of_order_commands() {
    let mut state = SinkState::new();

    assert_eq!(
        state.line_to(point(1.0, 1.0)),
        Err(SinkError::IllegalState { verb: Verb::LineTo })
    );
    assert_eq!(
        state.close(),
        Err(SinkError::IllegalState { verb: Verb::Close })
    );
    assert_eq!(state.line_join(), Ok(false));

    // A rejected command leaves the state untouched.
    assert!(state.is_idle());
}

#[test]
fn state_rejects_non_finite_positions() {
    let mut state = SinkState::new();

    assert_eq!(
        state.move_to(point(f32::NAN, 0.0)),
        Err(SinkError::InvalidArgument { verb: Verb::MoveTo })
    );
    assert!(state.is_idle());

    state.move_to(point(0.0, 0.0)).unwrap();
    assert_eq!(
        state.line_to(point(0.0, f32::INFINITY)),
        Err(SinkError::InvalidArgument { verb: Verb::LineTo })
    );
    assert_eq!(state.current_position(), Some(point(0.0, 0.0)));
}

#[test]
fn state_after_dispose() {
    let mut state = SinkState::new();
    state.move_to(point(0.0, 0.0)).unwrap();

    assert!(state.dispose());
    assert!(!state.dispose());

    assert_eq!(
        state.move_to(point(0.0, 0.0)),
        Err(SinkError::UseAfterDispose { verb: Verb::MoveTo })
    );
    assert_eq!(
        state.line_join(),
        Err(SinkError::UseAfterDispose { verb: Verb::LineJoin })
    );
    assert_eq!(
        state.end(),
        Err(SinkError::UseAfterDispose { verb: Verb::End })
    );

    state.reset();
    assert!(state.is_disposed());
}

#[test]
fn validated_filters_no_ops() {
    use crate::{Command, Recorder};

    crate::init_logger();

    let mut sink = Validated::new(Recorder::new());

    sink.line_join().unwrap();
    sink.end().unwrap();
    assert_eq!(
        sink.line_to(point(1.0, 1.0)),
        Err(SinkError::IllegalState { verb: Verb::LineTo })
    );
    sink.move_to(point(0.0, 0.0)).unwrap();
    sink.line_to(point(1.0, 0.0)).unwrap();
    sink.end().unwrap();
    sink.end().unwrap();
    sink.dispose();
    sink.dispose();

    assert_eq!(
        sink.sink().commands(),
        &[
            Command::MoveTo(point(0.0, 0.0)),
            Command::LineTo(point(1.0, 0.0)),
            Command::End,
            Command::Dispose,
        ]
    );
}

#[test]
fn validated_state_follows_the_wrapped_sink() {
    use crate::math::Transform;
    use crate::{Recorder, Transformed};

    crate::init_logger();

    let inner = Transformed::new(Recorder::new(), Transform::scale(1e30, 1e30));
    let mut sink = Validated::new(inner);

    assert_eq!(
        sink.move_to(point(1e10, 0.0)),
        Err(SinkError::InvalidArgument { verb: Verb::MoveTo })
    );
    assert!(sink.state().is_idle());
    assert_eq!(
        sink.close(),
        Err(SinkError::IllegalState { verb: Verb::Close })
    );

    sink.move_to(point(1.0, 1.0)).unwrap();
    assert!(sink.line_to(point(1e10, 1.0)).is_err());
    assert_eq!(sink.state().current_position(), Some(point(1.0, 1.0)));
    sink.end().unwrap();
    assert!(sink.state().is_idle());
    assert_eq!(sink.sink().sink().commands().len(), 2);
}
