use crate::error::SinkResult;
use crate::geom::traits::Transformation;
use crate::math::Point;
use crate::sink::{LineSink, Reusable};
use crate::state::SinkState;

/// A pass-through sink that applies a transformation to all positions.
///
/// Every accepted command produces exactly one command on the output sink, in the
/// same order. `line_join` hints are forwarded as is. A command the output sink
/// rejects is not taken into account.
pub struct Transformed<S, T> {
    sink: S,
    transform: T,
    state: SinkState,
}

impl<S, T> Transformed<S, T> {
    #[inline]
    pub fn new(sink: S, transform: T) -> Self {
        Transformed {
            sink,
            transform,
            state: SinkState::new(),
        }
    }

    #[inline]
    pub fn set_transform(&mut self, transform: T) {
        self.transform = transform;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<S, T> LineSink for Transformed<S, T>
where
    S: LineSink,
    T: Transformation<f32>,
{
    fn move_to(&mut self, at: Point) -> SinkResult {
        let mut state = self.state;
        state.move_to(at)?;
        self.sink.move_to(self.transform.transform_point(at))?;
        self.state = state;

        Ok(())
    }

    #[inline]
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
        self.sink.line_to(self.transform.transform_point(to))?;
        self.state = state;

        Ok(())
    }

    #[inline]
    fn close(&mut self) -> SinkResult {
        let mut state = self.state;
        state.close()?;
        self.sink.close()?;
        self.state = state;

        Ok(())
    }

    #[inline]
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

impl<S: Reusable, T> Reusable for Transformed<S, T> {
    fn reset(&mut self) {
        self.state.reset();
        self.sink.reset();
    }

    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }
}

#[test]
fn forwards_one_command_per_command() {
    use crate::math::{point, vector, Transform};
    use crate::{Command, Recorder};

    crate::init_logger();

    let input = [
        Command::MoveTo(point(0.0, 0.0)),
        Command::LineTo(point(10.0, 0.0)),
        Command::LineJoin,
        Command::LineTo(point(10.0, 10.0)),
        Command::Close,
        Command::LineTo(point(5.0, 5.0)),
        Command::End,
        Command::Dispose,
    ];

    let transform = Transform::translation(1.0, 2.0);
    let mut sink = Transformed::new(Recorder::new(), transform);
    sink.extend(input.iter().cloned()).unwrap();

    let output = sink.into_inner();
    assert_eq!(output.commands().len(), input.len());
    for (a, b) in input.iter().zip(output.commands()) {
        assert_eq!(a.verb(), b.verb());
        if let (Some(p), Some(q)) = (a.position(), b.position()) {
            assert_eq!(p + vector(1.0, 2.0), q);
        }
    }
}

#[test]
fn transformed_validates() {
    use crate::math::{point, Transform};
    use crate::{Recorder, SinkError, Verb};

    let mut sink = Transformed::new(Recorder::new(), Transform::scale(2.0, 2.0));
    assert_eq!(
        sink.close(),
        Err(SinkError::IllegalState { verb: Verb::Close })
    );
    sink.line_join().unwrap();
    assert!(sink.sink().commands().is_empty());
}

#[test]
fn rejected_output_leaves_state_unchanged() {
    use crate::math::{point, Transform};
    use crate::{Command, Recorder, SinkError, Verb};

    crate::init_logger();

    // Finite input that overflows once scaled.
    let mut sink = Transformed::new(Recorder::new(), Transform::scale(1e30, 1e30));
    assert_eq!(
        sink.move_to(point(1e10, 0.0)),
        Err(SinkError::InvalidArgument { verb: Verb::MoveTo })
    );
    assert_eq!(
        sink.line_to(point(1.0, 0.0)),
        Err(SinkError::IllegalState { verb: Verb::LineTo })
    );
    sink.end().unwrap();
    assert!(sink.sink().commands().is_empty());

    sink.move_to(point(1.0, 0.0)).unwrap();
    assert_eq!(
        sink.line_to(point(0.0, 1e10)),
        Err(SinkError::InvalidArgument { verb: Verb::LineTo })
    );
    sink.line_to(point(2.0, 0.0)).unwrap();
    sink.end().unwrap();

    assert_eq!(
        sink.sink().commands(),
        &[
            Command::MoveTo(point(1e30, 0.0)),
            Command::LineTo(point(2e30, 0.0)),
            Command::End,
        ]
    );
}
