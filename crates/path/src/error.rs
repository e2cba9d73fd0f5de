//! Protocol violations reported by line sinks.

use crate::commands::Verb;
use thiserror::Error;

/// The result type of every sink operation except `dispose`.
pub type SinkResult = Result<(), SinkError>;

/// A violation of the line sink contract.
///
/// These are programming errors in the producer driving the sink. They are
/// reported at the offending call and the command has no effect. The caller
/// is expected to abandon the current path and discard whatever output was
/// produced so far. `dispose` remains callable after any error.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SinkError {
    /// A sequencing precondition was violated, for example `line_to` with no
    /// sub-path in progress.
    #[error("{verb} called with no sub-path in progress")]
    IllegalState { verb: Verb },
    /// A coordinate was NaN or infinite.
    #[error("{verb} called with a non-finite coordinate")]
    InvalidArgument { verb: Verb },
    /// The sink was used after `dispose`.
    #[error("{verb} called after dispose")]
    UseAfterDispose { verb: Verb },
}

impl SinkError {
    /// The command that caused the error.
    pub fn verb(&self) -> Verb {
        match *self {
            SinkError::IllegalState { verb }
            | SinkError::InvalidArgument { verb }
            | SinkError::UseAfterDispose { verb } => verb,
        }
    }
}

#[test]
fn error_messages() {
    let err = SinkError::IllegalState { verb: Verb::LineTo };
    assert_eq!(err.to_string(), "line_to called with no sub-path in progress");
    assert_eq!(err.verb(), Verb::LineTo);

    let err = SinkError::UseAfterDispose { verb: Verb::End };
    assert_eq!(err.to_string(), "end called after dispose");
}
