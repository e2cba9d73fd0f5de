//! The command vocabulary of the line sink protocol.

use crate::math::Point;
use core::fmt;

/// One call of the line sink protocol, as data.
///
/// This is the complete vocabulary: a sink never receives anything that is
/// not one of these six commands.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Command {
    MoveTo(Point),
    LineTo(Point),
    LineJoin,
    Close,
    End,
    Dispose,
}

impl Command {
    #[inline]
    pub fn verb(&self) -> Verb {
        match self {
            Command::MoveTo(..) => Verb::MoveTo,
            Command::LineTo(..) => Verb::LineTo,
            Command::LineJoin => Verb::LineJoin,
            Command::Close => Verb::Close,
            Command::End => Verb::End,
            Command::Dispose => Verb::Dispose,
        }
    }

    /// The position carried by the command, if any.
    #[inline]
    pub fn position(&self) -> Option<Point> {
        match *self {
            Command::MoveTo(p) | Command::LineTo(p) => Some(p),
            _ => None,
        }
    }
}

/// The kind of a command, without its payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Verb {
    MoveTo,
    LineTo,
    LineJoin,
    Close,
    End,
    Dispose,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verb::MoveTo => "move_to",
            Verb::LineTo => "line_to",
            Verb::LineJoin => "line_join",
            Verb::Close => "close",
            Verb::End => "end",
            Verb::Dispose => "dispose",
        })
    }
}

#[test]
fn command_verbs() {
    use crate::math::point;

    assert_eq!(Command::MoveTo(point(1.0, 2.0)).verb(), Verb::MoveTo);
    assert_eq!(Command::LineJoin.verb(), Verb::LineJoin);
    assert_eq!(
        Command::LineTo(point(3.0, 4.0)).position(),
        Some(point(3.0, 4.0))
    );
    assert_eq!(Command::Close.position(), None);
    assert_eq!(format!("{}", Verb::LineJoin), "line_join");
}
