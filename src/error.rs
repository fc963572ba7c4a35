//! Crate-level error type.

use crate::{check, db, steps, translate};
use core::fmt::{self, Display};

/// Any error raised during reconstruction.
///
/// Every module keeps its own error enum;
/// this type merely collects them for callers
/// that drive a whole job end to end.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Check(check::Error),
    Steps(steps::Error),
    Translate(translate::Error),
    Db(db::Error),
}

impl From<check::Error> for Error {
    fn from(err: check::Error) -> Self {
        Self::Check(err)
    }
}

impl From<steps::Error> for Error {
    fn from(err: steps::Error) -> Self {
        Self::Steps(err)
    }
}

impl From<translate::Error> for Error {
    fn from(err: translate::Error) -> Self {
        Self::Translate(err)
    }
}

impl From<db::Error> for Error {
    fn from(err: db::Error) -> Self {
        Self::Db(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Check(check::Error::Arity(rule)) => {
                write!(f, "wrong number of premises or arguments for {}", rule)
            }
            Self::Check(check::Error::Premise(_)) => "malformed premise or argument".fmt(f),
            Self::Check(check::Error::Conclusion(_)) => {
                "recomputed conclusion differs from the recorded one".fmt(f)
            }
            Self::Steps(steps::Error::Missing(_)) => "no step justifies this conclusion".fmt(f),
            Self::Steps(steps::Error::Circular(_)) => {
                "this conclusion transitively justifies itself".fmt(f)
            }
            Self::Translate(translate::Error::Unhandled(rule)) => {
                write!(f, "no translation for rule {}", rule)
            }
            Self::Db(db::Error::Variable(_)) => "variable list entry is not a variable".fmt(f),
            Self::Db(db::Error::Unbound(_)) => "pattern variable missing from the variable list".fmt(f),
            Self::Db(db::Error::ListPosition(_)) => {
                "list variable before the end of an argument list".fmt(f)
            }
            Self::Db(db::Error::Headless(_)) => "pattern head is a variable".fmt(f),
        }
    }
}

impl std::error::Error for Error {}
