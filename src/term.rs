//! Interned terms and their operators.

use core::fmt::{self, Display};

/// Operator of a term node.
///
/// This is a closed alphabet:
/// the checking function and the translation policy dispatch on it exhaustively.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Op {
    True,
    False,
    Not,
    And,
    Or,
    Imp,
    Eq,
    /// Binary application, used to encode partial applications
    /// during congruence unfolding.
    App,
    /// Named function or constant.
    Sym(Box<str>),
    /// Schematic variable of a rewrite pattern.
    Var(Box<str>),
    /// Numeral argument, e.g. the index of a selected conjunct.
    Nat(u64),
    /// Placeholder proposition with no structural meaning.
    ///
    /// Minted by [`crate::Terms::fresh`]; the counter makes every
    /// placeholder globally unique within its store.
    Fresh(u64),
}

impl Op {
    /// Identity element of an n-ary operator, if it has one.
    ///
    /// Combining any `x` with the identity yields `x` again;
    /// folds over n-ary argument lists are seeded with it.
    pub fn identity(&self) -> Option<Op> {
        match self {
            Self::And => Some(Op::True),
            Self::Or => Some(Op::False),
            _ => None,
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::True => "true".fmt(f),
            Self::False => "false".fmt(f),
            Self::Not => "not".fmt(f),
            Self::And => "and".fmt(f),
            Self::Or => "or".fmt(f),
            Self::Imp => "=>".fmt(f),
            Self::Eq => "=".fmt(f),
            Self::App => "@".fmt(f),
            Self::Sym(s) | Self::Var(s) => s.fmt(f),
            Self::Nat(n) => n.fmt(f),
            Self::Fresh(n) => write!(f, "?p{}", n),
        }
    }
}

/// Structural description of a term: an operator applied to interned children.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Data {
    pub op: Op,
    pub children: Vec<Term>,
}

/// Handle to an interned term.
///
/// Handles are minted exclusively by a [`crate::Terms`] store.
/// Two terms from the same store are structurally equal
/// if and only if their handles are equal, so
/// equality and hashing go by handle, never by structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term(pub(crate) u32);
