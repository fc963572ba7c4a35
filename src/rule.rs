//! Rule tags of derivation steps.

use core::fmt::{self, Display};

/// Rule tag of a derivation step.
///
/// This is the closed set of rules the search layer registers;
/// the translation policy dispatches on it exhaustively, so that
/// a reachable tag without a translation is a hard failure,
/// never a silent skip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Top-level assumption; concludes its argument.
    Assume,
    /// Discharge of n hypotheses at once.
    Scope,
    /// Binary clause resolution with pivot polarity and literal as arguments.
    Resolution,
    /// Left-associated resolution of k premises with k-1 pivot pairs.
    ChainResolution,
    /// Reflexivity of equality.
    Refl,
    /// Symmetry of (dis)equality.
    Symm,
    /// Transitivity over adjacent equalities, possibly n-ary.
    Trans,
    /// Congruence over an n-ary operator.
    Cong,
    /// Selection of the i-th conjunct of a flattened conjunction.
    AndElim,
    /// Equality justified by a rule of the rewrite database.
    Rewrite(crate::db::Id),
    /// Unelaborated theory lemma. Reachable, but has no translation.
    Trust,
    /// Unproven leaf, admitted by [`crate::steps::Missing::Open`].
    Open,
    /// Step already expressed in the target calculus.
    Checked(Checked),
}

/// Rules of the target calculus.
///
/// Every `Checked` step is self-certifying:
/// its conclusion is its first argument, further arguments follow.
/// This is the contract the downstream printer serialises against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Checked {
    /// Hypothesis binder; concludes a fresh placeholder proposition.
    Pi,
    /// Single-hypothesis discharge.
    Scope,
    /// Symmetry of a disequality.
    NegSymm,
    /// Binary congruence over the application encoding.
    Cong,
    /// Left projection of a binary conjunction.
    AndElim1,
    /// Right projection of a binary conjunction.
    AndElim2,
}

impl Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Assume => "assume".fmt(f),
            Self::Scope => "scope".fmt(f),
            Self::Resolution => "resolution".fmt(f),
            Self::ChainResolution => "chain_resolution".fmt(f),
            Self::Refl => "refl".fmt(f),
            Self::Symm => "symm".fmt(f),
            Self::Trans => "trans".fmt(f),
            Self::Cong => "cong".fmt(f),
            Self::AndElim => "and_elim".fmt(f),
            Self::Rewrite(id) => write!(f, "rewrite:{}", id),
            Self::Trust => "trust".fmt(f),
            Self::Open => "open".fmt(f),
            Self::Checked(c) => c.fmt(f),
        }
    }
}

impl Display for Checked {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Pi => "check.pi".fmt(f),
            Self::Scope => "check.scope".fmt(f),
            Self::NegSymm => "check.neg_symm".fmt(f),
            Self::Cong => "check.cong".fmt(f),
            Self::AndElim1 => "check.and_elim1".fmt(f),
            Self::AndElim2 => "check.and_elim2".fmt(f),
        }
    }
}
