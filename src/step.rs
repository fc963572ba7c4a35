use crate::{Rule, Term};

/// Justification of a conclusion: a rule applied to premises and arguments.
///
/// Premises are the conclusions of other steps;
/// a step never refers to proof nodes directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub rule: Rule,
    pub premises: Vec<Term>,
    pub args: Vec<Term>,
}
