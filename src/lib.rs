//! Reconstruction of derivations into a small, independently checkable calculus.
//!
//! A solver's search procedure registers derivation steps in a [`Steps`]
//! store, over terms interned in a shared [`Terms`] store. From a registered
//! conclusion, [`Steps::resolve`] materialises an immutable, acyclic proof
//! DAG of [`Node`]s. The generic [`rewrite::process`] engine then rewrites
//! that DAG bottom-up under a [`Policy`]; the [`Translate`] policy turns
//! every reachable source rule into the target calculus, decomposing n-ary
//! steps into the binary forms the target checker accepts. The [`check`]
//! module recomputes what every step proves, so a translated DAG can be
//! validated end to end without trusting the translation.
//!
//! # Example
//!
//! Decompose an n-ary transitivity step into binary ones:
//!
//! ~~~
//! # use traduki::*;
//! let terms = Terms::new();
//! let syms: Vec<_> = ["a", "b", "c", "d"].iter().map(|s| terms.sym(s)).collect();
//! let eqs: Vec<_> = syms.windows(2).map(|w| terms.eq(w[0], w[1])).collect();
//! let goal = terms.eq(syms[0], syms[3]);
//!
//! let mut steps = Steps::new();
//! eqs.iter().for_each(|eq| {
//!     steps.assume(*eq);
//! });
//! steps.add(goal, Rule::Trans, eqs, Vec::new());
//!
//! let root = steps.resolve(goal, Missing::Forbid)?;
//! let out = rewrite::process(&root, &mut Translate::new(&terms))?;
//! assert_eq!(out.res, goal);
//! assert_eq!(out.premises.len(), 2);
//! validate(&out, &terms)?;
//! # Ok::<_, traduki::Error>(())
//! ~~~

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod check;
pub mod db;
pub mod error;
pub mod node;
pub mod rewrite;
pub mod rule;
pub mod step;
pub mod steps;
pub mod term;
pub mod terms;
pub mod translate;
mod trie;

pub use check::{check, validate};
pub use error::Error;
pub use node::{linearize, Node};
pub use rewrite::Policy;
pub use rule::{Checked, Rule};
pub use step::Step;
pub use steps::{Missing, Steps};
pub use term::{Data, Op, Term};
pub use terms::Terms;
pub use translate::Translate;
