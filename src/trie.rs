//! Discrimination trie over serialised term patterns.

use crate::term::Op;
use crate::{Term, Terms};
use fnv::FnvHashMap;

/// Token of a pattern, serialised in pre-order.
///
/// Structurally equivalent patterns serialise to equal token sequences,
/// so they share a prefix in the trie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    /// Operator; its serialised children follow, closed by [`Token::End`].
    Op(Op),
    /// Canonical pattern variable, matching one argument.
    Var(u32),
    /// Canonical list variable, matching the remaining arguments.
    List(u32),
    /// End of the enclosing operator's argument list.
    End,
}

/// A substitution from canonical variables to matched terms.
pub(crate) type Subst = FnvHashMap<u32, Term>;

/// Discrimination trie mapping serialised patterns to values.
///
/// Edges live in insertion order in a vector;
/// the fan-out per node is small, so a linear scan
/// beats hashing the tokens.
#[derive(Debug)]
pub(crate) struct Trie<A> {
    leaves: Vec<A>,
    edges: Vec<(Token, Trie<A>)>,
}

impl<A> Default for Trie<A> {
    fn default() -> Self {
        let leaves = Vec::new();
        let edges = Vec::new();
        Self { leaves, edges }
    }
}

/// Partially matched argument list of one operator.
///
/// `rest` holds the yet unmatched arguments in reverse,
/// so popping yields the next sibling.
#[derive(Clone)]
struct Level {
    op: Option<Op>,
    rest: Vec<Term>,
}

impl<A> Trie<A> {
    /// Register a value under a serialised pattern.
    pub fn insert(&mut self, pat: &[Token], value: A) {
        let mut cur = self;
        for tok in pat {
            let i = match cur.edges.iter().position(|(t, _)| t == tok) {
                Some(i) => i,
                None => {
                    cur.edges.push((tok.clone(), Default::default()));
                    cur.edges.len() - 1
                }
            };
            cur = &mut cur.edges[i].1;
        }
        cur.leaves.push(value);
    }

    /// Enumerate the values whose pattern matches `tm`, with substitutions.
    ///
    /// The walk is guided by the structure of `tm`: at each node, a literal
    /// descent on the head operator and the variable-binding descents are
    /// tried independently, each branch carrying its own substitution.
    /// A repeated variable must bind the same handle on every occurrence.
    ///
    /// `f` returns whether to continue; so does this function.
    pub fn matches<F>(&self, terms: &Terms, tm: Term, f: &mut F) -> bool
    where
        F: FnMut(&A, &Subst) -> bool,
    {
        let op = None;
        let root = Level { op, rest: Vec::from([tm]) };
        let mut todo = Vec::from([(self, Vec::from([root]), Subst::default())]);
        while let Some((trie, levels, subst)) = todo.pop() {
            if levels.is_empty() {
                for leaf in &trie.leaves {
                    if !f(leaf, &subst) {
                        return false;
                    }
                }
                continue;
            }
            // reversed, so branches are explored in insertion order
            for (tok, child) in trie.edges.iter().rev() {
                let mut levels = levels.clone();
                let mut subst = subst.clone();
                if step(terms, tok, &mut levels, &mut subst) {
                    todo.push((child, levels, subst));
                }
            }
        }
        true
    }
}

/// Advance a match branch by one token. Return whether the branch survives.
fn step(terms: &Terms, tok: &Token, levels: &mut Vec<Level>, subst: &mut Subst) -> bool {
    let Some(level) = levels.last_mut() else {
        return false;
    };
    match tok {
        Token::End => {
            if !level.rest.is_empty() {
                return false;
            }
            levels.pop();
            true
        }
        Token::Op(op) => {
            let Some(tm) = level.rest.pop() else {
                return false;
            };
            let data = terms.data(tm);
            if data.op != *op {
                return false;
            }
            let mut rest = data.children.clone();
            rest.reverse();
            let op = Some(op.clone());
            levels.push(Level { op, rest });
            true
        }
        Token::Var(v) => {
            let Some(tm) = level.rest.pop() else {
                return false;
            };
            bind(subst, *v, tm)
        }
        Token::List(v) => {
            // absorb the whole remaining suffix of the argument list
            let Some(op) = level.op.clone() else {
                return false;
            };
            let mut suffix = core::mem::take(&mut level.rest);
            suffix.reverse();
            let bound = match suffix.len() {
                // an empty suffix stands for the operator's identity element
                0 => match terms.identity(&op) {
                    Some(z) => z,
                    None => return false,
                },
                1 => suffix[0],
                _ => terms.intern(op, suffix),
            };
            bind(subst, *v, bound)
        }
    }
}

/// Extend the substitution, or check consistency by handle equality.
fn bind(subst: &mut Subst, v: u32, tm: Term) -> bool {
    match subst.get(&v) {
        Some(prev) => *prev == tm,
        None => {
            subst.insert(v, tm);
            true
        }
    }
}
