//! Scope-aware proof step store.

use crate::node::Node;
use crate::{Rule, Step, Term};
use fnv::{FnvHashMap, FnvHashSet};
use std::rc::Rc;

/// Immutable hash map for fast snapshots of the step table.
type ImHashMap<K, V> = im::hashmap::HashMap<K, V, fnv::FnvBuildHasher>;

/// What resolution does with a conclusion that has no registered step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Missing {
    /// Fail with [`Error::Missing`].
    Forbid,
    /// Admit the conclusion as an explicit unproven leaf,
    /// tagged [`Rule::Open`], for best-effort tooling.
    Open,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// No step for this conclusion, and it is not an assumption.
    Missing(Term),
    /// This conclusion transitively justifies itself.
    Circular(Term),
}

/// Map from conclusions to the steps justifying them,
/// mirroring the search procedure's backtracking.
///
/// Scopes follow a push/pop discipline:
/// [`Steps::close`] discards everything registered since the matching
/// [`Steps::open`], and a lookup never sees entries of a sibling scope.
/// Snapshots of the underlying `im` map make both operations cheap.
#[derive(Clone, Default)]
pub struct Steps {
    steps: ImHashMap<Term, Step>,
    saved: Vec<ImHashMap<Term, Step>>,
}

impl Steps {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register a justification for `conclusion`.
    ///
    /// The first registration wins;
    /// return whether the store changed.
    pub fn add(&mut self, conclusion: Term, rule: Rule, premises: Vec<Term>, args: Vec<Term>) -> bool {
        if self.steps.contains_key(&conclusion) {
            return false;
        }
        trace!("add step {} for {:?}", rule, conclusion);
        let step = Step { rule, premises, args };
        self.steps.insert(conclusion, step);
        true
    }

    /// Register a justification, overwriting any existing one.
    pub fn force(&mut self, conclusion: Term, rule: Rule, premises: Vec<Term>, args: Vec<Term>) -> bool {
        let step = Step { rule, premises, args };
        self.steps.insert(conclusion, step.clone()) != Some(step)
    }

    /// Register `conclusion` as a top-level assumption.
    pub fn assume(&mut self, conclusion: Term) -> bool {
        self.add(conclusion, Rule::Assume, Vec::new(), Vec::from([conclusion]))
    }

    pub fn contains(&self, conclusion: Term) -> bool {
        self.steps.contains_key(&conclusion)
    }

    pub fn get(&self, conclusion: Term) -> Option<&Step> {
        self.steps.get(&conclusion)
    }

    /// Open a scope: entries added from now on
    /// live until the matching [`Steps::close`].
    pub fn open(&mut self) {
        self.saved.push(self.steps.clone())
    }

    /// Close the innermost scope, discarding its entries.
    ///
    /// Return false if no scope was open.
    pub fn close(&mut self) -> bool {
        match self.saved.pop() {
            Some(prev) => {
                self.steps = prev;
                true
            }
            None => false,
        }
    }

    /// Materialise the proof DAG for `conclusion`.
    ///
    /// Premises are resolved recursively (with an explicit stack, since
    /// derivations can be arbitrarily deep); a premise reachable from
    /// multiple parents becomes one shared node.
    pub fn resolve(&self, conclusion: Term, missing: Missing) -> Result<Rc<Node>, Error> {
        self.resolve_with(conclusion, missing, |_| None)
    }

    /// Like [`Steps::resolve`], but premises without a registered step are
    /// first looked up in `fallback`, which may splice in existing nodes.
    pub(crate) fn resolve_with<F>(
        &self,
        conclusion: Term,
        missing: Missing,
        fallback: F,
    ) -> Result<Rc<Node>, Error>
    where
        F: Fn(Term) -> Option<Rc<Node>>,
    {
        let mut done: FnvHashMap<Term, Rc<Node>> = Default::default();
        let mut path: FnvHashSet<Term> = Default::default();
        let mut todo = Vec::from([(conclusion, false)]);
        while let Some((conc, visited)) = todo.pop() {
            if visited {
                path.remove(&conc);
                if done.contains_key(&conc) {
                    continue;
                }
                // the step exists and all its premises are resolved
                let step = self.get(conc).ok_or(Error::Missing(conc))?;
                let premises = step.premises.iter().map(|p| done[p].clone()).collect();
                let node = Node {
                    res: conc,
                    rule: step.rule,
                    args: step.args.clone(),
                    premises,
                };
                done.insert(conc, Rc::new(node));
                continue;
            }
            if done.contains_key(&conc) {
                continue;
            }
            match self.get(conc) {
                Some(step) => {
                    if !path.insert(conc) {
                        return Err(Error::Circular(conc));
                    }
                    todo.push((conc, true));
                    for p in step.premises.iter().rev() {
                        if !done.contains_key(p) {
                            todo.push((*p, false));
                        }
                    }
                }
                None => match fallback(conc) {
                    Some(node) => {
                        done.insert(conc, node);
                    }
                    None => match missing {
                        Missing::Forbid => return Err(Error::Missing(conc)),
                        Missing::Open => {
                            let node = Node {
                                res: conc,
                                rule: Rule::Open,
                                args: Vec::from([conc]),
                                premises: Vec::new(),
                            };
                            done.insert(conc, Rc::new(node));
                        }
                    },
                },
            }
        }
        Ok(done[&conclusion].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Terms;

    fn setup() -> (Terms, Term, Term) {
        let terms = Terms::new();
        let ab = terms.eq(terms.sym("a"), terms.sym("b"));
        let ba = terms.eq(terms.sym("b"), terms.sym("a"));
        (terms, ab, ba)
    }

    #[test]
    fn first_registration_wins() {
        let (_terms, ab, ba) = setup();
        let mut steps = Steps::new();
        assert!(steps.assume(ab));
        assert!(!steps.add(ab, Rule::Symm, Vec::from([ba]), Vec::new()));
        assert_eq!(steps.get(ab).unwrap().rule, Rule::Assume);

        assert!(steps.force(ab, Rule::Symm, Vec::from([ba]), Vec::new()));
        assert_eq!(steps.get(ab).unwrap().rule, Rule::Symm);
    }

    #[test]
    fn scopes_are_discarded() {
        let (_terms, ab, ba) = setup();
        let mut steps = Steps::new();
        steps.assume(ab);

        steps.open();
        steps.assume(ba);
        assert!(steps.contains(ba));
        assert!(steps.close());

        // the sibling scope never sees `ba`
        steps.open();
        assert!(!steps.contains(ba));
        assert!(steps.contains(ab));
        assert!(steps.close());
        assert!(!steps.close());
    }

    #[test]
    fn resolve_missing() {
        let (_terms, ab, ba) = setup();
        let mut steps = Steps::new();
        steps.add(ba, Rule::Symm, Vec::from([ab]), Vec::new());

        assert_eq!(steps.resolve(ba, Missing::Forbid).unwrap_err(), Error::Missing(ab));

        let root = steps.resolve(ba, Missing::Open).unwrap();
        assert_eq!(root.premises[0].rule, Rule::Open);
        assert_eq!(root.premises[0].args, Vec::from([ab]));
    }

    #[test]
    fn resolve_rejects_cycles() {
        let (_terms, ab, ba) = setup();
        let mut steps = Steps::new();
        steps.add(ab, Rule::Symm, Vec::from([ba]), Vec::new());
        steps.add(ba, Rule::Symm, Vec::from([ab]), Vec::new());
        assert!(matches!(
            steps.resolve(ab, Missing::Forbid),
            Err(Error::Circular(_))
        ));
    }
}
