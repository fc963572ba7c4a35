//! Materialised proof DAGs.

use crate::{Rule, Term};
use fnv::FnvHashSet;
use std::rc::Rc;

/// Node of a proof DAG.
///
/// A conclusion reachable from multiple parents is one shared instance;
/// nodes are immutable once built and
/// acyclic by construction (see [`crate::Steps::resolve`]).
#[derive(Debug)]
pub struct Node {
    /// What this step proves.
    pub res: Term,
    pub rule: Rule,
    pub args: Vec<Term>,
    /// Resolved premises, in the order the step registered them.
    pub premises: Vec<Rc<Node>>,
}

/// Identity of a node, for memoisation.
pub(crate) fn key(node: &Rc<Node>) -> usize {
    Rc::as_ptr(node) as usize
}

/// Post-order linearisation of a DAG:
/// every premise strictly before each node using it, each shared node once.
///
/// The order is deterministic for a given DAG, so a linear consumer
/// sees every definition before its use.
pub fn linearize(root: &Rc<Node>) -> Vec<Rc<Node>> {
    let mut out = Vec::new();
    let mut seen = FnvHashSet::default();
    let mut todo = Vec::from([(root.clone(), false)]);
    while let Some((node, visited)) = todo.pop() {
        if visited {
            out.push(node);
            continue;
        }
        if !seen.insert(key(&node)) {
            continue;
        }
        todo.push((node.clone(), true));
        for premise in node.premises.iter().rev() {
            if !seen.contains(&key(premise)) {
                todo.push((premise.clone(), false));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Missing, Steps, Terms};

    #[test]
    fn linearize_diamond() {
        let terms = Terms::new();
        let (a, b, c) = (terms.sym("a"), terms.sym("b"), terms.sym("c"));
        let (ab, bc) = (terms.eq(a, b), terms.eq(b, c));
        let ba = terms.eq(b, a);
        let ac = terms.eq(a, c);

        let mut steps = Steps::new();
        steps.assume(ab);
        // `ab` is shared between the symmetry step and the transitivity step
        steps.add(ba, Rule::Symm, Vec::from([ab]), Vec::new());
        steps.add(bc, Rule::Symm, Vec::from([ba]), Vec::new());
        steps.add(ac, Rule::Trans, Vec::from([ab, bc]), Vec::new());

        let root = steps.resolve(ac, Missing::Forbid).unwrap();
        let order = linearize(&root);

        assert_eq!(order.len(), 4);
        assert_eq!(order.last().unwrap().res, ac);
        // premises come before their users
        for (i, node) in order.iter().enumerate() {
            for premise in &node.premises {
                assert!(order[..i].iter().any(|n| Rc::ptr_eq(n, premise)));
            }
        }
        // the shared assumption appears exactly once
        let shared = order.iter().filter(|n| n.res == ab).count();
        assert_eq!(shared, 1);
    }
}
