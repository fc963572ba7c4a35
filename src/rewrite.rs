//! Generic, rule-agnostic proof DAG rewriting.

use crate::node::{key, Node};
use crate::steps::Missing;
use crate::{Error, Rule, Steps, Term};
use fnv::FnvHashMap;
use std::rc::Rc;

/// Per-node decisions of a proof rewriting pass.
///
/// The engine owns the traversal;
/// the policy owns everything specific to the target rule vocabulary.
pub trait Policy {
    /// Whether the engine should offer this node to [`Policy::rewrite`].
    fn should_rewrite(&self, node: &Node) -> bool;

    /// Replace the step concluding `res` by steps registered into `out`.
    ///
    /// Premises are given by their (already rewritten) conclusions.
    /// `top` is true exactly when `res` is the conclusion of
    /// the whole derivation being processed.
    /// Return whether any step was registered;
    /// on change, `out` must justify `res`.
    fn rewrite(
        &mut self,
        res: Term,
        rule: Rule,
        premises: &[Term],
        args: &[Term],
        out: &mut Steps,
        top: bool,
    ) -> Result<bool, Error>;
}

/// Rewrite a proof DAG bottom-up under the given policy.
///
/// The traversal is post-order with an explicit stack:
/// every premise is fully processed before its parents, and
/// a memo table keyed by node identity guarantees that a shared premise
/// is rewritten exactly once per call, regardless of fan-in.
/// All traversal state is local to this call, so
/// independent jobs may run concurrently on separate derivations.
///
/// A node whose premises and step are left unchanged is reused as-is;
/// processing an already rewritten DAG hence returns it without
/// allocating a single node.
pub fn process<P: Policy>(root: &Rc<Node>, policy: &mut P) -> Result<Rc<Node>, Error> {
    let mut memo: FnvHashMap<usize, Rc<Node>> = Default::default();
    let mut todo = Vec::from([(root.clone(), false)]);
    while let Some((node, visited)) = todo.pop() {
        let k = key(&node);
        if memo.contains_key(&k) {
            continue;
        }
        if !visited {
            todo.push((node.clone(), true));
            for premise in node.premises.iter().rev() {
                if !memo.contains_key(&key(premise)) {
                    todo.push((premise.clone(), false));
                }
            }
            continue;
        }
        let top = Rc::ptr_eq(&node, root);
        let spliced = splice(&node, &memo);
        let done = offer(spliced, top, policy)?;
        memo.insert(k, done);
    }
    Ok(memo[&key(root)].clone())
}

/// Replace the premises of a node by their rewritten versions,
/// keeping the original instance if nothing changed.
fn splice(node: &Rc<Node>, memo: &FnvHashMap<usize, Rc<Node>>) -> Rc<Node> {
    let premises: Vec<Rc<Node>> = node.premises.iter().map(|p| memo[&key(p)].clone()).collect();
    let same = premises
        .iter()
        .zip(&node.premises)
        .all(|(new, old)| Rc::ptr_eq(new, old));
    if same {
        return node.clone();
    }
    Rc::new(Node {
        res: node.res,
        rule: node.rule,
        args: node.args.clone(),
        premises,
    })
}

/// Offer a node to the policy until it leaves it unchanged.
///
/// A changed top conclusion is re-offered, so a policy may
/// rewrite in several bounded rounds; the engine never retries
/// a node whose rewritten output is unchanged.
fn offer<P: Policy>(mut cur: Rc<Node>, top: bool, policy: &mut P) -> Result<Rc<Node>, Error> {
    loop {
        if !policy.should_rewrite(&cur) {
            return Ok(cur);
        }
        let premises: Vec<Term> = cur.premises.iter().map(|p| p.res).collect();
        let mut out = Steps::new();
        if !policy.rewrite(cur.res, cur.rule, &premises, &cur.args, &mut out, top)? {
            return Ok(cur);
        }
        trace!("rewrote step {} for {:?}", cur.rule, cur.res);
        // splice the already rewritten premises below the fresh steps
        let children: FnvHashMap<Term, Rc<Node>> =
            cur.premises.iter().map(|p| (p.res, p.clone())).collect();
        let next = out.resolve_with(cur.res, Missing::Forbid, |c| children.get(&c).cloned())?;
        if same(&next, &cur) {
            return Ok(cur);
        }
        cur = next;
    }
}

/// Structural equality of two steps, premises compared by conclusion.
fn same(a: &Node, b: &Node) -> bool {
    a.res == b.res
        && a.rule == b.rule
        && a.args == b.args
        && a.premises.len() == b.premises.len()
        && a.premises
            .iter()
            .zip(&b.premises)
            .all(|(x, y)| x.res == y.res)
}
