//! The checking function: recomputing what a step proves.

use crate::node::Node;
use crate::term::Op;
use crate::{Rule, Term, Terms};
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Wrong number of premises or arguments for the rule.
    Arity(Rule),
    /// A premise or argument does not have the required shape.
    Premise(Term),
    /// The recomputed conclusion differs from the recorded one.
    ///
    /// This indicates an upstream soundness bug, not a user error.
    Conclusion(Term),
}

/// Split an equality into its sides.
pub(crate) fn eq_parts(terms: &Terms, tm: Term) -> Result<(Term, Term), Error> {
    let data = terms.data(tm);
    match data.op {
        Op::Eq => Ok((data.children[0], data.children[1])),
        _ => Err(Error::Premise(tm)),
    }
}

/// Recompute the conclusion of a step from its rule, premises and arguments.
///
/// Premises are given by their conclusions.
/// For every rule of the source calculus this derives the conclusion
/// structurally; steps tagged [`Rule::Checked`] (and the other
/// self-certifying tags) carry their conclusion as their first argument.
pub fn check(terms: &Terms, rule: Rule, premises: &[Term], args: &[Term]) -> Result<Term, Error> {
    match rule {
        Rule::Assume | Rule::Open | Rule::Trust | Rule::Rewrite(_) | Rule::Checked(_) => {
            args.first().copied().ok_or(Error::Arity(rule))
        }
        Rule::Refl => {
            let tm = args.first().copied().ok_or(Error::Arity(rule))?;
            Ok(terms.eq(tm, tm))
        }
        Rule::Symm => {
            let [p] = premises else { return Err(Error::Arity(rule)) };
            let data = terms.data(*p);
            match data.op {
                Op::Eq => Ok(terms.eq(data.children[1], data.children[0])),
                Op::Not => {
                    let (a, b) = eq_parts(terms, data.children[0])?;
                    Ok(terms.not_(terms.eq(b, a)))
                }
                _ => Err(Error::Premise(*p)),
            }
        }
        Rule::Trans => {
            if premises.len() < 2 {
                return Err(Error::Arity(rule));
            }
            let (first, mut cur) = eq_parts(terms, premises[0])?;
            for p in &premises[1..] {
                let (l, r) = eq_parts(terms, *p)?;
                if l != cur {
                    return Err(Error::Premise(*p));
                }
                cur = r;
            }
            Ok(terms.eq(first, cur))
        }
        Rule::Cong => {
            let tok = args.first().copied().ok_or(Error::Arity(rule))?;
            let data = terms.data(tok);
            if !data.children.is_empty() {
                return Err(Error::Premise(tok));
            }
            if premises.is_empty() {
                return Err(Error::Arity(rule));
            }
            let mut lhs = Vec::with_capacity(premises.len());
            let mut rhs = Vec::with_capacity(premises.len());
            for p in premises {
                let (a, b) = eq_parts(terms, *p)?;
                lhs.push(a);
                rhs.push(b);
            }
            let op = data.op.clone();
            Ok(terms.eq(terms.intern(op.clone(), lhs), terms.intern(op, rhs)))
        }
        Rule::Scope => {
            let [p] = premises else { return Err(Error::Arity(rule)) };
            if args.is_empty() {
                return Err(Error::Arity(rule));
            }
            let ant = match args {
                [h] => *h,
                _ => terms.and(args.to_vec()),
            };
            if *p == terms.falsity() {
                Ok(terms.not_(ant))
            } else {
                Ok(terms.imp(ant, *p))
            }
        }
        Rule::AndElim => {
            let [p] = premises else { return Err(Error::Arity(rule)) };
            let idx = args.first().copied().ok_or(Error::Arity(rule))?;
            let i = match terms.data(idx).op {
                Op::Nat(i) => i as usize,
                _ => return Err(Error::Premise(idx)),
            };
            let data = terms.data(*p);
            if data.op != Op::And {
                return Err(Error::Premise(*p));
            }
            data.children.get(i).copied().ok_or(Error::Premise(idx))
        }
        Rule::Resolution => {
            let ([c1, c2], [pol, lit]) = (premises, args) else {
                return Err(Error::Arity(rule));
            };
            resolve(terms, *c1, *c2, *pol, *lit)
        }
        Rule::ChainResolution => {
            let k = premises.len();
            if k < 2 || args.len() != 2 * (k - 1) {
                return Err(Error::Arity(rule));
            }
            let mut cur = premises[0];
            for i in 1..k {
                cur = resolve(terms, cur, premises[i], args[2 * i - 2], args[2 * i - 1])?;
            }
            Ok(cur)
        }
    }
}

/// Binary clause resolution.
///
/// If the polarity is true, the literal occurs in the first clause and
/// its complement in the second; otherwise the roles are swapped.
/// Every occurrence of the pivot is removed from its clause.
/// A premise that *is* its pivot form counts as a unit clause,
/// even when it is itself a disjunction.
fn resolve(terms: &Terms, c1: Term, c2: Term, pol: Term, lit: Term) -> Result<Term, Error> {
    let pos = if pol == terms.truth() {
        true
    } else if pol == terms.falsity() {
        false
    } else {
        return Err(Error::Premise(pol));
    };
    let (piv1, piv2) = if pos {
        (lit, terms.complement(lit))
    } else {
        (terms.complement(lit), lit)
    };
    let mut lits = Vec::new();
    extend(terms, &mut lits, c1, piv1);
    extend(terms, &mut lits, c2, piv2);
    Ok(match lits.len() {
        0 => terms.falsity(),
        1 => lits[0],
        _ => terms.or(lits),
    })
}

/// Append the literals of `clause` without the pivot.
fn extend(terms: &Terms, lits: &mut Vec<Term>, clause: Term, pivot: Term) {
    if clause == pivot {
        return;
    }
    let data = terms.data(clause);
    match data.op {
        Op::Or => lits.extend(data.children.iter().filter(|l| **l != pivot)),
        _ => lits.push(clause),
    }
}

/// Verify that every node of a DAG concludes
/// exactly what the checking function derives for it.
pub fn validate(root: &Rc<Node>, terms: &Terms) -> Result<(), Error> {
    for node in crate::node::linearize(root) {
        let premises: Vec<Term> = node.premises.iter().map(|p| p.res).collect();
        let conc = check(terms, node.rule, &premises, &node.args)?;
        if conc != node.res {
            return Err(Error::Conclusion(node.res));
        }
    }
    Ok(())
}
