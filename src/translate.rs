//! Translation of source rules into the target calculus.

use crate::check::{self, check, eq_parts};
use crate::node::Node;
use crate::rewrite::Policy;
use crate::rule::Checked;
use crate::term::Op;
use crate::{Rule, Steps, Term, Terms};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// A reachable rule tag has no translation.
    Unhandled(Rule),
}

/// The target-calculus policy.
///
/// Every rule tag has an explicit case:
/// either the step is already valid in the target calculus, or
/// it is decomposed into steps that are, or
/// translation fails with [`Error::Unhandled`].
pub struct Translate<'t> {
    terms: &'t Terms,
}

impl<'t> Translate<'t> {
    pub fn new(terms: &'t Terms) -> Self {
        Self { terms }
    }

    /// Register a target-calculus step.
    ///
    /// Its conclusion becomes the first argument,
    /// so the step is self-certifying for the checker and the printer.
    fn add_checked(&self, out: &mut Steps, conc: Term, premises: Vec<Term>, rule: Checked, args: Vec<Term>) {
        let mut all = Vec::from([conc]);
        all.extend(args);
        out.add(conc, Rule::Checked(rule), premises, all);
    }

    /// Right-associated binary chain of an n-ary argument list,
    /// seeded with the operator's identity element if it has one.
    fn chain(&self, op: Op, children: &[Term]) -> Term {
        let n = children.len();
        let (mut ret, mut i) = match self.terms.identity(&op) {
            Some(z) => (z, 0),
            None => (children[n - 1], 1),
        };
        while i < n {
            ret = self.terms.intern(op.clone(), Vec::from([children[n - 1 - i], ret]));
            i += 1;
        }
        ret
    }

    /// Fold an n-ary, left-associative rule into binary applications.
    ///
    /// Intermediate conclusions are recomputed by the checking function;
    /// the final one must be exactly the original conclusion.
    fn fold(
        &self,
        rule: Rule,
        res: Term,
        premises: &[Term],
        args: &[Term],
        out: &mut Steps,
    ) -> Result<(), crate::Error> {
        let mut cur = premises[0];
        for i in 1..premises.len() {
            let pair = match args.is_empty() {
                true => Vec::new(),
                false => Vec::from([args[2 * i - 2], args[2 * i - 1]]),
            };
            let next = check(self.terms, rule, &[cur, premises[i]], &pair)?;
            out.add(next, rule, Vec::from([cur, premises[i]]), pair);
            cur = next;
        }
        if cur != res {
            return Err(check::Error::Conclusion(res).into());
        }
        Ok(())
    }
}

impl<'t> Policy for Translate<'t> {
    fn should_rewrite(&self, node: &Node) -> bool {
        !matches!(node.rule, Rule::Checked(_))
    }

    fn rewrite(
        &mut self,
        res: Term,
        rule: Rule,
        premises: &[Term],
        args: &[Term],
        out: &mut Steps,
        top: bool,
    ) -> Result<bool, crate::Error> {
        match rule {
            // already valid in the target calculus
            Rule::Assume | Rule::Resolution | Rule::Refl | Rule::Rewrite(_) | Rule::Open => Ok(false),
            // never offered, but the dispatch stays exhaustive
            Rule::Checked(_) => Ok(false),
            Rule::Symm => {
                // positive equality symmetry needs no conversion;
                // a disequality routes to the alternate target rule
                if self.terms.data(res).op != Op::Not {
                    return Ok(false);
                }
                let [p] = premises else {
                    return Err(check::Error::Arity(rule).into());
                };
                self.add_checked(out, res, Vec::from([*p]), Checked::NegSymm, Vec::new());
                Ok(true)
            }
            Rule::Trans => {
                if premises.len() <= 2 {
                    return Ok(false);
                }
                self.fold(Rule::Trans, res, premises, &[], out)?;
                Ok(true)
            }
            Rule::ChainResolution => {
                if premises.len() < 2 || args.len() != 2 * (premises.len() - 1) {
                    return Err(check::Error::Arity(rule).into());
                }
                self.fold(Rule::Resolution, res, premises, args, out)?;
                Ok(true)
            }
            Rule::Scope => {
                // the top-most discharge fires once, untouched
                if top {
                    return Ok(false);
                }
                let [p] = premises else {
                    return Err(check::Error::Arity(rule).into());
                };
                let n = args.len();
                if n == 0 {
                    return Err(check::Error::Arity(rule).into());
                }
                // nest single-hypothesis discharges, innermost first;
                // each binder level concludes a fresh placeholder, since
                // the target calculus insists on a concrete conclusion
                // even for an abstraction step
                let mut cur = *p;
                for i in 0..n {
                    let hyp = args[n - 1 - i];
                    let fconc = self.terms.fresh();
                    self.add_checked(out, fconc, Vec::from([cur]), Checked::Pi, Vec::from([hyp]));
                    let next = match i + 1 == n {
                        true => res,
                        false => check(self.terms, Rule::Scope, &[cur], &[hyp])?,
                    };
                    self.add_checked(out, next, Vec::from([fconc]), Checked::Scope, Vec::new());
                    cur = next;
                }
                Ok(true)
            }
            Rule::Cong => {
                let (lhs, _) = eq_parts(self.terms, res)?;
                let op = self.terms.data(lhs).op.clone();
                let n = premises.len();
                if n == 0 {
                    return Err(check::Error::Arity(rule).into());
                }
                let mut sides = Vec::with_capacity(n);
                for p in premises {
                    sides.push(eq_parts(self.terms, *p)?);
                }
                // fold over the binary application encoding:
                // seed with reflexivity on the identity element if there
                // is one, otherwise with the last argument's justification
                let (mut cl, mut cr, mut cur, start) = match self.terms.identity(&op) {
                    Some(z) => {
                        let zeq = self.terms.eq(z, z);
                        out.add(zeq, Rule::Refl, Vec::new(), Vec::from([z]));
                        (z, z, zeq, 0)
                    }
                    None if n == 1 => {
                        self.add_checked(out, res, Vec::from([premises[0]]), Checked::Cong, Vec::new());
                        return Ok(true);
                    }
                    None => {
                        let (a, b) = sides[n - 1];
                        (a, b, premises[n - 1], 1)
                    }
                };
                for i in start..n {
                    let ii = n - 1 - i;
                    let (a, b) = sides[ii];
                    cl = self.terms.app(a, cl);
                    cr = self.terms.app(b, cr);
                    let next = match ii == 0 {
                        true => res,
                        false => self.terms.eq(cl, cr),
                    };
                    self.add_checked(out, next, Vec::from([premises[ii], cur]), Checked::Cong, Vec::new());
                    cur = next;
                }
                Ok(true)
            }
            Rule::AndElim => {
                let [p] = premises else {
                    return Err(check::Error::Arity(rule).into());
                };
                let idx = args.first().copied().ok_or(check::Error::Arity(rule))?;
                let i = match self.terms.data(idx).op {
                    Op::Nat(i) => i as usize,
                    _ => return Err(check::Error::Premise(idx).into()),
                };
                let data = self.terms.data(*p);
                if data.op != Op::And || i >= data.children.len() {
                    return Err(check::Error::Premise(*p).into());
                }
                // rebuild the flat conjunction as a right-associated chain,
                // take i right projections, then one left projection
                let chain = self.chain(Op::And, &data.children);
                let mut cur = *p;
                for j in 0..i {
                    let rest = match j == 0 {
                        true => self.terms.data(chain).children[1],
                        false => self.terms.data(cur).children[1],
                    };
                    self.add_checked(out, rest, Vec::from([cur]), Checked::AndElim2, Vec::new());
                    cur = rest;
                }
                if self.terms.data(cur).children.first() != Some(&res) {
                    return Err(check::Error::Conclusion(res).into());
                }
                self.add_checked(out, res, Vec::from([cur]), Checked::AndElim1, Vec::new());
                Ok(true)
            }
            Rule::Trust => Err(Error::Unhandled(rule).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::linearize;
    use crate::{check::validate, rewrite, Missing};
    use std::rc::Rc;

    fn count(root: &Rc<Node>, rule: Rule) -> usize {
        linearize(root).iter().filter(|n| n.rule == rule).count()
    }

    #[test]
    fn trans_chain_decomposition() {
        let terms = Terms::new();
        let es: Vec<Term> = (1..=4).map(|i| terms.sym(&format!("e{}", i))).collect();
        let eqs: Vec<Term> = es.windows(2).map(|w| terms.eq(w[0], w[1])).collect();
        let res = terms.eq(es[0], es[3]);

        let mut steps = Steps::new();
        eqs.iter().for_each(|eq| {
            steps.assume(*eq);
        });
        steps.add(res, Rule::Trans, eqs.clone(), Vec::new());

        let root = steps.resolve(res, Missing::Forbid).unwrap();
        let out = rewrite::process(&root, &mut Translate::new(&terms)).unwrap();

        validate(&out, &terms).unwrap();
        assert_eq!(out.res, res);
        // n premises fold into n-1 binary steps
        assert_eq!(count(&out, Rule::Trans), 2);
        assert_eq!(out.premises.len(), 2);
    }

    #[test]
    fn chain_resolution_decomposition() {
        let terms = Terms::new();
        let (p, q, r) = (terms.sym("p"), terms.sym("q"), terms.sym("r"));
        let c1 = terms.or(Vec::from([p, q]));
        let c2 = terms.or(Vec::from([terms.not_(p), r]));
        let c3 = terms.not_(q);
        let t = terms.truth();

        let mut steps = Steps::new();
        [c1, c2, c3].iter().for_each(|c| {
            steps.assume(*c);
        });
        steps.add(
            r,
            Rule::ChainResolution,
            Vec::from([c1, c2, c3]),
            Vec::from([t, p, t, q]),
        );

        let root = steps.resolve(r, Missing::Forbid).unwrap();
        let out = rewrite::process(&root, &mut Translate::new(&terms)).unwrap();

        validate(&out, &terms).unwrap();
        assert_eq!(out.res, r);
        assert_eq!(count(&out, Rule::Resolution), 2);
    }

    #[test]
    fn congruence_with_identity() {
        let terms = Terms::new();
        let sides: Vec<(Term, Term)> = (1..=3)
            .map(|i| (terms.sym(&format!("a{}", i)), terms.sym(&format!("b{}", i))))
            .collect();
        let eqs: Vec<Term> = sides.iter().map(|(a, b)| terms.eq(*a, *b)).collect();
        let lhs = terms.or(sides.iter().map(|(a, _)| *a).collect());
        let rhs = terms.or(sides.iter().map(|(_, b)| *b).collect());
        let res = terms.eq(lhs, rhs);
        let tok = terms.intern(Op::Or, Vec::new());

        let mut steps = Steps::new();
        eqs.iter().for_each(|eq| {
            steps.assume(*eq);
        });
        steps.add(res, Rule::Cong, eqs.clone(), Vec::from([tok]));

        let root = steps.resolve(res, Missing::Forbid).unwrap();
        let out = rewrite::process(&root, &mut Translate::new(&terms)).unwrap();

        validate(&out, &terms).unwrap();
        assert_eq!(out.res, res);
        // 1 seed reflexivity on the identity plus one fold step per argument
        assert_eq!(count(&out, Rule::Refl), 1);
        assert_eq!(count(&out, Rule::Checked(Checked::Cong)), 3);
    }

    #[test]
    fn congruence_without_identity() {
        let terms = Terms::new();
        let (a1, b1) = (terms.sym("a1"), terms.sym("b1"));
        let (a2, b2) = (terms.sym("a2"), terms.sym("b2"));
        let eqs = Vec::from([terms.eq(a1, b1), terms.eq(a2, b2)]);
        let f = |x, y| terms.intern(Op::Sym("f".into()), Vec::from([x, y]));
        let res = terms.eq(f(a1, a2), f(b1, b2));
        let tok = terms.sym("f");

        let mut steps = Steps::new();
        eqs.iter().for_each(|eq| {
            steps.assume(*eq);
        });
        steps.add(res, Rule::Cong, eqs.clone(), Vec::from([tok]));

        let root = steps.resolve(res, Missing::Forbid).unwrap();
        let out = rewrite::process(&root, &mut Translate::new(&terms)).unwrap();

        validate(&out, &terms).unwrap();
        assert_eq!(out.res, res);
        // seeded with the last argument, one fold step remains
        assert_eq!(count(&out, Rule::Refl), 0);
        assert_eq!(count(&out, Rule::Checked(Checked::Cong)), 1);
    }

    #[test]
    fn scope_nesting() {
        let terms = Terms::new();
        let (h1, h2, h3, g) = (
            terms.sym("h1"),
            terms.sym("h2"),
            terms.sym("h3"),
            terms.sym("g"),
        );
        let inner = terms.imp(terms.and(Vec::from([h1, h2])), g);
        let outer = terms.imp(h3, inner);

        let mut steps = Steps::new();
        steps.assume(g);
        steps.add(inner, Rule::Scope, Vec::from([g]), Vec::from([h1, h2]));
        steps.add(outer, Rule::Scope, Vec::from([inner]), Vec::from([h3]));

        let root = steps.resolve(outer, Missing::Forbid).unwrap();
        let out = rewrite::process(&root, &mut Translate::new(&terms)).unwrap();

        validate(&out, &terms).unwrap();
        // the top-most discharge stays, the nested one is unfolded
        assert_eq!(out.rule, Rule::Scope);
        assert_eq!(out.premises[0].res, inner);
        assert_eq!(count(&out, Rule::Checked(Checked::Pi)), 2);
        assert_eq!(count(&out, Rule::Checked(Checked::Scope)), 2);
        // every binder level concludes a distinct placeholder
        let pis: Vec<Term> = linearize(&out)
            .iter()
            .filter(|n| n.rule == Rule::Checked(Checked::Pi))
            .map(|n| n.res)
            .collect();
        assert_ne!(pis[0], pis[1]);
    }

    #[test]
    fn and_elim_projection() {
        let terms = Terms::new();
        let fs: Vec<Term> = (1..=3).map(|i| terms.sym(&format!("f{}", i))).collect();
        let conj = terms.and(fs.clone());

        for (i, expected) in fs.iter().enumerate() {
            let mut steps = Steps::new();
            steps.assume(conj);
            steps.add(
                *expected,
                Rule::AndElim,
                Vec::from([conj]),
                Vec::from([terms.nat(i as u64)]),
            );

            let root = steps.resolve(*expected, Missing::Forbid).unwrap();
            let out = rewrite::process(&root, &mut Translate::new(&terms)).unwrap();

            validate(&out, &terms).unwrap();
            assert_eq!(out.res, *expected);
            // i right projections, then exactly one left projection
            assert_eq!(count(&out, Rule::Checked(Checked::AndElim2)), i);
            assert_eq!(count(&out, Rule::Checked(Checked::AndElim1)), 1);
        }
    }

    #[test]
    fn symm_polarity() {
        let terms = Terms::new();
        let (a, b) = (terms.sym("a"), terms.sym("b"));

        // positive equality symmetry passes through
        let (ab, ba) = (terms.eq(a, b), terms.eq(b, a));
        let mut steps = Steps::new();
        steps.assume(ab);
        steps.add(ba, Rule::Symm, Vec::from([ab]), Vec::new());
        let root = steps.resolve(ba, Missing::Forbid).unwrap();
        let out = rewrite::process(&root, &mut Translate::new(&terms)).unwrap();
        assert!(Rc::ptr_eq(&out, &root));

        // a disequality routes to the alternate rule
        let (nab, nba) = (terms.not_(ab), terms.not_(ba));
        let mut steps = Steps::new();
        steps.assume(nab);
        steps.add(nba, Rule::Symm, Vec::from([nab]), Vec::new());
        let root = steps.resolve(nba, Missing::Forbid).unwrap();
        let out = rewrite::process(&root, &mut Translate::new(&terms)).unwrap();
        validate(&out, &terms).unwrap();
        assert_eq!(out.rule, Rule::Checked(Checked::NegSymm));
        assert_eq!(out.args[0], nba);
    }

    #[test]
    fn unhandled_rule_names_the_tag() {
        let terms = Terms::new();
        let p = terms.sym("p");
        let mut steps = Steps::new();
        steps.add(p, Rule::Trust, Vec::new(), Vec::from([p]));

        let root = steps.resolve(p, Missing::Forbid).unwrap();
        let err = rewrite::process(&root, &mut Translate::new(&terms)).unwrap_err();
        assert_eq!(
            err,
            crate::Error::Translate(Error::Unhandled(Rule::Trust))
        );
    }
}
