//! Rewrite rule database with indexed left-hand sides.

use crate::term::Op;
use crate::trie::{Token, Trie};
use crate::{Term, Terms};
use fnv::FnvHashMap;
use core::fmt::{self, Display};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// An entry of the variable list is not a schematic variable.
    Variable(Term),
    /// The pattern contains a variable missing from the variable list.
    Unbound(Term),
    /// A list variable occurs before the end of an argument list.
    ListPosition(Term),
    /// The pattern head is a variable, so it cannot be indexed.
    Headless(Term),
}

/// Dense identifier of a registered rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Id(u32);

impl Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered rewrite rule.
#[derive(Debug)]
pub struct Rule {
    pub name: Box<str>,
    /// Free variables, in registration order.
    pub vars: Vec<Term>,
    pub lhs: Term,
    pub rhs: Term,
    /// Side condition to be discharged by whoever instantiates the rule.
    pub cond: Option<Term>,
    /// Canonical variable index to original variable.
    canon: Vec<Term>,
}

/// Decides which schematic variables are list variables.
///
/// A list variable matches the variable-length tail
/// of an n-ary argument list instead of a single argument.
pub trait Classify {
    fn is_list(&self, name: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Classify for F {
    fn is_list(&self, name: &str) -> bool {
        self(name)
    }
}

/// Rule database, indexing left-hand sides for retrieval by target term.
///
/// Registration canonicalises pattern variables to first-occurrence
/// order, so structurally equivalent patterns share trie prefixes
/// regardless of how their authors named the variables.
pub struct Db<C> {
    classify: C,
    rules: Vec<Rule>,
    index: Trie<Id>,
}

impl<C: Classify> Db<C> {
    pub fn new(classify: C) -> Self {
        let rules = Vec::new();
        let index = Default::default();
        Self { classify, rules, index }
    }

    /// Register a rule and index its left-hand side.
    pub fn add(
        &mut self,
        terms: &Terms,
        name: &str,
        vars: Vec<Term>,
        lhs: Term,
        rhs: Term,
        cond: Option<Term>,
    ) -> Result<Id, Error> {
        for v in &vars {
            if !matches!(terms.data(*v).op, Op::Var(_)) {
                return Err(Error::Variable(*v));
            }
        }
        let (tokens, canon) = self.tokenize(terms, lhs, &vars)?;
        let id = Id(self.rules.len() as u32);
        trace!("add rule {} ({}): {}", id, name, terms.show(lhs));
        self.index.insert(&tokens, id);
        let (name, vars) = (name.into(), vars);
        self.rules.push(Rule { name, vars, lhs, rhs, cond, canon });
        Ok(id)
    }

    /// Obtain a registered rule.
    ///
    /// The id must stem from this database.
    pub fn get(&self, id: Id) -> &Rule {
        &self.rules[id.0 as usize]
    }

    /// Enumerate the rules whose left-hand side matches `target`.
    ///
    /// Each match reports the rule id and the substitution over the
    /// rule's original variables; `f` returns whether to continue.
    /// No match at all is a normal negative result.
    pub fn matches<F>(&self, terms: &Terms, target: Term, mut f: F)
    where
        F: FnMut(Id, &FnvHashMap<Term, Term>) -> bool,
    {
        self.index.matches(terms, target, &mut |id, subst| {
            let rule = &self.rules[id.0 as usize];
            let bound = rule
                .canon
                .iter()
                .enumerate()
                .filter_map(|(i, v)| Some((*v, *subst.get(&(i as u32))?)))
                .collect();
            f(*id, &bound)
        });
    }

    /// Serialise a pattern, numbering its variables by first occurrence.
    fn tokenize(
        &self,
        terms: &Terms,
        lhs: Term,
        vars: &[Term],
    ) -> Result<(Vec<Token>, Vec<Term>), Error> {
        enum Item {
            Tm(Term, bool),
            End,
        }
        if matches!(terms.data(lhs).op, Op::Var(_)) {
            return Err(Error::Headless(lhs));
        }
        let mut tokens = Vec::new();
        let mut canon: Vec<Term> = Vec::new();
        let mut todo = Vec::from([Item::Tm(lhs, true)]);
        while let Some(item) = todo.pop() {
            let (tm, last) = match item {
                Item::End => {
                    tokens.push(Token::End);
                    continue;
                }
                Item::Tm(tm, last) => (tm, last),
            };
            let data = terms.data(tm);
            match &data.op {
                Op::Var(name) => {
                    if !vars.contains(&tm) {
                        return Err(Error::Unbound(tm));
                    }
                    let v = match canon.iter().position(|c| *c == tm) {
                        Some(i) => i as u32,
                        None => {
                            canon.push(tm);
                            (canon.len() - 1) as u32
                        }
                    };
                    if self.classify.is_list(name) {
                        if !last {
                            return Err(Error::ListPosition(tm));
                        }
                        tokens.push(Token::List(v));
                    } else {
                        tokens.push(Token::Var(v));
                    }
                }
                op => {
                    tokens.push(Token::Op(op.clone()));
                    todo.push(Item::End);
                    let n = data.children.len();
                    for (i, c) in data.children.iter().enumerate().rev() {
                        todo.push(Item::Tm(*c, i + 1 == n));
                    }
                }
            }
        }
        Ok((tokens, canon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_lists(_: &str) -> bool {
        false
    }

    fn f(terms: &Terms, children: Vec<Term>) -> Term {
        terms.intern(Op::Sym("f".into()), children)
    }

    fn g(terms: &Terms, arg: Term) -> Term {
        terms.intern(Op::Sym("g".into()), Vec::from([arg]))
    }

    fn all<C: Classify>(
        db: &Db<C>,
        terms: &Terms,
        target: Term,
    ) -> Vec<(Id, FnvHashMap<Term, Term>)> {
        let mut out = Vec::new();
        db.matches(terms, target, |id, subst| {
            out.push((id, subst.clone()));
            true
        });
        out
    }

    #[test]
    fn overlapping_rules_all_match() {
        let terms = Terms::new();
        let (x, y) = (terms.var("x"), terms.var("y"));
        let (a, b) = (terms.sym("a"), terms.sym("b"));
        let mut db = Db::new(no_lists);

        // f(x, y) and f(x, g(y)) both match f(a, g(b))
        let lhs1 = f(&terms, Vec::from([x, y]));
        let lhs2 = f(&terms, Vec::from([x, g(&terms, y)]));
        let r1 = db.add(&terms, "flat", Vec::from([x, y]), lhs1, x, None).unwrap();
        let r2 = db.add(&terms, "deep", Vec::from([x, y]), lhs2, y, None).unwrap();

        let target = f(&terms, Vec::from([a, g(&terms, b)]));
        let hits = all(&db, &terms, target);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, r1);
        assert_eq!(hits[0].1[&x], a);
        assert_eq!(hits[0].1[&y], g(&terms, b));
        assert_eq!(hits[1].0, r2);
        assert_eq!(hits[1].1[&y], b);
    }

    #[test]
    fn canonicalisation_shares_prefixes() {
        let terms = Terms::new();
        let (x, y) = (terms.var("x"), terms.var("y"));
        let a = terms.sym("a");
        let mut db = Db::new(no_lists);

        // same pattern up to variable names; both still match
        let lhs1 = f(&terms, Vec::from([x, x]));
        let lhs2 = f(&terms, Vec::from([y, y]));
        db.add(&terms, "one", Vec::from([x]), lhs1, x, None).unwrap();
        db.add(&terms, "two", Vec::from([y]), lhs2, y, None).unwrap();

        let hits = all(&db, &terms, f(&terms, Vec::from([a, a])));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].1[&x], a);
        assert_eq!(hits[1].1[&y], a);
    }

    #[test]
    fn nonlinear_patterns() {
        let terms = Terms::new();
        let x = terms.var("x");
        let (a, b) = (terms.sym("a"), terms.sym("b"));
        let mut db = Db::new(no_lists);
        let lhs = f(&terms, Vec::from([x, x]));
        db.add(&terms, "idem", Vec::from([x]), lhs, x, None).unwrap();

        assert_eq!(all(&db, &terms, f(&terms, Vec::from([a, a]))).len(), 1);
        assert!(all(&db, &terms, f(&terms, Vec::from([a, b]))).is_empty());
    }

    #[test]
    fn list_variables_in_tail_position() {
        let terms = Terms::new();
        let (x, xs) = (terms.var("x"), terms.var("xs"));
        let (a, b, c) = (terms.sym("a"), terms.sym("b"), terms.sym("c"));
        let lists = |name: &str| name.ends_with('s');
        let mut db = Db::new(lists);

        let lhs = terms.or(Vec::from([x, xs]));
        db.add(&terms, "or-tail", Vec::from([x, xs]), lhs, xs, None).unwrap();

        let hits = all(&db, &terms, terms.or(Vec::from([a, b, c])));
        assert_eq!(hits[0].1[&xs], terms.or(Vec::from([b, c])));
        let hits = all(&db, &terms, terms.or(Vec::from([a, b])));
        assert_eq!(hits[0].1[&xs], b);
        let hits = all(&db, &terms, terms.or(Vec::from([a])));
        assert_eq!(hits[0].1[&xs], terms.falsity());

        // a list variable anywhere else is rejected
        let lhs = terms.or(Vec::from([xs, x]));
        assert_eq!(
            db.add(&terms, "bad", Vec::from([x, xs]), lhs, x, None),
            Err(Error::ListPosition(xs))
        );
    }

    #[test]
    fn registration_rejects_malformed_patterns() {
        let terms = Terms::new();
        let (x, y) = (terms.var("x"), terms.var("y"));
        let a = terms.sym("a");
        let mut db = Db::new(no_lists);

        let lhs = f(&terms, Vec::from([x, y]));
        assert_eq!(
            db.add(&terms, "unbound", Vec::from([x]), lhs, x, None),
            Err(Error::Unbound(y))
        );
        assert_eq!(
            db.add(&terms, "notvar", Vec::from([a]), lhs, x, None),
            Err(Error::Variable(a))
        );
        assert_eq!(
            db.add(&terms, "headless", Vec::from([x]), x, x, None),
            Err(Error::Headless(x))
        );
    }

    #[test]
    fn enumeration_stops_on_demand() {
        let terms = Terms::new();
        let x = terms.var("x");
        let a = terms.sym("a");
        let mut db = Db::new(no_lists);
        let lhs = f(&terms, Vec::from([x]));
        db.add(&terms, "one", Vec::from([x]), lhs, x, None).unwrap();
        let lhs = f(&terms, Vec::from([a]));
        db.add(&terms, "two", Vec::new(), lhs, a, None).unwrap();

        let mut seen = 0;
        db.matches(&terms, f(&terms, Vec::from([a])), |_, _| {
            seen += 1;
            false
        });
        assert_eq!(seen, 1);
    }
}
