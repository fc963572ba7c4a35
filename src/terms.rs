//! Hash-consing term store.

use crate::term::{Data, Op, Term};
use core::fmt::{self, Display};
use fnv::FnvHashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Store that canonicalises structurally equal terms to one instance.
///
/// The store is the exclusive owner of all term data;
/// everything else holds [`Term`] handles.
/// Interning is the only mutation, so the store is read-mostly and
/// may be shared between independent reconstruction jobs.
#[derive(Default)]
pub struct Terms {
    tbl: RwLock<Tbl>,
}

#[derive(Default)]
struct Tbl {
    data: Vec<Arc<Data>>,
    ids: FnvHashMap<Arc<Data>, Term>,
    fresh: u64,
}

impl Tbl {
    fn insert(&mut self, data: Data) -> Term {
        let tm = Term(self.data.len() as u32);
        let data = Arc::new(data);
        self.data.push(data.clone());
        self.ids.insert(data, tm);
        tm
    }
}

impl Terms {
    pub fn new() -> Self {
        Default::default()
    }

    /// Return the canonical handle for the given structure,
    /// creating it on first request.
    ///
    /// Concurrent calls with the same structure return the same handle:
    /// insertion is guarded, and the write path
    /// rechecks the table before extending it.
    pub fn intern(&self, op: Op, children: Vec<Term>) -> Term {
        let data = Data { op, children };
        let tbl = self.tbl.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(tm) = tbl.ids.get(&data) {
            return *tm;
        }
        drop(tbl);
        let mut tbl = self.tbl.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(tm) = tbl.ids.get(&data) {
            return *tm;
        }
        tbl.insert(data)
    }

    /// Obtain the structure behind a handle.
    ///
    /// The handle must stem from this store.
    pub fn data(&self, tm: Term) -> Arc<Data> {
        let tbl = self.tbl.read().unwrap_or_else(PoisonError::into_inner);
        tbl.data[tm.0 as usize].clone()
    }

    /// Mint a globally unique placeholder proposition.
    pub fn fresh(&self) -> Term {
        let mut tbl = self.tbl.write().unwrap_or_else(PoisonError::into_inner);
        let n = tbl.fresh;
        tbl.fresh += 1;
        let children = Vec::new();
        tbl.insert(Data { op: Op::Fresh(n), children })
    }

    /// Identity element of an n-ary operator, if it has one.
    pub fn identity(&self, op: &Op) -> Option<Term> {
        op.identity().map(|z| self.intern(z, Vec::new()))
    }

    pub fn truth(&self) -> Term {
        self.intern(Op::True, Vec::new())
    }

    pub fn falsity(&self) -> Term {
        self.intern(Op::False, Vec::new())
    }

    pub fn not_(&self, tm: Term) -> Term {
        self.intern(Op::Not, Vec::from([tm]))
    }

    /// Complement of a literal: strip a negation or add one.
    pub fn complement(&self, tm: Term) -> Term {
        let data = self.data(tm);
        match data.op {
            Op::Not => data.children[0],
            _ => self.not_(tm),
        }
    }

    pub fn eq(&self, lhs: Term, rhs: Term) -> Term {
        self.intern(Op::Eq, Vec::from([lhs, rhs]))
    }

    pub fn imp(&self, lhs: Term, rhs: Term) -> Term {
        self.intern(Op::Imp, Vec::from([lhs, rhs]))
    }

    pub fn and(&self, tms: Vec<Term>) -> Term {
        self.intern(Op::And, tms)
    }

    pub fn or(&self, tms: Vec<Term>) -> Term {
        self.intern(Op::Or, tms)
    }

    pub fn app(&self, head: Term, arg: Term) -> Term {
        self.intern(Op::App, Vec::from([head, arg]))
    }

    /// Nullary symbol. For applied symbols, intern `Op::Sym` with children.
    pub fn sym(&self, name: &str) -> Term {
        self.intern(Op::Sym(name.into()), Vec::new())
    }

    pub fn var(&self, name: &str) -> Term {
        self.intern(Op::Var(name.into()), Vec::new())
    }

    pub fn nat(&self, n: u64) -> Term {
        self.intern(Op::Nat(n), Vec::new())
    }

    /// Display adapter for logging and error messages.
    pub fn show(&self, tm: Term) -> Show<'_> {
        Show { terms: self, tm }
    }
}

/// Display a term as it is stored, in applicative notation.
pub struct Show<'t> {
    terms: &'t Terms,
    tm: Term,
}

impl<'t> Display for Show<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let data = self.terms.data(self.tm);
        let parens = !data.children.is_empty();
        if parens {
            write!(f, "(")?;
        }
        data.op.fmt(f)?;
        for c in &data.children {
            write!(f, " {}", self.terms.show(*c))?;
        }
        if parens {
            write!(f, ")")?;
        }
        Ok(())
    }
}
