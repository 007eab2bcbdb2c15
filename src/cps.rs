//! The CPS function wrapper.

use std::fmt;
use std::sync::Arc;

use crate::ap;
use crate::error::CallbackResult;
use crate::flat_map::{self, Bind};
use crate::map::{self, Predicate};
use crate::merge;
use crate::scan::{self, Reducer};
use crate::source::Callbacks;
use crate::value::{Args, Func};


type Body = dyn Fn(Callbacks) -> CallbackResult + Send + Sync + 'static;

/// A combinator in free-function form, `combinator(args)(cps)`.
///
/// Operators compose left to right with [`pipe!`](crate::pipe).
pub type Operator = Box<dyn Fn(Cps) -> Cps + Send + Sync>;


/// A continuation-passing-style function.
///
/// Instead of returning a value, a CPS function is called with a list of
/// callbacks and invokes any of them, any number of times, with any number
/// of arguments. Each callback position is a *slot*, an independent output
/// channel. The `arity` is the number of slots the function declares.
///
/// `Cps` wraps such a function and exposes the combinators as methods. The
/// wrapper is transparent: calling it is exactly calling the wrapped body.
///
/// # Algebraic laws
///
/// The combinators satisfy the usual laws, slot by slot, where equality means
/// identical sequences of callback invocations:
///
/// - Functor identity: `g.map(slots![])` and `g.map(slots![id])` behave like `g`,
/// - Functor composition: `g.map(slots![f]).map(slots![h])` behaves like
///   `g.map(slots![h ∘ f])`,
/// - Monad left identity: `of(x).flat_map(slots![f])` behaves like `f(x)`,
/// - Monad right identity: `g.flat_map(slots![of])` behaves like `g`,
/// - Monad associativity: `g.flat_map(slots![f]).flat_map(slots![h])` behaves
///   like `g.flat_map(slots![|x| f(x).flat_map(slots![h])])`,
/// - Monoid: `merge` is associative and commutative with `never()` as its
///   identity.
#[derive(Clone)]
pub struct Cps {
    arity: usize,
    body: Arc<Body>,
}

impl Cps {
    /// Wrap a CPS body that declares `arity` callback slots.
    pub fn new<F>(arity: usize, body: F) -> Cps
        where F: Fn(Callbacks) -> CallbackResult + Send + Sync + 'static,
    {
        Cps { arity, body: Arc::new(body) }
    }

    /// Number of callback slots this function declares.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Fully call the function with its callbacks.
    ///
    /// Returns the first fault raised by any emission delivered before the
    /// body returns.
    pub fn call<C: Into<Callbacks>>(&self, callbacks: C) -> CallbackResult {
        (self.body)(callbacks.into())
    }

    /// Transform the arguments emitted on each slot with a function.
    ///
    /// See [`map`](crate::map()).
    pub fn map(&self, transforms: Vec<Option<Func>>) -> Cps {
        map::map(transforms)(self.clone())
    }

    /// Keep only the emissions satisfying a per-slot predicate.
    ///
    /// See [`filter`](crate::filter()).
    pub fn filter(&self, predicates: Vec<Option<Predicate>>) -> Cps {
        map::filter(predicates)(self.clone())
    }

    /// Chain each emission into another CPS function.
    ///
    /// See [`flat_map`](crate::flat_map()).
    pub fn flat_map(&self, binds: Vec<Option<Bind>>) -> Cps {
        flat_map::flat_map(binds)(self.clone())
    }

    /// Apply functions emitted by other CPS functions to this one's values.
    ///
    /// See [`ap`](crate::ap()).
    pub fn ap(&self, functions: Vec<Option<Cps>>) -> Cps {
        ap::ap(functions)(self.clone())
    }

    /// Apply plain functions to this one's values through `ap`.
    ///
    /// See [`lift`](crate::lift()).
    pub fn lift(&self, functions: Vec<Option<Func>>) -> Cps {
        ap::lift(functions)(self.clone())
    }

    /// Merge with other CPS functions.
    ///
    /// See [`merge`](crate::merge()).
    pub fn merge(&self, others: &[Cps]) -> Cps {
        let mut sources = Vec::with_capacity(others.len() + 1);
        sources.push(self.clone());
        sources.extend(others.iter().cloned());
        merge::merge(sources)
    }

    /// Accumulate the emissions of each slot.
    ///
    /// See [`scan`](crate::scan()).
    pub fn scan(&self, reducers: Vec<Option<Reducer>>, seeds: Args) -> Cps {
        scan::scan(reducers, seeds)(self.clone())
    }
}

impl fmt::Debug for Cps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cps").field("arity", &self.arity).finish()
    }
}


/// Wrap a raw CPS body into a [`Cps`].
///
/// ```
/// # use cpsfn::{args, wrap, Callback, Callbacks};
/// let twice = wrap(1, |callbacks: Callbacks| {
///     callbacks.emit(0, args![1])?;
///     callbacks.emit(0, args![2])
/// });
/// let doubled = twice.map(cpsfn::slots![cpsfn::Func::new(|a| Ok((a.int(0)? * 2).into()))]);
/// doubled.call(Callback::new(|args| {
///     assert!(args.int(0)? % 2 == 0);
///     Ok(())
/// })).unwrap();
/// ```
pub fn wrap<F>(arity: usize, body: F) -> Cps
    where F: Fn(Callbacks) -> CallbackResult + Send + Sync + 'static,
{
    Cps::new(arity, body)
}
