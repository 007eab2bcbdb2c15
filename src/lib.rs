//! Algebraic combinators for continuation-passing-style functions
//!
//! *cpsfn* treats callback-based computations as first-class values and gives
//! them the structure of a functor, a monad, an applicative and a monoid.
//!
//! A CPS function does not return its result. It is called with a list of
//! callbacks instead, and invokes any of them, any number of times, with any
//! number of arguments. Each position in the callback list is a *slot*, an
//! independent output channel. A Node-style function with a result and an
//! error callback is a two-slot CPS function, an event emitter is a CPS
//! function that keeps invoking its callback, and a one-shot computation is a
//! CPS function that invokes its first callback once.
//!
//!
//! # Combinators
//!
//! The basic type is `Cps`, a thin wrapper around a CPS function that exposes
//! the combinators as methods:
//!
//! - `of` lifts a tuple of values,
//! - `map` transforms the arguments emitted on each slot,
//! - `flat_map` chains every emission into another CPS function,
//! - `ap` and `lift` apply functions emitted by other CPS functions,
//! - `merge` multiplexes several CPS functions onto the same callbacks,
//! - `scan` accumulates the emissions of each slot.
//!
//! Every combinator is also available as a free function `combinator(args)`
//! that returns an `Operator`, which `pipe!` applies from left to right.
//! Combinators take one entry per slot, built with `slots!`, where an
//! underscore marks a slot that passes through unchanged.
//!
//! The `Sink` type is an event emitter with a CPS face. It is the way to make
//! a CPS function emit later, after it was called, and repeatedly.
//!
//!
//! # Example
//!
//! ```
//! # // NOTE: If you change this example, please update the README.md
//! # // accordingly, so that they remain in sync!
//! use cpsfn::{args, slots, Callback, Func, Reducer, Sink, Value};
//! use std::sync::{Arc, Mutex};
//!
//! // A sink with a value slot and an error slot
//! let sink = Sink::new(2);
//!
//! // Square the values and keep a running total, leave errors alone
//! let totals = sink.cps()
//!     .map(slots![Func::new(|args| Ok(Value::from(args.int(0)?.pow(2))))])
//!     .scan(slots![Reducer::new(|acc, args| Ok(Value::from(acc.as_int()? + args.int(0)?)))], args![0]);
//!
//! let seen = Arc::new(Mutex::new(vec![]));
//! let errors = Arc::new(Mutex::new(vec![]));
//! totals.call(vec![
//!     {
//!         let seen = seen.clone();
//!         Callback::new(move |args| { seen.lock().unwrap().push(args.int(0)?); Ok(()) })
//!     },
//!     {
//!         let errors = errors.clone();
//!         Callback::new(move |args| { errors.lock().unwrap().push(args); Ok(()) })
//!     },
//! ]).unwrap();
//!
//! sink.send(0, args![3]).unwrap();
//! sink.send(1, args!["oops"]).unwrap();
//! sink.send(0, args![4]).unwrap();
//!
//! assert_eq!(*seen.lock().unwrap(), vec![9, 25]);
//! assert_eq!(*errors.lock().unwrap(), vec![args!["oops"]]);
//! ```
//!
//!
//! # Values and faults
//!
//! Callbacks accept any number of arguments of any kind, so arguments are
//! dynamically typed `Value`s collected in an `Args` tuple. Functions are
//! values too.
//!
//! Callbacks, transforms and reducers return a `CallbackResult`. A fault
//! travels synchronously back to whoever triggered the emission, through
//! every combinator in between. It is never turned into an emission on
//! another slot. Error slots are for expected, asynchronous outcomes. Faults
//! are for bugs and misuse.
//!
//!
//! # Threads
//!
//! The combinators never spawn threads nor queue emissions. Everything here is
//! `Send + Sync`, so emissions may arrive from any thread. The state kept by
//! `ap`, `combine` and `scan` is behind mutexes which are never held while a
//! downstream callback runs.
//!
//!
//! # Tracing
//!
//! With the `tracing` feature enabled, each combinator opens a span when it
//! is applied and emits trace events for every emission it handles.

#![warn(missing_docs)]

#[macro_use]
mod macros;
mod utils;

mod ap;
mod combine;
mod cps;
mod error;
mod flat_map;
mod latest;
mod map;
mod merge;
mod scan;
mod sink;
mod source;
mod unit;
mod value;

pub mod testing;

pub use crate::ap::{ap, lift};
pub use crate::combine::combine;
pub use crate::cps::{wrap, Cps, Operator};
pub use crate::error::{CallbackResult, Error};
pub use crate::flat_map::{flat_map, Bind};
pub use crate::map::{filter, map, Predicate};
pub use crate::merge::merge;
pub use crate::scan::{scan, Reducer};
pub use crate::sink::Sink;
pub use crate::source::{Callback, Callbacks, Source};
pub use crate::unit::{from_iter, never, of, of_slot};
pub use crate::value::{Args, Func, Value};
