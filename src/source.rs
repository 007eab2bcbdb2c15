//! Callbacks and event sources.
//!
//! A CPS function is handed an ordered list of callbacks on every full call.
//! Each position in that list is a slot: an independent output channel that
//! may be invoked any number of times. This module provides the callback
//! types and a light-weight observer registry for sources that emit later.

use std::fmt;
use std::iter::FromIterator;
use std::sync::Arc;

use crate::error::{CallbackResult, Error};
use crate::value::Args;


/// A boxed callback.
///
/// Callbacks return a result, so that a fault raised downstream of an emission
/// travels back to whoever triggered it.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(Args) -> CallbackResult + Send + Sync + 'static>);

impl Callback {
    /// Wrap a closure into a callback.
    pub fn new<F>(f: F) -> Callback
        where F: Fn(Args) -> CallbackResult + Send + Sync + 'static,
    {
        Callback(Arc::new(f))
    }

    /// Invoke the callback with an argument tuple.
    pub fn call(&self, args: Args) -> CallbackResult {
        (self.0)(args)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}


/// The callbacks supplied to one full call, indexed by slot.
///
/// Cloning is cheap, so a CPS function may keep its callbacks around and emit
/// long after the call returned.
#[derive(Clone, Debug)]
pub struct Callbacks(Arc<[Callback]>);

impl Callbacks {
    /// Create a callback list.
    pub fn new(callbacks: Vec<Callback>) -> Callbacks {
        Callbacks(callbacks.into())
    }

    /// Number of slots supplied.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no callbacks were supplied at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The callback for a slot.
    pub fn get(&self, slot: usize) -> Option<&Callback> {
        self.0.get(slot)
    }

    /// Iterate over the callbacks in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, Callback> {
        self.0.iter()
    }

    /// Emit an argument tuple on a slot.
    ///
    /// Emitting on a slot the caller did not supply is a misuse and fails
    /// with `Error::MissingCallback`.
    pub fn emit(&self, slot: usize, args: Args) -> CallbackResult {
        match self.get(slot) {
            Some(callback) => callback.call(args),
            None => Err(Error::MissingCallback { slot, supplied: self.0.len() }),
        }
    }

    /// Build a new callback list of the same length, one slot at a time.
    ///
    /// This is how combinators synthesize the callbacks they hand to their
    /// source: `f` receives each slot index together with the downstream
    /// callback for that slot.
    pub fn rewire<F>(&self, mut f: F) -> Callbacks
        where F: FnMut(usize, &Callback) -> Callback,
    {
        self.0.iter().enumerate().map(|(slot, callback)| f(slot, callback)).collect()
    }
}

impl From<Vec<Callback>> for Callbacks {
    fn from(callbacks: Vec<Callback>) -> Callbacks {
        Callbacks::new(callbacks)
    }
}

impl From<Callback> for Callbacks {
    fn from(callback: Callback) -> Callbacks {
        Callbacks::new(vec![callback])
    }
}

impl FromIterator<Callback> for Callbacks {
    fn from_iter<I: IntoIterator<Item = Callback>>(iter: I) -> Callbacks {
        Callbacks::new(iter.into_iter().collect())
    }
}


/// An event source.
///
/// Keeps the callback lists of every full call made on a source, so that
/// later emissions reach all of them in registration order. There is no way
/// to unregister.
pub struct Source {
    subscribers: Vec<Callbacks>,
}

impl Source {
    /// Create a new source.
    pub fn new() -> Source {
        Source { subscribers: vec![] }
    }

    /// Register the callbacks of a full call.
    pub fn register(&mut self, callbacks: Callbacks) {
        self.subscribers.push(callbacks);
    }

    /// Number of registered callback lists.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Copy of the current subscribers.
    ///
    /// Emitting goes through a snapshot, so callbacks are free to register
    /// new subscribers on the same source while an emission is in flight.
    pub fn snapshot(&self) -> Vec<Callbacks> {
        self.subscribers.clone()
    }
}

impl Default for Source {
    fn default() -> Source {
        Source::new()
    }
}
