//! Event-emitter adapter.

use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};

use crate::cps::Cps;
use crate::error::CallbackResult;
use crate::source::Source;
use crate::utils::tracing::trace;
use crate::utils::{read, write};
use crate::value::Args;


/// An event emitter with a CPS face.
///
/// A sink hands out CPS functions with [`cps`](Sink::cps). Every full call of
/// such a function registers its callbacks with the sink and returns without
/// emitting. Values sent into the sink later are emitted to every registered
/// callback list, in registration order.
///
/// ```
/// # use cpsfn::{args, Sink, Callback};
/// # use std::sync::{Arc, Mutex};
/// let sink = Sink::new(1);
/// let seen = Arc::new(Mutex::new(vec![]));
/// sink.cps().call({
///     let seen = seen.clone();
///     Callback::new(move |args| {
///         seen.lock().unwrap().push(args);
///         Ok(())
///     })
/// }).unwrap();
///
/// sink.send(0, args![1]).unwrap();
/// sink.send(0, args![2]).unwrap();
/// assert_eq!(*seen.lock().unwrap(), vec![args![1], args![2]]);
/// ```
///
/// There is no way to unregister, so callbacks live as long as the sink.
pub struct Sink {
    arity: usize,
    source: Arc<RwLock<Source>>,
}

impl Clone for Sink {
    fn clone(&self) -> Sink {
        Sink { arity: self.arity, source: self.source.clone() }
    }
}

impl Sink {
    /// Create a new sink emitting on `arity` slots.
    pub fn new(arity: usize) -> Sink {
        Sink { arity, source: Arc::new(RwLock::new(Source::new())) }
    }

    /// Number of slots the sink's CPS functions declare.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// A CPS function emitting everything sent into the sink.
    pub fn cps(&self) -> Cps {
        let source = self.source.clone();
        Cps::new(self.arity, move |callbacks| {
            trace!("sink: registering {} callbacks", callbacks.len());
            write(&source).register(callbacks);
            Ok(())
        })
    }

    /// Number of callback lists registered so far.
    pub fn subscribers(&self) -> usize {
        read(&self.source).len()
    }

    /// Send an argument tuple on a slot.
    ///
    /// Stops at the first registered callback list that fails, and returns
    /// its error.
    pub fn send(&self, slot: usize, args: Args) -> CallbackResult {
        let subscribers = read(&self.source).snapshot();
        trace!("sink: sending {:?} on slot {} to {} subscribers", args, slot, subscribers.len());
        for callbacks in subscribers {
            callbacks.emit(slot, args.clone())?;
        }
        Ok(())
    }

    /// Send every argument tuple of an iterator on a slot.
    pub fn feed<I: IntoIterator<Item = Args>>(&self, slot: usize, iterator: I) -> CallbackResult {
        for args in iterator {
            self.send(slot, args)?;
        }
        Ok(())
    }

    /// Asynchronous send.
    ///
    /// Same as `send`, but delivers on a new thread. Join the handle to learn
    /// how the emission went.
    pub fn send_async(&self, slot: usize, args: Args) -> JoinHandle<CallbackResult> {
        let clone = self.clone();
        thread::spawn(move || clone.send(slot, args))
    }
}
