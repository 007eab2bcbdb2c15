//! Constructors lifting plain values into CPS functions.

use std::sync::Arc;

use crate::cps::Cps;
use crate::utils::tracing::trace;
use crate::value::{Args, Value};


/// Lift an argument tuple into a CPS function.
///
/// The result declares one slot. Every full call invokes the first callback
/// exactly once with `values`, synchronously.
///
/// ```
/// # use cpsfn::{args, of, Callback};
/// of(args![1, 2]).call(Callback::new(|args| {
///     assert_eq!(args, args![1, 2]);
///     Ok(())
/// })).unwrap();
/// ```
pub fn of(values: Args) -> Cps {
    of_slot(0, values)
}

/// Lift an argument tuple into a CPS function emitting on one slot only.
///
/// The result declares `slot + 1` slots and never invokes the others. This is
/// handy to build emissions on a secondary channel, such as an error slot.
///
/// ```
/// # use cpsfn::{args, of_slot, Callback};
/// let failed = of_slot(1, args!["timeout"]);
/// failed.call(vec![
///     Callback::new(|_| panic!("no value expected")),
///     Callback::new(|args| {
///         assert_eq!(args.arg(0)?.as_str()?, "timeout");
///         Ok(())
///     }),
/// ]).unwrap();
/// ```
pub fn of_slot(slot: usize, values: Args) -> Cps {
    Cps::new(slot + 1, move |callbacks| {
        trace!("of: slot {} emits {:?}", slot, values);
        callbacks.emit(slot, values.clone())
    })
}

/// A CPS function that never invokes any callback.
///
/// This is the identity of `merge`.
pub fn never() -> Cps {
    Cps::new(0, |_| Ok(()))
}

/// Emit each item of an iterable as a single argument on the first slot.
///
/// Every full call replays all items in order.
///
/// ```
/// # use cpsfn::{args, from_iter, Callback};
/// # use std::sync::{Arc, Mutex};
/// let seen = Arc::new(Mutex::new(vec![]));
/// from_iter(vec![10, 20, 30]).call({
///     let seen = seen.clone();
///     Callback::new(move |args| {
///         seen.lock().unwrap().push(args.int(0)?);
///         Ok(())
///     })
/// }).unwrap();
/// assert_eq!(*seen.lock().unwrap(), vec![10, 20, 30]);
/// ```
pub fn from_iter<I>(values: I) -> Cps
    where I: IntoIterator,
          I::Item: Into<Value>,
{
    let values: Arc<[Value]> = values.into_iter().map(Into::into).collect();
    Cps::new(1, move |callbacks| {
        for value in values.iter() {
            trace!("from_iter: emits {:?}", value);
            callbacks.emit(0, Args::one(value.clone()))?;
        }
        Ok(())
    })
}
