//! Utilities for testing CPS functions.
//!
//! Two CPS functions are considered equivalent when, fully called, they
//! produce identical sequences of `(slot, arguments)` emissions.

use std::sync::{Arc, Mutex};

use crate::cps::Cps;
use crate::error::CallbackResult;
use crate::source::{Callback, Callbacks};
use crate::utils::lock;
use crate::value::{Args, Func, Value};


/// One recorded emission: the slot and its arguments.
pub type Event = (usize, Args);


/// Records every emission delivered to its callbacks.
///
/// Clones share the same log.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    /// Create an empty recorder.
    pub fn new() -> Recorder {
        Recorder::default()
    }

    /// A callback recording every emission under `slot`.
    pub fn callback(&self, slot: usize) -> Callback {
        let events = self.events.clone();
        Callback::new(move |args| {
            lock(&events).push((slot, args));
            Ok(())
        })
    }

    /// A list of `slots` recording callbacks.
    pub fn callbacks(&self, slots: usize) -> Callbacks {
        (0..slots).map(|slot| self.callback(slot)).collect()
    }

    /// All emissions so far, in the order they arrived.
    pub fn events(&self) -> Vec<Event> {
        lock(&self.events).clone()
    }

    /// The arguments of all emissions on one slot.
    pub fn slot(&self, slot: usize) -> Vec<Args> {
        lock(&self.events).iter()
            .filter(|&&(s, _)| s == slot)
            .map(|&(_, ref args)| args.clone())
            .collect()
    }

    /// Forget all emissions.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}


/// Compares the emissions of two CPS functions.
pub struct Equivalence {
    left: Recorder,
    right: Recorder,
}

impl Equivalence {
    /// Compare the emissions recorded so far.
    pub fn sample(&self) -> Result<(), String> {
        let left = self.left.events();
        let right = self.right.events();
        if left == right {
            Ok(())
        } else {
            Err(format!("emissions differ: {:?} != {:?}", left, right))
        }
    }
}

/// Fully call two CPS functions with `slots` recording callbacks each.
///
/// The returned equivalence keeps recording, so emissions that arrive after
/// the calls returned are compared as well.
pub fn cps_eq(left: &Cps, right: &Cps, slots: usize) -> CallbackResult<Equivalence> {
    let eq = Equivalence { left: Recorder::new(), right: Recorder::new() };
    left.call(eq.left.callbacks(slots))?;
    right.call(eq.right.callbacks(slots))?;
    Ok(eq)
}


/// The identity function: returns its first argument.
pub fn id() -> Func {
    Func::new(|args| Ok(args.arg(0)?.clone()))
}

/// A function adding a constant to its first integer argument.
pub fn add(n: i64) -> Func {
    Func::new(move |args| Ok(Value::Int(args.int(0)? + n)))
}

/// A function multiplying its first integer argument by a constant.
pub fn mul(n: i64) -> Func {
    Func::new(move |args| Ok(Value::Int(args.int(0)? * n)))
}


/// Self-tests.
#[cfg(test)]
mod test {
    use super::*;
    use crate::args;
    use crate::unit::{of, never};

    #[test]
    fn recorder_keeps_order() {
        let rec = Recorder::new();
        let cbs = rec.callbacks(2);
        cbs.emit(1, args![1]).unwrap();
        cbs.emit(0, args![2]).unwrap();
        assert_eq!(rec.events(), vec![(1, args![1]), (0, args![2])]);
        assert_eq!(rec.slot(0), vec![args![2]]);
        rec.clear();
        assert!(rec.events().is_empty());
    }

    #[test]
    fn cps_eq_same() {
        let eq = cps_eq(&of(args![3]), &of(args![3]), 1).unwrap();
        assert_eq!(eq.sample(), Ok(()));
    }

    #[test]
    fn cps_eq_different() {
        let eq = cps_eq(&of(args![3]), &never(), 1).unwrap();
        assert!(eq.sample().is_err());
    }

    #[test]
    fn helpers() {
        assert_eq!(id().call(args![5, 6]), Ok(Value::Int(5)));
        assert_eq!(add(2).call(args![5]), Ok(Value::Int(7)));
        assert_eq!(mul(3).call(args![5]), Ok(Value::Int(15)));
    }
}
