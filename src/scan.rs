//! Stateful accumulation over emissions.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use crate::cps::{Cps, Operator};
use crate::error::CallbackResult;
use crate::source::Callback;
use crate::utils::lock;
use crate::utils::tracing::{instrument, trace};
use crate::value::{Args, Value};

#[cfg(feature = "tracing")]
use tracing::Span;


/// Folds an emission into an accumulator.
#[derive(Clone)]
pub struct Reducer(Arc<dyn Fn(Value, Args) -> CallbackResult<Value> + Send + Sync + 'static>);

impl Reducer {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Reducer
        where F: Fn(Value, Args) -> CallbackResult<Value> + Send + Sync + 'static,
    {
        Reducer(Arc::new(f))
    }

    /// Compute the next accumulator.
    pub fn call(&self, acc: Value, args: Args) -> CallbackResult<Value> {
        (self.0)(acc, args)
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reducer({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}


/// Accumulated value of one slot, with a count of committed updates.
struct State {
    value: Value,
    generation: u64,
    writer: Option<ThreadId>,
}

/// Accumulator of one slot.
struct Accumulator {
    reducer: Reducer,
    state: Mutex<State>,
}

impl Accumulator {
    fn new(reducer: Reducer, seed: Value) -> Accumulator {
        Accumulator {
            reducer,
            state: Mutex::new(State { value: seed, generation: 0, writer: None }),
        }
    }

    /// Fold an emission in and return the new state.
    ///
    /// The reducer runs without the lock, so it may emit into its own source.
    /// The result is committed only if no other thread committed meanwhile,
    /// otherwise the reducer runs again on the fresh state. A commit made by
    /// a nested emission on the same thread is overwritten, as with plain
    /// recursion. An error or a panic leaves the state untouched.
    fn step(&self, args: Args) -> CallbackResult<Value> {
        let me = thread::current().id();
        loop {
            let (acc, generation) = {
                let state = lock(&self.state);
                (state.value.clone(), state.generation)
            };
            let next = self.reducer.call(acc, args.clone())?;
            let mut state = lock(&self.state);
            if state.generation == generation || state.writer == Some(me) {
                state.value = next.clone();
                state.generation = state.generation.wrapping_add(1);
                state.writer = Some(me);
                return Ok(next);
            }
            trace!("scan: lost a race, reducing again");
        }
    }
}


/// Accumulate the emissions of each slot.
///
/// A slot `i` with both `reducers[i]` and `seeds[i]` keeps an accumulator
/// starting at `seeds[i]`. Each emission on it is folded in with
/// `reducers[i](acc, args)` and the new accumulator is the sole argument
/// forwarded to the `i`-th callback. Other slots pass through.
///
/// The accumulators are created when the operator is applied to a source and
/// live as long as the resulting CPS function. They are shared by all of its
/// full calls.
///
/// A reducer that fails or panics aborts that emission only. The accumulator
/// keeps its previous value and later emissions carry on from there.
///
/// ```
/// # use cpsfn::{args, from_iter, scan, slots, Callback, Reducer, Value};
/// let total = scan(
///     slots![Reducer::new(|acc, args| Ok(Value::from(acc.as_int()? + args.int(0)?)))],
///     args![10],
/// );
/// let seen = std::sync::Arc::new(std::sync::Mutex::new(vec![]));
/// total(from_iter(vec![2, 8])).call({
///     let seen = seen.clone();
///     Callback::new(move |args| {
///         seen.lock().unwrap().push(args.int(0)?);
///         Ok(())
///     })
/// }).unwrap();
/// assert_eq!(*seen.lock().unwrap(), vec![12, 20]);
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn scan(reducers: Vec<Option<Reducer>>, seeds: Args) -> Operator {
    #[cfg(feature = "tracing")]
    let scan_fn_span = Span::current();
    let reducers: Arc<[Option<Reducer>]> = reducers.into();
    let seeds = seeds.into_vec();
    Box::new(move |source| {
        let accumulators: Arc<[Option<Accumulator>]> = reducers.iter()
            .zip(seeds.iter().cloned().map(Some).chain(std::iter::repeat(None)))
            .map(|(reducer, seed)| match (reducer, seed) {
                (&Some(ref reducer), Some(seed)) => Some(Accumulator::new(reducer.clone(), seed)),
                _ => None,
            })
            .collect();
        #[cfg(feature = "tracing")]
        let scan_fn_span = scan_fn_span.clone();
        Cps::new(source.arity(), move |callbacks| {
            instrument!(follows_from: &scan_fn_span, "scan");
            let synthesized = callbacks.rewire(|slot, callback| {
                match accumulators.get(slot) {
                    Some(Some(_)) => {
                        let accumulators = accumulators.clone();
                        let callback = callback.clone();
                        Callback::new(move |args| {
                            let acc = match accumulators[slot] {
                                Some(ref acc) => acc.step(args)?,
                                None => return Ok(()),
                            };
                            trace!("scan: slot {} accumulated {:?}", slot, acc);
                            callback.call(Args::one(acc))
                        })
                    },
                    _ => callback.clone(),
                }
            });
            source.call(synthesized)
        })
    })
}


#[cfg(test)]
mod test {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::args;
    use crate::error::Error;
    use crate::sink::Sink;
    use crate::testing::Recorder;
    use crate::unit::{of, of_slot};

    fn sum() -> Reducer {
        Reducer::new(|acc, args| Ok(Value::Int(acc.as_int()? + args.int(0)?)))
    }

    #[test]
    fn seed_plus_single_emission() {
        let rec = Recorder::new();
        of(args![42]).scan(slots![sum()], args![10]).call(rec.callbacks(1)).unwrap();
        assert_eq!(rec.events(), vec![(0, args![52])]);
    }

    #[test]
    fn accumulates_in_order() {
        let sink = Sink::new(1);
        let rec = Recorder::new();
        sink.cps().scan(slots![sum()], args![10]).call(rec.callbacks(1)).unwrap();
        sink.send(0, args![2]).unwrap();
        sink.send(0, args![8]).unwrap();
        assert_eq!(rec.slot(0), vec![args![12], args![20]]);
    }

    #[test]
    fn slots_accumulate_independently() {
        let sink = Sink::new(2);
        let rec = Recorder::new();
        sink.cps()
            .scan(slots![sum(), sum()], args![10, 11])
            .call(rec.callbacks(2))
            .unwrap();
        sink.send(0, args![2]).unwrap();
        sink.send(1, args![3]).unwrap();
        assert_eq!(rec.events(), vec![(0, args![12]), (1, args![14])]);
    }

    #[test]
    fn slot_without_seed_passes_through() {
        let rec = Recorder::new();
        of_slot(1, args![5])
            .scan(slots![sum(), sum()], args![0])
            .call(rec.callbacks(2))
            .unwrap();
        assert_eq!(rec.events(), vec![(1, args![5])]);
    }

    #[test]
    fn accumulator_is_shared_across_calls() {
        let rec = Recorder::new();
        let counter = of(args![1]).scan(slots![sum()], args![0]);
        counter.call(rec.callbacks(1)).unwrap();
        counter.call(rec.callbacks(1)).unwrap();
        counter.clone().call(rec.callbacks(1)).unwrap();
        assert_eq!(rec.slot(0), vec![args![1], args![2], args![3]]);
    }

    #[test]
    fn separate_applications_do_not_share() {
        let rec = Recorder::new();
        let op = scan(slots![sum()], args![0]);
        op(of(args![5])).call(rec.callbacks(1)).unwrap();
        op(of(args![5])).call(rec.callbacks(1)).unwrap();
        assert_eq!(rec.slot(0), vec![args![5], args![5]]);
    }

    #[test]
    fn reducer_error_rolls_back() {
        let sink = Sink::new(1);
        let rec = Recorder::new();
        sink.cps().scan(slots![sum()], args![10]).call(rec.callbacks(1)).unwrap();
        sink.send(0, args![1]).unwrap();
        assert_eq!(
            sink.send(0, args!["x"]),
            Err(Error::TypeMismatch { expected: "int", found: "str" })
        );
        sink.send(0, args![1]).unwrap();
        assert_eq!(rec.slot(0), vec![args![11], args![12]]);
    }

    #[test]
    fn reducer_panic_rolls_back() {
        let sink = Sink::new(1);
        let rec = Recorder::new();
        let fragile = Reducer::new(|acc, args| {
            let n = args.int(0)?;
            if n == 0 {
                panic!("zero");
            }
            Ok(Value::Int(acc.as_int()? + n))
        });
        sink.cps().scan(slots![fragile], args![100]).call(rec.callbacks(1)).unwrap();
        let result = panic::catch_unwind(AssertUnwindSafe(|| sink.send(0, args![0])));
        assert!(result.is_err());
        sink.send(0, args![1]).unwrap();
        assert_eq!(rec.slot(0), vec![args![101]]);
    }

    #[test]
    fn reducer_may_emit_into_its_source() {
        let sink = Sink::new(1);
        let rec = Recorder::new();
        let countdown = {
            let inner = sink.clone();
            Reducer::new(move |acc, args| {
                let n = args.int(0)?;
                if n > 0 {
                    inner.send(0, args![n - 1])?;
                }
                Ok(Value::Int(acc.as_int()? + n))
            })
        };
        sink.cps().scan(slots![countdown], args![0]).call(rec.callbacks(1)).unwrap();

        let (tx, rx) = mpsc::channel();
        let sender = sink.clone();
        thread::spawn(move || tx.send(sender.send(0, args![2])));
        let result = rx.recv_timeout(Duration::from_secs(5))
            .expect("re-entrant emission did not return");
        assert_eq!(result, Ok(()));
        assert_eq!(rec.slot(0), vec![args![0], args![1], args![2]]);

        // the outermost commit wins, as with plain recursion
        sink.send(0, args![0]).unwrap();
        assert_eq!(rec.slot(0).last(), Some(&args![2]));
    }

    #[test]
    fn racing_threads_lose_no_update() {
        let sink = Sink::new(1);
        let rec = Recorder::new();
        sink.cps().scan(slots![sum()], args![0]).call(rec.callbacks(1)).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sink = sink.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        sink.send(0, args![1]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let mut totals: Vec<i64> = rec.slot(0).iter().map(|args| args.int(0).unwrap()).collect();
        totals.sort_unstable();
        assert_eq!(totals, (1..=200).collect::<Vec<_>>());
    }

    #[test]
    fn downstream_error_keeps_update() {
        let sink = Sink::new(1);
        let rec = Recorder::new();
        let calls = Arc::new(Mutex::new(0));
        let failing_once = {
            let rec = rec.clone();
            let calls = calls.clone();
            Callback::new(move |args| {
                let mut calls = calls.lock().unwrap();
                *calls += 1;
                if *calls == 1 {
                    return Err(Error::raise("downstream"));
                }
                rec.callback(0).call(args)
            })
        };
        sink.cps().scan(slots![sum()], args![0]).call(failing_once).unwrap();
        assert!(sink.send(0, args![1]).is_err());
        sink.send(0, args![1]).unwrap();
        assert_eq!(rec.slot(0), vec![args![2]]);
    }
}
