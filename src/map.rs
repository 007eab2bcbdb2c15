//! Per-slot transformation of emitted values.

use std::sync::Arc;

use crate::cps::{Cps, Operator};
use crate::error::CallbackResult;
use crate::source::Callback;
use crate::utils::tracing::{instrument, trace};
use crate::value::{Args, Func};

#[cfg(feature = "tracing")]
use tracing::Span;


/// Map each slot of a CPS function through a function.
///
/// `transforms[i]` is applied to the *whole* argument tuple of every emission
/// on slot `i`, and its single return value is forwarded as the only argument
/// of the `i`-th callback. Slots without a transform forward their arguments
/// unchanged. Emissions keep their multiplicity and order.
///
/// The result declares as many slots as the source, or as many as there are
/// transforms if that is more. Transforms for slots the source never emits on
/// are simply never called.
///
/// ```
/// # use cpsfn::{args, map, of, slots, Callback, Func, Value};
/// let sum = map(slots![Func::new(|args| Ok(Value::from(args.int(0)? + args.int(1)?)))]);
/// sum(of(args![3, 4])).call(Callback::new(|args| {
///     assert_eq!(args, args![7]);
///     Ok(())
/// })).unwrap();
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn map(transforms: Vec<Option<Func>>) -> Operator {
    #[cfg(feature = "tracing")]
    let map_fn_span = Span::current();
    let transforms: Arc<[Option<Func>]> = transforms.into();
    Box::new(move |source| {
        let arity = source.arity().max(transforms.len());
        let transforms = transforms.clone();
        #[cfg(feature = "tracing")]
        let map_fn_span = map_fn_span.clone();
        Cps::new(arity, move |callbacks| {
            instrument!(follows_from: &map_fn_span, "map");
            let synthesized = callbacks.rewire(|slot, callback| {
                match transforms.get(slot) {
                    Some(Some(f)) => {
                        let f = f.clone();
                        let callback = callback.clone();
                        Callback::new(move |args| {
                            trace!("map: slot {} received {:?}", slot, args);
                            callback.call(Args::one(f.call(args)?))
                        })
                    },
                    _ => callback.clone(),
                }
            });
            source.call(synthesized)
        })
    })
}


/// A predicate deciding whether an emission passes a filter.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Args) -> CallbackResult<bool> + Send + Sync + 'static>);

impl Predicate {
    /// Wrap a closure into a predicate.
    pub fn new<F>(f: F) -> Predicate
        where F: Fn(&Args) -> CallbackResult<bool> + Send + Sync + 'static,
    {
        Predicate(Arc::new(f))
    }

    /// Evaluate the predicate.
    pub fn test(&self, args: &Args) -> CallbackResult<bool> {
        (self.0)(args)
    }
}

/// Filter the emissions of each slot by a predicate.
///
/// Emissions on slot `i` are forwarded unchanged when `predicates[i]` holds
/// and dropped otherwise. Slots without a predicate pass everything.
///
/// ```
/// # use cpsfn::{args, filter, from_iter, slots, Callback, Predicate};
/// let even = filter(slots![Predicate::new(|args| Ok(args.int(0)? % 2 == 0))]);
/// even(from_iter(1..5)).call(Callback::new(|args| {
///     assert_eq!(args.int(0)? % 2, 0);
///     Ok(())
/// })).unwrap();
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn filter(predicates: Vec<Option<Predicate>>) -> Operator {
    #[cfg(feature = "tracing")]
    let filter_fn_span = Span::current();
    let predicates: Arc<[Option<Predicate>]> = predicates.into();
    Box::new(move |source| {
        let predicates = predicates.clone();
        #[cfg(feature = "tracing")]
        let filter_fn_span = filter_fn_span.clone();
        Cps::new(source.arity(), move |callbacks| {
            instrument!(follows_from: &filter_fn_span, "filter");
            let synthesized = callbacks.rewire(|slot, callback| {
                match predicates.get(slot) {
                    Some(Some(p)) => {
                        let p = p.clone();
                        let callback = callback.clone();
                        Callback::new(move |args| {
                            if p.test(&args)? {
                                callback.call(args)
                            } else {
                                trace!("filter: slot {} dropped {:?}", slot, args);
                                Ok(())
                            }
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
    use quickcheck::quickcheck;

    use super::*;
    use crate::args;
    use crate::error::Error;
    use crate::sink::Sink;
    use crate::testing::{add, cps_eq, id, mul, Recorder};
    use crate::unit::{from_iter, of, of_slot};
    use crate::value::Value;

    #[test]
    fn map_first_slot() {
        let rec = Recorder::new();
        of(args![3]).map(slots![mul(3)]).call(rec.callbacks(1)).unwrap();
        assert_eq!(rec.events(), vec![(0, args![9])]);
    }

    #[test]
    fn map_receives_whole_tuple() {
        let rec = Recorder::new();
        let join = Func::new(|args| Ok(Value::from(args.len() as i64)));
        of(args![1, 2, 3]).map(slots![join]).call(rec.callbacks(1)).unwrap();
        assert_eq!(rec.events(), vec![(0, args![3])]);
    }

    #[test]
    fn map_untransformed_slot_passes_through() {
        let rec = Recorder::new();
        of_slot(1, args!["a", "b"])
            .map(slots![mul(2)])
            .call(rec.callbacks(2))
            .unwrap();
        assert_eq!(rec.events(), vec![(1, args!["a", "b"])]);
    }

    #[test]
    fn map_second_slot_only() {
        let rec = Recorder::new();
        let len = Func::new(|args| Ok(Value::from(args.arg(0)?.as_str()?.len() as i64)));
        of_slot(1, args!["four"])
            .map(slots![_, len])
            .call(rec.callbacks(2))
            .unwrap();
        assert_eq!(rec.events(), vec![(1, args![4])]);
    }

    #[test]
    fn map_extra_transforms_are_inert() {
        let rec = Recorder::new();
        let mapped = of(args![1]).map(slots![add(1), mul(5), mul(7)]);
        assert_eq!(mapped.arity(), 3);
        mapped.call(rec.callbacks(1)).unwrap();
        assert_eq!(rec.events(), vec![(0, args![2])]);
    }

    #[test]
    fn map_preserves_multiplicity() {
        let sink = Sink::new(2);
        let rec = Recorder::new();
        sink.cps().map(slots![add(1)]).call(rec.callbacks(2)).unwrap();
        sink.send(0, args![1]).unwrap();
        sink.send(1, args!["x"]).unwrap();
        sink.send(0, args![1]).unwrap();
        assert_eq!(
            rec.events(),
            vec![(0, args![2]), (1, args!["x"]), (0, args![2])]
        );
    }

    #[test]
    fn map_transform_error_propagates() {
        let rec = Recorder::new();
        let failing = Func::new(|_| Err(Error::raise("bad transform")));
        let result = of(args![1]).map(slots![failing]).call(rec.callbacks(1));
        assert_eq!(result, Err(Error::raise("bad transform")));
        assert!(rec.events().is_empty());
    }

    #[test]
    fn map_error_does_not_stop_later_emissions() {
        let sink = Sink::new(1);
        let rec = Recorder::new();
        let checked = Func::new(|args| {
            let n = args.int(0)?;
            if n < 0 { Err(Error::raise("negative")) } else { Ok(Value::Int(n)) }
        });
        sink.cps().map(slots![checked]).call(rec.callbacks(1)).unwrap();
        assert!(sink.send(0, args![-1]).is_err());
        sink.send(0, args![2]).unwrap();
        assert_eq!(rec.events(), vec![(0, args![2])]);
    }

    #[test]
    fn filter_drops_failing_emissions() {
        let rec = Recorder::new();
        from_iter(1..7)
            .filter(slots![Predicate::new(|args| Ok(args.int(0)? % 3 == 0))])
            .call(rec.callbacks(1))
            .unwrap();
        assert_eq!(rec.slot(0), vec![args![3], args![6]]);
    }

    #[test]
    fn filter_other_slots_pass() {
        let rec = Recorder::new();
        of_slot(1, args![0])
            .filter(slots![Predicate::new(|_| Ok(false))])
            .call(rec.callbacks(2))
            .unwrap();
        assert_eq!(rec.events(), vec![(1, args![0])]);
    }

    #[test]
    fn functor_identity() {
        fn check(input: Vec<i32>) -> Result<(), String> {
            let sink = Sink::new(1);
            let a = sink.cps();
            let eq = cps_eq(&a.map(slots![id()]), &a, 1).map_err(|e| e.to_string())?;
            sink.feed(0, input.into_iter().map(|n| args![n])).map_err(|e| e.to_string())?;
            eq.sample()
        }
        quickcheck(check as fn(Vec<i32>) -> Result<(), String>);
    }

    #[test]
    fn functor_empty_identity() {
        fn check(input: Vec<i32>, errors: Vec<String>) -> Result<(), String> {
            let sink = Sink::new(2);
            let a = sink.cps();
            let eq = cps_eq(&a.map(slots![]), &a, 2).map_err(|e| e.to_string())?;
            sink.feed(0, input.into_iter().map(|n| args![n, n])).map_err(|e| e.to_string())?;
            sink.feed(1, errors.into_iter().map(|e| args![e])).map_err(|e| e.to_string())?;
            eq.sample()
        }
        quickcheck(check as fn(Vec<i32>, Vec<String>) -> Result<(), String>);
    }

    #[test]
    fn functor_composition() {
        fn check(input: Vec<i32>) -> Result<(), String> {
            let f = add(3);
            let g = mul(2);
            let composed = {
                let (f, g) = (f.clone(), g.clone());
                Func::new(move |args| g.call(Args::one(f.call(args)?)))
            };

            let sink = Sink::new(1);
            let a = sink.cps();
            let eq = cps_eq(&a.map(slots![f]).map(slots![g]), &a.map(slots![composed]), 1)
                .map_err(|e| e.to_string())?;
            sink.feed(0, input.into_iter().map(|n| args![n])).map_err(|e| e.to_string())?;
            eq.sample()
        }
        quickcheck(check as fn(Vec<i32>) -> Result<(), String>);
    }

    #[test]
    fn functor_composition_reconciles_slots() {
        fn check(values: Vec<i32>, errors: Vec<i32>) -> Result<(), String> {
            let sink = Sink::new(2);
            let a = sink.cps();
            let eq = cps_eq(
                &a.map(slots![add(1)]).map(slots![_, mul(2)]),
                &a.map(slots![add(1), mul(2)]),
                2,
            ).map_err(|e| e.to_string())?;
            for (v, e) in values.into_iter().zip(errors) {
                sink.send(0, args![v]).map_err(|e| e.to_string())?;
                sink.send(1, args![e]).map_err(|e| e.to_string())?;
            }
            eq.sample()
        }
        quickcheck(check as fn(Vec<i32>, Vec<i32>) -> Result<(), String>);
    }
}
