//! Applicative combination of a value source with function sources.

use std::sync::{Arc, Mutex};

use crate::cps::{Cps, Operator};
use crate::error::CallbackResult;
use crate::latest::Latest;
use crate::source::Callback;
use crate::unit::of;
use crate::utils::lock;
use crate::utils::tracing::{instrument, trace};
use crate::value::{Args, Func, Value};

#[cfg(feature = "tracing")]
use tracing::Span;


fn fire(callback: &Callback, function: Func, value: Args) -> CallbackResult {
    callback.call(Args::one(function.call(value)?))
}

/// Apply functions emitted by other CPS functions to the values of a source.
///
/// On every full call the source and each `functions[i]` are started side by
/// side, source first. `functions[i]` receives a single callback and must
/// emit a function as its first argument. Per slot `i`, the latest function
/// and the latest value tuple are cached, and whenever either side emits
/// while the other one has already emitted, the `i`-th callback receives
/// `function(value)`. A slot that never sees both sides never fires.
///
/// Unlike the accumulators of [`scan`](crate::scan()), which are shared by
/// every call of the result, the cache is created afresh for each full call.
/// Two calls never pair one's values with the other's functions, since each
/// call starts its own function sources. Slots without a function source pass
/// the source's emissions through, and function sources for slots the caller
/// supplied no callback for are not started.
///
/// ```
/// # use cpsfn::{args, ap, of, slots, Callback, Func, Value};
/// let double = of(args![Func::new(|args| Ok(Value::from(args.int(0)? * 2)))]);
/// ap(slots![double])(of(args![5])).call(Callback::new(|args| {
///     assert_eq!(args, args![10]);
///     Ok(())
/// })).unwrap();
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn ap(functions: Vec<Option<Cps>>) -> Operator {
    #[cfg(feature = "tracing")]
    let ap_fn_span = Span::current();
    let functions: Arc<[Option<Cps>]> = functions.into();
    Box::new(move |source| {
        let functions = functions.clone();
        #[cfg(feature = "tracing")]
        let ap_fn_span = ap_fn_span.clone();
        Cps::new(source.arity(), move |callbacks| {
            instrument!(follows_from: &ap_fn_span, "ap");
            let cache: Arc<[Mutex<Latest>]> =
                functions.iter().map(|_| Mutex::new(Latest::new())).collect();

            let values = callbacks.rewire(|slot, callback| {
                match functions.get(slot) {
                    Some(Some(_)) => {
                        let cache = cache.clone();
                        let callback = callback.clone();
                        Callback::new(move |args| {
                            trace!("ap: slot {} received value {:?}", slot, args);
                            let function = lock(&cache[slot]).offer_value(args.clone());
                            match function {
                                Some(function) => fire(&callback, function, args),
                                None => Ok(()),
                            }
                        })
                    },
                    _ => callback.clone(),
                }
            });
            source.call(values)?;

            for (slot, callback) in callbacks.iter().enumerate() {
                let function_source = match functions.get(slot) {
                    Some(Some(function_source)) => function_source,
                    _ => continue,
                };
                let cache = cache.clone();
                let callback = callback.clone();
                function_source.call(Callback::new(move |args| {
                    let function = args.arg(0)?.as_func()?.clone();
                    trace!("ap: slot {} received function {:?}", slot, function);
                    let value = lock(&cache[slot]).offer_function(function.clone());
                    match value {
                        Some(value) => fire(&callback, function, value),
                        None => Ok(()),
                    }
                }))?;
            }
            Ok(())
        })
    })
}

/// Apply plain functions to the values of a source.
///
/// This is `ap` with every function already lifted by `of`, so the caller
/// does not have to build a CPS function emitting a function.
///
/// ```
/// # use cpsfn::{args, lift, of, slots, Callback, Func, Value};
/// let area = lift(slots![Func::new(|args| Ok(Value::from(args.int(0)? * args.int(1)?)))]);
/// area(of(args![3, 4])).call(Callback::new(|args| {
///     assert_eq!(args, args![12]);
///     Ok(())
/// })).unwrap();
/// ```
pub fn lift(functions: Vec<Option<Func>>) -> Operator {
    ap(functions.into_iter()
        .map(|f| f.map(|f| of(Args::one(Value::Func(f)))))
        .collect())
}
