//! Monadic chaining of CPS functions.

use std::fmt;
use std::sync::Arc;

use crate::cps::{Cps, Operator};
use crate::error::CallbackResult;
use crate::source::Callback;
use crate::utils::tracing::{instrument, trace};
use crate::value::Args;

#[cfg(feature = "tracing")]
use tracing::Span;


/// A function from an emission to the CPS function it continues with.
#[derive(Clone)]
pub struct Bind(Arc<dyn Fn(Args) -> CallbackResult<Cps> + Send + Sync + 'static>);

impl Bind {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Bind
        where F: Fn(Args) -> CallbackResult<Cps> + Send + Sync + 'static,
    {
        Bind(Arc::new(f))
    }

    /// Produce the continuation for an emission.
    pub fn call(&self, args: Args) -> CallbackResult<Cps> {
        (self.0)(args)
    }
}

impl fmt::Debug for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bind({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}


/// Chain every emission of a slot into another CPS function.
///
/// Each emission on slot `i` is passed to `binds[i]`, and the CPS function
/// it returns is fully called with the *whole* downstream callback list. Its
/// emissions, on whichever slots, go straight downstream. Slots without a
/// bind pass through unchanged.
///
/// ```
/// # use cpsfn::{args, flat_map, from_iter, of, slots, Bind, Callback};
/// let twice = flat_map(slots![Bind::new(|args| {
///     let n = args.int(0)?;
///     Ok(from_iter(vec![n, n]))
/// })]);
/// twice(of(args![7])).call(Callback::new(|args| {
///     assert_eq!(args, args![7]);
///     Ok(())
/// })).unwrap();
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn flat_map(binds: Vec<Option<Bind>>) -> Operator {
    #[cfg(feature = "tracing")]
    let flat_map_fn_span = Span::current();
    let binds: Arc<[Option<Bind>]> = binds.into();
    Box::new(move |source| {
        let binds = binds.clone();
        #[cfg(feature = "tracing")]
        let flat_map_fn_span = flat_map_fn_span.clone();
        Cps::new(source.arity(), move |callbacks| {
            instrument!(follows_from: &flat_map_fn_span, "flat_map");
            let synthesized = callbacks.rewire(|slot, callback| {
                match binds.get(slot) {
                    Some(Some(bind)) => {
                        let bind = bind.clone();
                        let downstream = callbacks.clone();
                        Callback::new(move |args| {
                            trace!("flat_map: slot {} binds {:?}", slot, args);
                            bind.call(args)?.call(downstream.clone())
                        })
                    },
                    _ => callback.clone(),
                }
            });
            source.call(synthesized)
        })
    })
}
