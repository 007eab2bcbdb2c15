//! Lifting n-ary functions over several CPS functions.

use std::sync::{Arc, Mutex};

use crate::cps::Cps;
use crate::source::Callback;
use crate::utils::lock;
use crate::utils::tracing::{instrument, trace};
use crate::value::{Args, Func};

#[cfg(feature = "tracing")]
use tracing::Span;


/// Latest argument tuples of every source on one slot.
struct Slot {
    latest: Vec<Option<Args>>,
}

impl Slot {
    fn new(sources: usize) -> Slot {
        Slot { latest: vec![None; sources] }
    }

    /// Record an emission and return the combined tuple once every source
    /// has emitted at least once.
    fn update(&mut self, source: usize, args: Args) -> Option<Args> {
        self.latest[source] = Some(args);
        self.latest.iter()
            .try_fold(Args::new(), |acc, latest| latest.clone().map(|args| acc.concat(args)))
    }
}


/// Lift n-ary functions to a function on CPS functions.
///
/// On every full call all `sources` are started in order with the same
/// callbacks. On a slot with a function, the latest argument tuple of each
/// source is kept, and once every source has emitted on that slot, each
/// further emission fires the function with all latest tuples concatenated in
/// source order. Slots without a function merge the sources' emissions.
///
/// The result declares as many slots as the widest source. The cache lives as
/// long as one full call.
///
/// ```
/// # use cpsfn::{args, combine, of, slots, Callback, Func, Value};
/// let product = combine(
///     slots![Func::new(|args| Ok(Value::from(args.int(0)? * args.int(1)?)))],
///     vec![of(args![3]), of(args![5])],
/// );
/// product.call(Callback::new(|args| {
///     assert_eq!(args, args![15]);
///     Ok(())
/// })).unwrap();
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn combine(functions: Vec<Option<Func>>, sources: Vec<Cps>) -> Cps {
    #[cfg(feature = "tracing")]
    let combine_fn_span = Span::current();
    let arity = sources.iter().map(Cps::arity).max().unwrap_or(0);
    let functions: Arc<[Option<Func>]> = functions.into();
    let sources: Arc<[Cps]> = sources.into();
    Cps::new(arity, move |callbacks| {
        instrument!(follows_from: &combine_fn_span, "combine");
        let slots: Arc<[Mutex<Slot>]> = functions.iter()
            .map(|_| Mutex::new(Slot::new(sources.len())))
            .collect();
        for (index, source) in sources.iter().enumerate() {
            let synthesized = callbacks.rewire(|slot, callback| {
                match functions.get(slot) {
                    Some(Some(f)) => {
                        let f = f.clone();
                        let slots = slots.clone();
                        let callback = callback.clone();
                        Callback::new(move |args| {
                            trace!("combine: source {} emits {:?} on slot {}", index, args, slot);
                            let combined = lock(&slots[slot]).update(index, args);
                            match combined {
                                Some(combined) => callback.call(Args::one(f.call(combined)?)),
                                None => Ok(()),
                            }
                        })
                    },
                    _ => callback.clone(),
                }
            });
            source.call(synthesized)?;
        }
        Ok(())
    })
}
