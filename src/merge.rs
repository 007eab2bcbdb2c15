//! Merging CPS functions.

use std::sync::Arc;

use crate::cps::Cps;
use crate::utils::tracing::{instrument, trace};

#[cfg(feature = "tracing")]
use tracing::Span;


/// Merge several CPS functions into one.
///
/// Every full call fully calls each source, in order, with the same
/// callbacks, so each slot sees every emission of every source as it happens.
/// The result declares as many slots as the widest source. The first error
/// stops the remaining sources from being started.
///
/// With no sources this is [`never`](crate::never), the identity of `merge`.
///
/// ```
/// # use cpsfn::{args, merge, of, Callback};
/// merge(vec![of(args![1]), of(args![2])]).call(Callback::new(|args| {
///     assert!(args == args![1] || args == args![2]);
///     Ok(())
/// })).unwrap();
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn merge(sources: Vec<Cps>) -> Cps {
    #[cfg(feature = "tracing")]
    let merge_fn_span = Span::current();
    let arity = sources.iter().map(Cps::arity).max().unwrap_or(0);
    let sources: Arc<[Cps]> = sources.into();
    Cps::new(arity, move |callbacks| {
        instrument!(follows_from: &merge_fn_span, "merge");
        for source in sources.iter() {
            trace!("merge: starting {:?}", source);
            source.call(callbacks.clone())?;
        }
        Ok(())
    })
}

/// Merge any number of CPS functions.
///
/// ```
/// # use cpsfn::{args, merge, of, of_slot};
/// let both = merge!(of(args![1]), of_slot(1, args!["e"]));
/// assert_eq!(both.arity(), 2);
/// ```
#[macro_export]
macro_rules! merge {
    ($($source:expr),* $(,)?) => {
        $crate::merge(::std::vec![$($source),*])
    };
}
