//! Latest-emission cache

use crate::value::{Args, Func};


/// The most recent function and value seen on one slot of an `ap`.
///
/// Either side may arrive first and may be replaced any number of times.
/// Offering one side hands back the cached other side, if there is one, so
/// the caller can fire outside of any lock.
#[derive(Debug, Default)]
pub(crate) struct Latest {
    function: Option<Func>,
    value: Option<Args>,
}

impl Latest {
    /// Create an empty cache.
    pub fn new() -> Latest {
        Latest::default()
    }

    /// Store a new value and return the function to apply it to.
    pub fn offer_value(&mut self, value: Args) -> Option<Func> {
        self.value = Some(value);
        self.function.clone()
    }

    /// Store a new function and return the value to apply it to.
    pub fn offer_function(&mut self, function: Func) -> Option<Args> {
        self.function = Some(function);
        self.value.clone()
    }
}
