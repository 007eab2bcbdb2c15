//! Faults raised while an emission is delivered.

use thiserror::Error;

/// An error raised while a CPS function delivers an emission.
///
/// Errors travel back to whoever triggered the emission. Combinators never
/// turn them into emissions on another callback slot.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// A CPS function emitted on a slot the caller did not supply a callback
    /// for.
    #[error("no callback for slot {slot}, only {supplied} supplied")]
    MissingCallback {
        /// The slot that was emitted on.
        slot: usize,
        /// Number of callbacks the caller supplied.
        supplied: usize,
    },

    /// A value was applied as a function, but it is not one.
    #[error("expected a function, found {found}")]
    NotCallable {
        /// Kind of the value that was applied.
        found: &'static str,
    },

    /// A typed accessor met a value of another kind.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Kind the accessor asked for.
        expected: &'static str,
        /// Kind of the value that was found.
        found: &'static str,
    },

    /// An argument tuple was shorter than required.
    #[error("missing argument at position {index}")]
    MissingArgument {
        /// Position of the missing argument.
        index: usize,
    },

    /// Raised by user code.
    #[error("{0}")]
    Raised(String),
}

impl Error {
    /// Raise an error from a transform, reducer or callback.
    pub fn raise<S: Into<String>>(message: S) -> Error {
        Error::Raised(message.into())
    }
}

/// Shorthand for common callback results.
pub type CallbackResult<T = ()> = Result<T, Error>;
