//! Error types for aggtools-rs.
//!
//! Every fallible operation in the workspace returns [`Result`], whose error
//! is the single `thiserror`-derived [`Error`] enum below.  Precondition and
//! runtime failures are raised through the `ensure!` and `fail!` macros.

use thiserror::Error;

use crate::EventId;

/// The top-level error type used throughout aggtools-rs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Required fields are absent from input rows.
    #[error("{} field(s) not in data", .missing.join(", "))]
    Schema {
        /// Names of the missing fields, in schema order.
        missing: Vec<String>,
    },

    /// An event identifier appears more than once in a table that must be
    /// unique by event.
    #[error("duplicate event id {0}")]
    DuplicateEvent(EventId),

    /// Two inputs cannot be combined (e.g. different simulation counts).
    #[error("inconsistent input: {0}")]
    InconsistentInput(String),

    /// Invalid argument supplied by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Shorthand `Result` type used throughout aggtools-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use agg_core::{ensure, errors::Error};
/// fn positive(x: f64) -> agg_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use agg_core::{fail, errors::Error};
/// fn always_err() -> agg_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
