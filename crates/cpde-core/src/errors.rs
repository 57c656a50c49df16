//! Error types for convertible-pde.
//!
//! Every failure of a pricing call falls into one of three classes: the
//! inputs were rejected before any work was done, the penalty iteration
//! failed to settle, or the linear solver met a zero pivot.  Each class is a
//! distinct variant so callers can tell them apart without string matching.
//! The `ensure!` macro defined here is the early-return form of an input check.

use thiserror::Error;

use crate::{Real, Size};

/// The top-level error type used throughout convertible-pde.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Inputs rejected before computation (zero interpolation order, empty
    /// grid, non-positive maturity, mismatched vector lengths, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The penalty iteration did not reach the tolerance within the
    /// iteration ceiling.
    #[error(
        "penalty iteration did not converge at time level {time_level} \
         after {iterations} iterations (residual {residual:e})"
    )]
    NumericalDivergence {
        /// Time level being solved when the ceiling was hit.
        time_level: Size,
        /// Number of linear solves performed at that level.
        iterations: Size,
        /// Sum of squared node differences on the last iteration.
        residual: Real,
    },

    /// A zero pivot was met during tridiagonal elimination.
    #[error("singular tridiagonal system: zero pivot at row {row}{}", level_suffix(.time_level))]
    SingularSystem {
        /// Row whose pivot vanished.
        row: Size,
        /// Time level being solved, when the solve happened inside the
        /// time-stepper.
        time_level: Option<Size>,
    },
}

fn level_suffix(time_level: &Option<Size>) -> String {
    match time_level {
        Some(level) => format!(" (time level {level})"),
        None => String::new(),
    }
}

impl Error {
    /// Attach a time level to a [`Error::SingularSystem`]; other variants
    /// pass through untouched.
    pub fn at_time_level(self, level: Size) -> Self {
        match self {
            Error::SingularSystem { row, .. } => Error::SingularSystem {
                row,
                time_level: Some(level),
            },
            other => other,
        }
    }
}

/// Shorthand `Result` type used throughout convertible-pde.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Input check.
///
/// Returns `Err(Error::Configuration(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use cpde_core::{ensure, errors::Error};
/// fn positive(x: f64) -> cpde_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Configuration(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Configuration(
                format!($($msg)*)
            ));
        }
    };
}
