//! # cpde-math
//!
//! Mathematical utilities: local polynomial interpolation on uniform grids
//! and the distance measure used by the penalty iteration.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Distance between grid vectors.
pub mod comparison;

/// 1D interpolation schemes.
pub mod interpolations;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use comparison::squared_distance;
pub use interpolations::{lagrange_interpolate, Interpolation1D, LagrangeInterpolation};
