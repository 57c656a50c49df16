//! # cpde-methods
//!
//! Numerical methods for the convertible bond PDE: the tridiagonal solver,
//! uniform grids, the Crank-Nicolson time-stepper with a penalty constraint,
//! and parallel parameter sweeps.
//!
//! # Modules
//!
//! * [`finite_differences`]: tridiagonal solver, grids, parameters, engine
//! * [`sweep`]: independent pricing runs in parallel

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Finite difference methods: tridiagonal solver, penalty time-stepper.
pub mod finite_differences;

/// Parallel evaluation of independent pricing problems.
pub mod sweep;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use finite_differences::{
    theta, thomas_solve, BondTerms, ConvertibleBondPde, CrankNicolsonPenaltyEngine,
    GridParameters, ModelParameters, PenaltyParameters, PenaltyRollback, TimeGrid,
    TimeLevelSnapshot, TridiagonalSystem, UniformGrid,
};
pub use sweep::price_sweep;
