//! Finite difference machinery for the convertible bond PDE.
//!
//! # Overview
//!
//! * [`TridiagonalSystem`] / [`thomas_solve`]: tridiagonal systems and the
//!   Thomas algorithm
//! * [`UniformGrid`] / [`TimeGrid`]: uniform space and time discretisation
//! * [`ConvertibleBondPde`]: input parameters, grouped by concern
//! * [`CrankNicolsonPenaltyEngine`]: backward Crank-Nicolson sweep with the
//!   conversion constraint enforced by penalty iteration

/// Crank-Nicolson time-stepper with penalty iteration.
pub mod crank_nicolson;
/// Uniform space and time grids.
pub mod mesh;
/// Problem parameters.
pub mod parameters;
/// Tridiagonal systems and the Thomas algorithm.
pub mod tridiagonal;

pub use crank_nicolson::{
    theta, CrankNicolsonPenaltyEngine, PenaltyRollback, TimeLevelSnapshot,
    DEFAULT_INTERPOLATION_ORDER,
};
pub use mesh::{TimeGrid, UniformGrid};
pub use parameters::{
    BondTerms, ConvertibleBondPde, GridParameters, ModelParameters, PenaltyParameters,
};
pub use tridiagonal::{thomas_solve, thomas_solve_into, ThomasWorkspace, TridiagonalSystem};
