//! # convertible-pde
//!
//! Prices a convertible bond with early conversion by solving its pricing
//! PDE backward in time with Crank-Nicolson finite differences, enforcing
//! `V ≥ R·S` at every time level by penalty iteration.
//!
//! This crate is a **façade** that re-exports the workspace crates and adds
//! the one-call entry point [`crank_nicolson_price`].
//!
//! ## Quick start
//!
//! ```rust
//! use convertible_pde::{crank_nicolson_price, ConvertibleBondPde};
//!
//! let mut problem = ConvertibleBondPde::default();
//! problem.grid.time_steps = 25;
//! problem.grid.space_steps = 50;
//! let price = crank_nicolson_price(&problem)?;
//! assert!(price > 0.0 && price < 5.0 * problem.bond.face_value);
//! # Ok::<(), convertible_pde::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use cpde_core as core;

/// Interpolation and comparison utilities.
pub use cpde_math as math;

/// Tridiagonal solver, grids, and the penalty time-stepper.
pub use cpde_methods as methods;

pub use cpde_core::{Error, Price, Result};
pub use cpde_methods::{
    price_sweep, BondTerms, ConvertibleBondPde, CrankNicolsonPenaltyEngine, GridParameters,
    ModelParameters, PenaltyParameters,
};

/// Price `problem` at `problem.model.spot` with the default 8-point
/// interpolation stencil.
///
/// # Errors
/// * [`Error::Configuration`]: inputs rejected before any computation;
/// * [`Error::NumericalDivergence`]: the penalty iteration hit its ceiling;
/// * [`Error::SingularSystem`]: a zero pivot in the tridiagonal solve.
pub fn crank_nicolson_price(problem: &ConvertibleBondPde) -> Result<Price> {
    CrankNicolsonPenaltyEngine::new(*problem)?.npv()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn entry_point_matches_engine() {
        let mut problem = ConvertibleBondPde::default();
        problem.grid.time_steps = 10;
        problem.grid.space_steps = 30;
        let direct = CrankNicolsonPenaltyEngine::new(problem).unwrap().npv().unwrap();
        assert_abs_diff_eq!(crank_nicolson_price(&problem).unwrap(), direct, epsilon = 0.0);
    }

    #[test]
    fn entry_point_surfaces_configuration_errors() {
        let mut problem = ConvertibleBondPde::default();
        problem.bond.maturity = -1.0;
        assert!(matches!(
            crank_nicolson_price(&problem),
            Err(Error::Configuration(_))
        ));
    }
}
