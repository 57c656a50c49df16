//! Parameter sweeps.
//!
//! A single pricing run is strictly sequential, but separate runs share
//! nothing, so a sweep over inputs is spread across the rayon thread pool.

use cpde_core::{Price, Result};
use rayon::prelude::*;

use crate::finite_differences::{ConvertibleBondPde, CrankNicolsonPenaltyEngine};

/// Price every problem, in parallel.  Results keep the input order; a
/// failing problem does not affect the others.
pub fn price_sweep(problems: &[ConvertibleBondPde]) -> Vec<Result<Price>> {
    problems
        .par_iter()
        .map(|&problem| CrankNicolsonPenaltyEngine::new(problem).and_then(|engine| engine.npv()))
        .collect()
}
