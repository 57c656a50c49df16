//! Inputs of the convertible bond PDE, grouped by concern.
//!
//! Each group validates itself; [`ConvertibleBondPde::validate`] checks them
//! all.  `Default` on every group reproduces one reference scenario: a
//! two-year bond with face value 50 on a 100 × 100 grid reaching `5F`.

use cpde_core::{ensure, Price, Rate, Real, Result, Size, Time, Volatility};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Contract terms.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BondTerms {
    /// Maturity `T` in years.
    pub maturity: Time,
    /// Face value `F` repaid at maturity.
    pub face_value: Price,
    /// Recovery rate `R`: units of the underlying received on exercise.
    pub recovery_rate: Real,
    /// Coupon rate `C`.
    pub coupon: Rate,
    /// Coupon discount exponent `alpha`.
    pub coupon_decay: Real,
}

impl BondTerms {
    /// Immediate-exercise value `R · S`; the obstacle the solution may not
    /// fall below.
    #[inline]
    pub fn exercise_value(&self, s: Real) -> Real {
        self.recovery_rate * s
    }

    /// Value at maturity, `max(F, R · S)`.
    #[inline]
    pub fn terminal_value(&self, s: Real) -> Real {
        self.face_value.max(self.exercise_value(s))
    }

    /// Check the terms.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.maturity.is_finite() && self.maturity > 0.0,
            "maturity must be positive, got {}",
            self.maturity
        );
        ensure!(self.face_value.is_finite(), "face value must be finite");
        ensure!(self.recovery_rate.is_finite(), "recovery rate must be finite");
        ensure!(self.coupon.is_finite(), "coupon must be finite");
        ensure!(self.coupon_decay.is_finite(), "coupon decay must be finite");
        Ok(())
    }
}

impl Default for BondTerms {
    fn default() -> Self {
        Self {
            maturity: 2.0,
            face_value: 50.0,
            recovery_rate: 1.0,
            coupon: 0.285,
            coupon_decay: 0.01,
        }
    }
}

/// Dynamics of the underlying state variable.
///
/// Local variance `σ² S^{2β}`, mean reversion at speed `kappa` towards the
/// deterministic level `theta(t) = (1 + mu) · X · e^{mu t}`, discounting at
/// `r`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModelParameters {
    /// Risk-free rate `r`.
    pub rate: Rate,
    /// Mean-reversion speed `kappa`.
    pub kappa: Real,
    /// Growth rate `mu` of the reversion level.
    pub mu: Real,
    /// Reference level `X` of the reversion target.
    pub reference_level: Real,
    /// Elasticity exponent `beta`.
    pub beta: Real,
    /// Volatility `sigma`.
    pub sigma: Volatility,
    /// Current value `S0` of the underlying; where the price is read off.
    pub spot: Real,
}

impl ModelParameters {
    /// Check the parameters.
    pub fn validate(&self) -> Result<()> {
        let all_finite = [
            self.rate,
            self.kappa,
            self.mu,
            self.reference_level,
            self.beta,
            self.sigma,
            self.spot,
        ]
        .iter()
        .all(|v| v.is_finite());
        ensure!(all_finite, "model parameters must be finite: {self:?}");
        Ok(())
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            rate: 0.0114,
            kappa: 0.125,
            mu: 0.0174,
            reference_level: 50.5,
            beta: 0.869,
            sigma: 0.668,
            spot: 50.5,
        }
    }
}

/// Discretisation of time and space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridParameters {
    /// Number of time steps `i_max`.
    pub time_steps: Size,
    /// Number of spatial steps `j_max`; the grid has `j_max + 1` nodes.
    pub space_steps: Size,
    /// Upper end `S_max` of the spatial grid.
    pub s_max: Real,
}

impl GridParameters {
    /// Check the parameters.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.time_steps > 0, "time steps must be positive");
        ensure!(self.space_steps > 0, "space steps must be positive");
        ensure!(
            self.s_max.is_finite() && self.s_max > 0.0,
            "S_max must be positive, got {}",
            self.s_max
        );
        Ok(())
    }
}

impl Default for GridParameters {
    fn default() -> Self {
        Self {
            time_steps: 100,
            space_steps: 100,
            s_max: 250.0,
        }
    }
}

/// Controls of the penalty iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PenaltyParameters {
    /// Penalty constant `rho` added to rows violating the obstacle.
    pub rho: Real,
    /// Convergence tolerance; iteration stops once the summed squared
    /// change drops below `tolerance²`.
    pub tolerance: Real,
    /// Iteration ceiling per time level.
    pub max_iterations: Size,
}

impl PenaltyParameters {
    /// Check the parameters.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.rho.is_finite() && self.rho > 0.0,
            "penalty constant must be positive, got {}",
            self.rho
        );
        ensure!(
            self.tolerance.is_finite() && self.tolerance > 0.0,
            "tolerance must be positive, got {}",
            self.tolerance
        );
        ensure!(self.max_iterations > 0, "iteration ceiling must be positive");
        Ok(())
    }
}

impl Default for PenaltyParameters {
    fn default() -> Self {
        Self {
            rho: 1e8,
            tolerance: 1e-4,
            max_iterations: 10_000,
        }
    }
}

/// Complete input set of one pricing run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConvertibleBondPde {
    /// Contract terms.
    pub bond: BondTerms,
    /// Underlying dynamics.
    pub model: ModelParameters,
    /// Discretisation.
    pub grid: GridParameters,
    /// Penalty iteration controls.
    pub penalty: PenaltyParameters,
}

impl ConvertibleBondPde {
    /// Check every parameter group.
    pub fn validate(&self) -> Result<()> {
        self.bond.validate()?;
        self.model.validate()?;
        self.grid.validate()?;
        self.penalty.validate()
    }
}
