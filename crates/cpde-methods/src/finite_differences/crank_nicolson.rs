//! Crank-Nicolson time-stepping with a penalty constraint.
//!
//! Solves the convertible bond PDE
//!
//! `∂V/∂t + ½σ²S^{2β}·∂²V/∂S² + κ(θ(t) − S)·∂V/∂S − rV + C·e^{−αt} = 0`
//!
//! backward from maturity on a uniform `S` grid, subject to `V ≥ R·S`
//! (conversion can happen at any time).  At every time level the
//! Crank-Nicolson system is assembled once, then re-solved with rows that
//! violate the obstacle penalised by `rho` until the solution stops moving.
//!
//! Boundary rows:
//! * `S = 0`: one-sided relation carrying the drift `κθ(t)` and the coupon
//!   forcing `C·e^{−t}`;
//! * `S = S_max`: Dirichlet, `V = R·S_max`.

use cpde_core::{ensure, Error, Price, Real, Result, Size, Time};
use cpde_math::{lagrange_interpolate, squared_distance};
use tracing::{debug, trace, warn};

use super::mesh::{TimeGrid, UniformGrid};
use super::parameters::ConvertibleBondPde;
use super::tridiagonal::{thomas_solve_into, ThomasWorkspace, TridiagonalSystem};

/// Number of stencil points used to read the price off the grid.
pub const DEFAULT_INTERPOLATION_ORDER: Size = 8;

/// Mean-reversion target at time level `i`: `(1 + mu) · X · e^{mu · i · dt}`.
#[inline]
pub fn theta(mu: Real, x: Real, dt: Time, i: Size) -> Real {
    (1.0 + mu) * x * (mu * i as Real * dt).exp()
}

// ─── Results ──────────────────────────────────────────────────────────────────

/// State after one committed time level, handed to the observer of
/// [`CrankNicolsonPenaltyEngine::rollback_with`].
#[derive(Debug, Clone, Copy)]
pub struct TimeLevelSnapshot<'a> {
    /// Time level index.
    pub level: Size,
    /// Physical time of the level.
    pub time: Time,
    /// Spatial nodes.
    pub nodes: &'a [Real],
    /// Converged solution at this level.
    pub values: &'a [Real],
    /// Linear solves the penalty iteration needed.
    pub iterations: Size,
    /// Squared change on the final iteration.
    pub residual: Real,
}

/// Solution at `t = 0` together with convergence diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyRollback {
    nodes: Vec<Real>,
    values: Vec<Real>,
    iterations: Vec<Size>,
}

impl PenaltyRollback {
    /// Spatial nodes.
    pub fn nodes(&self) -> &[Real] {
        &self.nodes
    }

    /// Solution values at `t = 0`, one per node.
    pub fn values(&self) -> &[Real] {
        &self.values
    }

    /// Penalty iterations per time level, indexed by level.
    pub fn iterations(&self) -> &[Size] {
        &self.iterations
    }

    /// Penalty iterations summed over all levels.
    pub fn total_iterations(&self) -> Size {
        self.iterations.iter().sum()
    }

    /// Interpolate the `t = 0` solution at `s` with an `order`-point
    /// Lagrange stencil.
    pub fn value_at(&self, s: Real, order: Size) -> Result<Price> {
        lagrange_interpolate(&self.values, &self.nodes, s, order)
    }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// Buffers reused across time levels and penalty iterations.
struct Workspace {
    base: TridiagonalSystem,
    diag: Vec<Real>,
    rhs: Vec<Real>,
    thomas: ThomasWorkspace,
    candidate: Vec<Real>,
    next: Vec<Real>,
}

impl Workspace {
    fn new(n: Size) -> Self {
        Self {
            base: TridiagonalSystem::new(n),
            diag: vec![0.0; n],
            rhs: vec![0.0; n],
            thomas: ThomasWorkspace::new(n),
            candidate: vec![0.0; n],
            next: vec![0.0; n],
        }
    }
}

/// Outcome of the penalty iteration at one level.
#[derive(Debug, Clone, Copy)]
struct Convergence {
    iterations: Size,
    residual: Real,
}

/// Finite difference engine for the convertible bond PDE with the early
/// conversion constraint enforced by penalty iteration.
///
/// # Example
/// ```
/// use cpde_methods::{ConvertibleBondPde, CrankNicolsonPenaltyEngine};
///
/// let mut problem = ConvertibleBondPde::default();
/// problem.grid.time_steps = 20;
/// problem.grid.space_steps = 40;
/// let price = CrankNicolsonPenaltyEngine::new(problem)?.npv()?;
/// assert!(price.is_finite() && price > 0.0);
/// # Ok::<(), cpde_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CrankNicolsonPenaltyEngine {
    problem: ConvertibleBondPde,
    space: UniformGrid,
    time: TimeGrid,
    interpolation_order: Size,
}

impl CrankNicolsonPenaltyEngine {
    /// Validate `problem` and build the grids.
    ///
    /// # Errors
    /// [`Error::Configuration`] for any rejected input.
    pub fn new(problem: ConvertibleBondPde) -> Result<Self> {
        problem.validate()?;
        let space = UniformGrid::new(problem.grid.s_max, problem.grid.space_steps)?;
        let time = TimeGrid::uniform(problem.bond.maturity, problem.grid.time_steps)?;
        Ok(Self {
            problem,
            space,
            time,
            interpolation_order: DEFAULT_INTERPOLATION_ORDER,
        })
    }

    /// Use an `order`-point stencil in [`npv`](Self::npv).
    pub fn with_interpolation_order(mut self, order: Size) -> Result<Self> {
        ensure!(order > 0, "interpolation order must be positive");
        self.interpolation_order = order;
        Ok(self)
    }

    /// The validated inputs.
    pub fn problem(&self) -> &ConvertibleBondPde {
        &self.problem
    }

    /// Spatial grid.
    pub fn space_grid(&self) -> &UniformGrid {
        &self.space
    }

    /// Time grid.
    pub fn time_grid(&self) -> &TimeGrid {
        &self.time
    }

    /// Price at `model.spot`.
    ///
    /// # Errors
    /// [`Error::NumericalDivergence`] or [`Error::SingularSystem`] from the
    /// backward sweep; no value is returned in either case.
    pub fn npv(&self) -> Result<Price> {
        self.rollback()?
            .value_at(self.problem.model.spot, self.interpolation_order)
    }

    /// Run the backward sweep from maturity to `t = 0`.
    pub fn rollback(&self) -> Result<PenaltyRollback> {
        self.rollback_with(|_| {})
    }

    /// Run the backward sweep, calling `observer` after every committed
    /// time level.
    pub fn rollback_with<F>(&self, mut observer: F) -> Result<PenaltyRollback>
    where
        F: FnMut(&TimeLevelSnapshot<'_>),
    {
        let nodes = self.space.nodes();
        let bond = &self.problem.bond;
        let mut ws = Workspace::new(nodes.len());
        let mut values: Vec<Real> = nodes.iter().map(|&s| bond.terminal_value(s)).collect();
        let mut iterations = vec![0; self.time.steps()];

        for level in self.time.backward_levels() {
            self.assemble(level, &values, &mut ws.base);
            ws.candidate.copy_from_slice(&values);
            let convergence = self.penalty_iteration(level, &mut ws)?;
            values.copy_from_slice(&ws.candidate);
            iterations[level] = convergence.iterations;

            debug!(
                time_level = level,
                iterations = convergence.iterations,
                residual = convergence.residual,
                "penalty iteration converged"
            );
            observer(&TimeLevelSnapshot {
                level,
                time: self.time.time(level),
                nodes,
                values: &values,
                iterations: convergence.iterations,
                residual: convergence.residual,
            });
        }

        let rollback = PenaltyRollback {
            nodes: nodes.to_vec(),
            values,
            iterations,
        };
        debug!(
            time_levels = self.time.steps(),
            total_iterations = rollback.total_iterations(),
            "backward sweep finished"
        );
        Ok(rollback)
    }

    /// Fill `sys` with the Crank-Nicolson system taking `previous` (level
    /// `level + 1`) to level `level`.
    fn assemble(&self, level: Size, previous: &[Real], sys: &mut TridiagonalSystem) {
        let bond = &self.problem.bond;
        let model = &self.problem.model;
        let dt = self.time.dt();
        let ds = self.space.spacing();
        let t = self.time.time(level);
        let j_max = self.space.steps();
        let target = theta(model.mu, model.reference_level, dt, level);
        let r = model.rate;

        // S = 0
        let drift = model.kappa * target / ds;
        sys.lower[0] = 0.0;
        sys.diag[0] = -(1.0 / dt) - drift - 0.5 * r;
        sys.upper[0] = drift;
        sys.rhs[0] = (-(1.0 / dt) + 0.5 * r) * previous[0] - bond.coupon * (-t).exp();

        // Interior
        let variance = 0.25 * model.sigma * model.sigma * ds.powf(2.0 * (model.beta - 1.0));
        let coupon = bond.coupon * (-bond.coupon_decay * t).exp();
        for j in 1..j_max {
            let diffusion = variance * (j as Real).powf(2.0 * model.beta);
            let convection = model.kappa / (4.0 * ds) * (target - self.space.node(j));
            sys.lower[j] = -diffusion + convection;
            sys.diag[j] = 1.0 / dt + 2.0 * diffusion + 0.5 * r;
            sys.upper[j] = -diffusion - convection;
            sys.rhs[j] = (diffusion - convection) * previous[j - 1]
                + (1.0 / dt - 2.0 * diffusion - 0.5 * r) * previous[j]
                + (diffusion + convection) * previous[j + 1]
                + coupon;
        }

        // S = S_max
        sys.lower[j_max] = 0.0;
        sys.diag[j_max] = 1.0;
        sys.upper[j_max] = 0.0;
        sys.rhs[j_max] = bond.exercise_value(self.space.upper());
    }

    /// Iterate penalised solves from `ws.candidate` until the change drops
    /// below `tolerance²`; the converged solution is left in `ws.candidate`.
    fn penalty_iteration(&self, level: Size, ws: &mut Workspace) -> Result<Convergence> {
        let bond = &self.problem.bond;
        let penalty = &self.problem.penalty;
        let nodes = self.space.nodes();
        let j_max = self.space.steps();
        let threshold = penalty.tolerance * penalty.tolerance;
        let mut residual = Real::INFINITY;

        for iteration in 1..=penalty.max_iterations {
            ws.diag.copy_from_slice(&ws.base.diag);
            ws.rhs.copy_from_slice(&ws.base.rhs);
            let mut penalised: Size = 0;
            for j in 1..j_max {
                let floor = bond.exercise_value(nodes[j]);
                if ws.candidate[j] < floor {
                    ws.diag[j] += penalty.rho;
                    ws.rhs[j] += penalty.rho * floor;
                    penalised += 1;
                }
            }

            thomas_solve_into(
                &ws.base.lower,
                &ws.diag,
                &ws.base.upper,
                &ws.rhs,
                &mut ws.thomas,
                &mut ws.next,
            )
            .map_err(|e| e.at_time_level(level))?;

            // The Dirichlet node never moves, so it is left out.
            residual = squared_distance(&ws.candidate[..j_max], &ws.next[..j_max]);
            std::mem::swap(&mut ws.candidate, &mut ws.next);
            trace!(time_level = level, iteration, penalised, residual, "penalty iteration");

            if residual < threshold {
                return Ok(Convergence {
                    iterations: iteration,
                    residual,
                });
            }
        }

        warn!(
            time_level = level,
            iterations = penalty.max_iterations,
            residual,
            "penalty iteration did not converge"
        );
        Err(Error::NumericalDivergence {
            time_level: level,
            iterations: penalty.max_iterations,
            residual,
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::parameters::{
        BondTerms, GridParameters, ModelParameters, PenaltyParameters,
    };
    use approx::assert_abs_diff_eq;

    fn small_problem() -> ConvertibleBondPde {
        ConvertibleBondPde {
            grid: GridParameters {
                time_steps: 20,
                space_steps: 40,
                s_max: 250.0,
            },
            ..ConvertibleBondPde::default()
        }
    }

    /// No diffusion, drift, coupon, or conversion: every node is discounted
    /// by the Crank-Nicolson factor each step.
    fn discount_only(rate: Real) -> ConvertibleBondPde {
        ConvertibleBondPde {
            bond: BondTerms {
                maturity: 1.0,
                face_value: 50.0,
                recovery_rate: 0.0,
                coupon: 0.0,
                coupon_decay: 0.0,
            },
            model: ModelParameters {
                rate,
                kappa: 0.0,
                mu: 0.0,
                reference_level: 50.0,
                beta: 1.0,
                sigma: 0.0,
                spot: 40.0,
            },
            grid: GridParameters {
                time_steps: 50,
                space_steps: 50,
                s_max: 100.0,
            },
            penalty: PenaltyParameters::default(),
        }
    }

    #[test]
    fn theta_grows_at_mu() {
        assert_abs_diff_eq!(theta(0.0, 50.5, 0.02, 37), 50.5, epsilon = 1e-12);
        assert_abs_diff_eq!(theta(0.0174, 50.5, 0.02, 0), 1.0174 * 50.5, epsilon = 1e-12);
        assert_abs_diff_eq!(
            theta(0.0174, 50.5, 0.02, 50),
            1.0174 * 50.5 * (0.0174_f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn assembled_rows_follow_the_scheme() {
        let engine = CrankNicolsonPenaltyEngine::new(small_problem()).unwrap();
        let p = engine.problem();
        let n = engine.space_grid().size();
        let previous: Vec<Real> = engine
            .space_grid()
            .nodes()
            .iter()
            .map(|&s| p.bond.terminal_value(s))
            .collect();
        let mut sys = TridiagonalSystem::new(n);
        let level = 7;
        engine.assemble(level, &previous, &mut sys);

        let dt = engine.time_grid().dt();
        let ds = engine.space_grid().spacing();
        let target = theta(p.model.mu, p.model.reference_level, dt, level);
        let t = level as Real * dt;

        // S = 0
        assert_eq!(sys.lower[0], 0.0);
        assert_abs_diff_eq!(sys.upper[0], p.model.kappa * target / ds, epsilon = 1e-12);
        assert_abs_diff_eq!(
            sys.diag[0],
            -(1.0 / dt) - p.model.kappa * target / ds - 0.5 * p.model.rate,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            sys.rhs[0],
            (-(1.0 / dt) + 0.5 * p.model.rate) * previous[0] - p.bond.coupon * (-t).exp(),
            epsilon = 1e-12
        );

        // j = 3
        let j = 3;
        let diffusion = 0.25
            * p.model.sigma.powi(2)
            * (j as Real).powf(2.0 * p.model.beta)
            * ds.powf(2.0 * (p.model.beta - 1.0));
        let convection = p.model.kappa / (4.0 * ds) * (target - j as Real * ds);
        assert_abs_diff_eq!(sys.lower[j], -diffusion + convection, epsilon = 1e-12);
        assert_abs_diff_eq!(sys.upper[j], -diffusion - convection, epsilon = 1e-12);
        assert_abs_diff_eq!(
            sys.diag[j],
            1.0 / dt + 2.0 * diffusion + 0.5 * p.model.rate,
            epsilon = 1e-12
        );

        // S = S_max
        let top = n - 1;
        assert_eq!(sys.lower[top], 0.0);
        assert_eq!(sys.diag[top], 1.0);
        assert_eq!(sys.rhs[top], p.bond.recovery_rate * engine.space_grid().upper());
    }

    #[test]
    fn frozen_dynamics_keep_the_terminal_payoff() {
        let mut problem = discount_only(0.0);
        problem.bond.recovery_rate = 1.0;
        let engine = CrankNicolsonPenaltyEngine::new(problem).unwrap();
        let rollback = engine.rollback().unwrap();
        for (&s, &v) in rollback.nodes().iter().zip(rollback.values()) {
            assert_abs_diff_eq!(v, problem.bond.terminal_value(s), epsilon = 1e-9);
        }
        assert!(rollback.iterations().iter().all(|&k| k == 1));
    }

    #[test]
    fn pure_discounting_matches_closed_form() {
        let problem = discount_only(0.05);
        let engine = CrankNicolsonPenaltyEngine::new(problem).unwrap();
        let dt = engine.time_grid().dt();
        let factor = (1.0 - 0.5 * 0.05 * dt) / (1.0 + 0.5 * 0.05 * dt);
        let expected = 50.0 * factor.powi(50);
        assert_abs_diff_eq!(engine.npv().unwrap(), expected, epsilon = 1e-9);
        // Crank-Nicolson discounting is second order accurate
        assert_abs_diff_eq!(expected, 50.0 * (-0.05_f64).exp(), epsilon = 1e-5);
    }

    #[test]
    fn snapshots_cover_every_level_in_backward_order() {
        let engine = CrankNicolsonPenaltyEngine::new(small_problem()).unwrap();
        let mut seen = Vec::new();
        let rollback = engine
            .rollback_with(|snap| {
                assert_eq!(snap.values.len(), snap.nodes.len());
                assert_abs_diff_eq!(snap.time, snap.level as Real * 0.1, epsilon = 1e-12);
                seen.push((snap.level, snap.iterations));
            })
            .unwrap();
        let levels: Vec<Size> = seen.iter().map(|&(level, _)| level).collect();
        assert_eq!(levels, (0..20).rev().collect::<Vec<_>>());
        for (level, iterations) in seen {
            assert_eq!(rollback.iterations()[level], iterations);
        }
        assert!(rollback.iterations().iter().all(|&k| k >= 1));
    }

    #[test]
    fn iteration_ceiling_is_a_divergence() {
        let mut problem = small_problem();
        problem.penalty.max_iterations = 1;
        let err = CrankNicolsonPenaltyEngine::new(problem)
            .unwrap()
            .npv()
            .unwrap_err();
        match err {
            Error::NumericalDivergence {
                time_level,
                iterations,
                residual,
            } => {
                assert_eq!(time_level, 19);
                assert_eq!(iterations, 1);
                assert!(residual >= 1e-8);
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn interpolation_order_is_configurable() {
        let engine = CrankNicolsonPenaltyEngine::new(small_problem()).unwrap();
        assert!(engine.clone().with_interpolation_order(0).is_err());

        let rollback = engine.rollback().unwrap();
        // spot 50.5 is nearest node 50.0 (index 8, dS = 6.25)
        let nearest = engine.with_interpolation_order(1).unwrap().npv().unwrap();
        assert_eq!(nearest, rollback.values()[8]);
    }

    #[test]
    fn invalid_problem_is_rejected_before_solving() {
        let mut problem = small_problem();
        problem.grid.space_steps = 0;
        assert!(matches!(
            CrankNicolsonPenaltyEngine::new(problem),
            Err(Error::Configuration(_))
        ));
    }
}
