//! Uniform space and time grids for the finite difference scheme.

use cpde_core::{ensure, Real, Result, Size, Time};

// ─── Spatial grid ─────────────────────────────────────────────────────────────

/// Uniformly spaced spatial nodes `S_j = j · dS`, `j = 0..=steps`,
/// `dS = upper / steps`.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformGrid {
    nodes: Vec<Real>,
    spacing: Real,
}

impl UniformGrid {
    /// Create a grid on `[0, upper]` with `steps` intervals.
    ///
    /// # Errors
    /// Returns an error if `steps == 0` or `upper` is not a positive finite
    /// number.
    pub fn new(upper: Real, steps: Size) -> Result<Self> {
        ensure!(steps > 0, "spatial grid needs at least one step");
        ensure!(
            upper.is_finite() && upper > 0.0,
            "spatial grid upper bound must be positive, got {upper}"
        );
        let spacing = upper / steps as Real;
        let nodes = (0..=steps).map(|j| j as Real * spacing).collect();
        Ok(Self { nodes, spacing })
    }

    /// Number of nodes (= steps + 1).
    pub fn size(&self) -> Size {
        self.nodes.len()
    }

    /// Number of intervals; also the index of the last node.
    pub fn steps(&self) -> Size {
        self.nodes.len() - 1
    }

    /// Node spacing `dS`.
    pub fn spacing(&self) -> Real {
        self.spacing
    }

    /// Node `j`.
    pub fn node(&self, j: Size) -> Real {
        self.nodes[j]
    }

    /// All nodes.
    pub fn nodes(&self) -> &[Real] {
        &self.nodes
    }

    /// Last node.
    pub fn upper(&self) -> Real {
        self.nodes[self.nodes.len() - 1]
    }
}

// ─── Time grid ────────────────────────────────────────────────────────────────

/// Uniform time levels `t_i = i · dt`, `i = 0..=steps`, `dt = end / steps`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    steps: Size,
    dt: Time,
}

impl TimeGrid {
    /// Create a uniform time grid from 0 to `end` with `steps` intervals.
    ///
    /// # Errors
    /// Returns an error if `steps == 0` or `end` is not a positive finite
    /// number.
    pub fn uniform(end: Time, steps: Size) -> Result<Self> {
        ensure!(steps > 0, "time grid needs at least one step");
        ensure!(
            end.is_finite() && end > 0.0,
            "time grid end must be positive, got {end}"
        );
        Ok(Self {
            steps,
            dt: end / steps as Real,
        })
    }

    /// Number of steps.
    pub fn steps(&self) -> Size {
        self.steps
    }

    /// Step size `dt`.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Time at level `i`.
    pub fn time(&self, i: Size) -> Time {
        i as Real * self.dt
    }

    /// Levels solved during backward induction: `steps-1, ..., 0`.
    ///
    /// Level `steps` is maturity, where the terminal condition applies.
    pub fn backward_levels(&self) -> impl Iterator<Item = Size> {
        (0..self.steps).rev()
    }
}
