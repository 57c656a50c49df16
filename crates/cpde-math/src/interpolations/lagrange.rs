//! Local Lagrange interpolation on a uniform grid.
//!
//! An `n`-point stencil is centred on the query point and clamped to the
//! grid, then the classic Lagrange basis
//!
//! `p(x₀) = Σᵢ yᵢ · Πⱼ≠ᵢ (x₀ − xⱼ) / (xᵢ − xⱼ)`
//!
//! is evaluated over the stencil.  Because the stencil is clamped rather
//! than truncated, query points outside the grid are extrapolated from the
//! `n` nodes nearest the edge.

use cpde_core::{ensure, errors::Result, Real, Size};

use super::Interpolation1D;

/// Interpolate `(x, y)` at `x0` with an `n`-point Lagrange stencil.
///
/// `x` must be sorted with uniform spacing.  If fewer than `n` nodes exist
/// the order is reduced to the number of nodes available; `n == 1` returns
/// the value at the nearest node.
///
/// # Errors
/// [`Error::Configuration`](cpde_core::Error::Configuration) if `n == 0`,
/// the grid is empty, or `x` and `y` differ in length.
pub fn lagrange_interpolate(y: &[Real], x: &[Real], x0: Real, n: Size) -> Result<Real> {
    ensure!(
        x.len() == y.len(),
        "x and y must have the same length ({} vs {})",
        x.len(),
        y.len()
    );
    if x.len() < n {
        return lagrange_interpolate(y, x, x0, x.len());
    }
    ensure!(n > 0, "interpolation order must be positive (grid has {} nodes)", x.len());
    Ok(evaluate(y, x, x0, n))
}

/// Evaluate with `0 < n <= x.len() == y.len()` already established.
fn evaluate(y: &[Real], x: &[Real], x0: Real, n: Size) -> Real {
    let start = stencil_start(x, x0, n);
    if n == 1 {
        return y[start];
    }

    let xs = &x[start..start + n];
    let ys = &y[start..start + n];
    let mut value = 0.0;
    for (i, (&xi, &yi)) in xs.iter().zip(ys).enumerate() {
        let mut term = yi;
        for (j, &xj) in xs.iter().enumerate() {
            if j != i {
                term *= (x0 - xj) / (xi - xj);
            }
        }
        value += term;
    }
    value
}

/// First index of the `n`-point stencil centred on `x0`, clamped to
/// `[0, len − n]`.
///
/// Even `n` puts `n/2` nodes on each side of the cell containing `x0`; odd
/// `n` centres on the nearest node.
fn stencil_start(x: &[Real], x0: Real, n: Size) -> Size {
    let last = x.len() - n;
    if x.len() < 2 {
        return 0;
    }
    let dx = x[1] - x[0];
    let offset = (x0 - x[0]) / dx;
    let half = (n / 2) as i64;
    let candidate = if n % 2 == 0 {
        offset.floor() as i64 - (half - 1)
    } else {
        (offset + 0.5).floor() as i64 - half
    };
    candidate.clamp(0, last as i64) as Size
}

/// Lagrange interpolation of fixed order over an owned uniform grid.
///
/// The free function [`lagrange_interpolate`] is the one-shot form; this
/// type validates once and then evaluates infallibly through
/// [`Interpolation1D`].
#[derive(Debug, Clone)]
pub struct LagrangeInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    order: Size,
}

impl LagrangeInterpolation {
    /// Relative tolerance on the node spacing when checking uniformity.
    const SPACING_TOLERANCE: Real = 1e-9;

    /// Construct from sorted, uniformly spaced `xs`, matching `ys`, and the
    /// number of stencil points.
    ///
    /// An order larger than the number of nodes is reduced to the node
    /// count.
    ///
    /// # Errors
    /// Returns an error if the slices are empty or differ in length, the
    /// order is zero, or the nodes are not strictly increasing with uniform
    /// spacing.
    pub fn new(xs: &[Real], ys: &[Real], order: Size) -> Result<Self> {
        ensure!(!xs.is_empty(), "need at least 1 point for interpolation");
        ensure!(
            xs.len() == ys.len(),
            "xs and ys must have the same length ({} vs {})",
            xs.len(),
            ys.len()
        );
        ensure!(order > 0, "interpolation order must be positive");
        if xs.len() >= 2 {
            let dx = xs[1] - xs[0];
            ensure!(dx > 0.0, "nodes must be strictly increasing");
            let uniform = xs
                .windows(2)
                .all(|w| ((w[1] - w[0]) - dx).abs() <= Self::SPACING_TOLERANCE * dx.abs().max(1.0));
            ensure!(uniform, "nodes must be uniformly spaced");
        }
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            order: order.min(xs.len()),
        })
    }

    /// Effective number of stencil points.
    pub fn order(&self) -> Size {
        self.order
    }
}

impl Interpolation1D for LagrangeInterpolation {
    fn operator(&self, x: Real) -> Real {
        evaluate(&self.ys, &self.xs, x, self.order)
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}
