//! Tridiagonal linear systems and the Thomas algorithm.
//!
//! The solver never touches its inputs: elimination runs on copies of the
//! diagonal and right-hand side held in a [`ThomasWorkspace`], so a base
//! system can be re-solved repeatedly with different penalised rows.

use cpde_core::{ensure, Error, Real, Result, Size};

/// Scratch buffers for the forward sweep of the Thomas algorithm.
///
/// Allocate once per system size and reuse across solves.
#[derive(Debug, Clone, Default)]
pub struct ThomasWorkspace {
    pivots: Vec<Real>,
    rhs: Vec<Real>,
}

impl ThomasWorkspace {
    /// Create a workspace for systems of size `n`.
    pub fn new(n: Size) -> Self {
        Self {
            pivots: vec![0.0; n],
            rhs: vec![0.0; n],
        }
    }

    fn resize(&mut self, n: Size) {
        self.pivots.resize(n, 0.0);
        self.rhs.resize(n, 0.0);
    }
}

/// Solve the tridiagonal system `(a, b, c) · x = d`.
///
/// * `a`: sub-diagonal, `a[0]` unused
/// * `b`: diagonal
/// * `c`: super-diagonal, `c[n-1]` unused
/// * `d`: right-hand side
///
/// The matrix need not be symmetric or diagonally dominant, but every pivot
/// met during elimination must be non-zero.
///
/// # Errors
/// [`Error::Configuration`] if the four slices differ in length,
/// [`Error::SingularSystem`] on a zero pivot.
pub fn thomas_solve(a: &[Real], b: &[Real], c: &[Real], d: &[Real]) -> Result<Vec<Real>> {
    let mut workspace = ThomasWorkspace::new(b.len());
    let mut x = vec![0.0; b.len()];
    thomas_solve_into(a, b, c, d, &mut workspace, &mut x)?;
    Ok(x)
}

/// Allocation-free form of [`thomas_solve`]: the solution is written to `x`
/// and elimination happens inside `workspace`.
pub fn thomas_solve_into(
    a: &[Real],
    b: &[Real],
    c: &[Real],
    d: &[Real],
    workspace: &mut ThomasWorkspace,
    x: &mut [Real],
) -> Result<()> {
    let n = b.len();
    ensure!(
        a.len() == n && c.len() == n && d.len() == n && x.len() == n,
        "tridiagonal bands must share one length (a={}, b={}, c={}, d={}, x={})",
        a.len(),
        n,
        c.len(),
        d.len(),
        x.len()
    );
    if n == 0 {
        return Ok(());
    }

    workspace.resize(n);
    let pivots = &mut workspace.pivots;
    let rhs = &mut workspace.rhs;
    pivots.copy_from_slice(b);
    rhs.copy_from_slice(d);

    // Forward sweep
    for j in 1..n {
        if pivots[j - 1] == 0.0 {
            return Err(Error::SingularSystem {
                row: j - 1,
                time_level: None,
            });
        }
        let m = a[j] / pivots[j - 1];
        pivots[j] -= c[j - 1] * m;
        rhs[j] -= rhs[j - 1] * m;
    }
    if pivots[n - 1] == 0.0 {
        return Err(Error::SingularSystem {
            row: n - 1,
            time_level: None,
        });
    }

    // Back substitution
    x[n - 1] = rhs[n - 1] / pivots[n - 1];
    for j in (0..n - 1).rev() {
        x[j] = (rhs[j] - c[j] * x[j + 1]) / pivots[j];
    }
    Ok(())
}

/// A tridiagonal matrix together with its right-hand side.
///
/// Rows are indexed by grid node.  `lower[0]` and `upper[n-1]` lie outside
/// the matrix and are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalSystem {
    /// Sub-diagonal (index 0 unused).
    pub lower: Vec<Real>,
    /// Main diagonal.
    pub diag: Vec<Real>,
    /// Super-diagonal (last index unused).
    pub upper: Vec<Real>,
    /// Right-hand side.
    pub rhs: Vec<Real>,
}

impl TridiagonalSystem {
    /// Create a zero system of size `n`.
    pub fn new(n: Size) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
            rhs: vec![0.0; n],
        }
    }

    /// Size (number of rows/columns).
    pub fn size(&self) -> Size {
        self.diag.len()
    }

    /// Apply the matrix: `y = A · x`.
    ///
    /// # Panics
    /// If `x.len()` differs from the system size.
    pub fn apply(&self, x: &[Real]) -> Vec<Real> {
        let n = self.size();
        assert_eq!(x.len(), n, "vector length must match system size");
        (0..n)
            .map(|j| {
                let mut y = self.diag[j] * x[j];
                if j > 0 {
                    y += self.lower[j] * x[j - 1];
                }
                if j + 1 < n {
                    y += self.upper[j] * x[j + 1];
                }
                y
            })
            .collect()
    }

    /// Solve `A · x = rhs`.
    pub fn solve(&self) -> Result<Vec<Real>> {
        thomas_solve(&self.lower, &self.diag, &self.upper, &self.rhs)
    }

    /// Solve `A · x = rhs` into `x`, reusing `workspace`.
    pub fn solve_into(&self, workspace: &mut ThomasWorkspace, x: &mut [Real]) -> Result<()> {
        thomas_solve_into(
            &self.lower,
            &self.diag,
            &self.upper,
            &self.rhs,
            workspace,
            x,
        )
    }
}
