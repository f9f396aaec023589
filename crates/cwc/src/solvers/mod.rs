//! Quadratic-program capability.
//!
//! Callers describe a problem as
//!
//! ```text
//! minimize    ½ xᵀ P x + qᵀ x
//! subject to  G x ≤ h
//!             A x = b
//! ```
//!
//! and hand it to any [`QpSolver`]. Linear programs are QPs with `P = 0`.
//! Infeasible problems come back as [`Error::Infeasible`](crate::Error).

mod clarabel_qp;

pub use self::clarabel_qp::ClarabelSolver;

use nalgebra::{DMatrix, DVector};

use crate::error::Result;

/// Dense QP in the standard `(P, q, G, h, A, b)` form.
#[derive(Clone, Debug)]
pub struct QpProblem {
    pub p: DMatrix<f64>,
    pub q: DVector<f64>,
    pub ineq: Option<(DMatrix<f64>, DVector<f64>)>,
    pub eq: Option<(DMatrix<f64>, DVector<f64>)>,
}

impl QpProblem {
    /// Unconstrained problem; add constraints with the builder methods.
    ///
    /// # Panics
    /// If `p` is not square or `q` does not match its size.
    pub fn new(p: DMatrix<f64>, q: DVector<f64>) -> Self {
        assert!(p.is_square(), "P must be square, got {:?}", p.shape());
        assert_eq!(p.nrows(), q.len(), "P and q size mismatch");
        Self {
            p,
            q,
            ineq: None,
            eq: None,
        }
    }

    /// Linear program `min cᵀ x`.
    pub fn linear(c: DVector<f64>) -> Self {
        let n = c.len();
        Self::new(DMatrix::zeros(n, n), c)
    }

    /// # Panics
    /// If the shapes do not match the number of variables.
    pub fn with_ineq(mut self, g: DMatrix<f64>, h: DVector<f64>) -> Self {
        assert_eq!(g.ncols(), self.nb_vars(), "G column count mismatch");
        assert_eq!(g.nrows(), h.len(), "G and h size mismatch");
        self.ineq = Some((g, h));
        self
    }

    /// # Panics
    /// If the shapes do not match the number of variables.
    pub fn with_eq(mut self, a: DMatrix<f64>, b: DVector<f64>) -> Self {
        assert_eq!(a.ncols(), self.nb_vars(), "A column count mismatch");
        assert_eq!(a.nrows(), b.len(), "A and b size mismatch");
        self.eq = Some((a, b));
        self
    }

    #[inline]
    pub fn nb_vars(&self) -> usize {
        self.q.len()
    }
}

/// Anything that can solve a [`QpProblem`].
pub trait QpSolver {
    /// Optimal `x`, or `Error::Infeasible` when the constraints admit no point.
    fn solve(&self, problem: &QpProblem) -> Result<DVector<f64>>;
}

impl<S: QpSolver + ?Sized> QpSolver for &S {
    fn solve(&self, problem: &QpProblem) -> Result<DVector<f64>> {
        (**self).solve(problem)
    }
}
