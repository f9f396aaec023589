//! Clarabel backend (pure Rust interior-point solver).
//!
//! Clarabel solves `min ½xᵀPx + qᵀx  s.t.  Ax + s = b, s ∈ K`. Equalities go
//! in a zero cone and inequalities in a nonnegative cone, so that stacking
//! `[A_eq; G]` with `[b_eq; h]` reproduces `A_eq x = b_eq, G x ≤ h`.

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT::{self, NonnegativeConeT, ZeroConeT},
};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

use super::{QpProblem, QpSolver};
use crate::error::{Error, Result};

/// Entries below this magnitude are dropped when building sparse matrices.
const SPARSE_EPS: f64 = 1e-15;

/// Interior-point settings forwarded to Clarabel.
#[derive(Clone, Copy, Debug)]
pub struct ClarabelSolver {
    pub max_iter: u32,
    pub tol_feas: f64,
    pub tol_gap_abs: f64,
    pub tol_gap_rel: f64,
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tol_feas: 1e-8,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
        }
    }
}

impl QpSolver for ClarabelSolver {
    fn solve(&self, problem: &QpProblem) -> Result<DVector<f64>> {
        let n = problem.nb_vars();
        let n_eq = problem.eq.as_ref().map_or(0, |(a, _)| a.nrows());
        let n_ineq = problem.ineq.as_ref().map_or(0, |(g, _)| g.nrows());

        let mut a_all = DMatrix::zeros(n_eq + n_ineq, n);
        let mut b_all = DVector::zeros(n_eq + n_ineq);
        if let Some((a, b)) = &problem.eq {
            a_all.rows_mut(0, n_eq).copy_from(a);
            b_all.rows_mut(0, n_eq).copy_from(b);
        }
        if let Some((g, h)) = &problem.ineq {
            a_all.rows_mut(n_eq, n_ineq).copy_from(g);
            b_all.rows_mut(n_eq, n_ineq).copy_from(h);
        }

        let mut cones: Vec<SupportedConeT<f64>> = Vec::with_capacity(2);
        if n_eq > 0 {
            cones.push(ZeroConeT(n_eq));
        }
        if n_ineq > 0 {
            cones.push(NonnegativeConeT(n_ineq));
        }

        let settings = DefaultSettingsBuilder::default()
            .max_iter(self.max_iter)
            .verbose(false)
            .tol_feas(self.tol_feas)
            .tol_gap_abs(self.tol_gap_abs)
            .tol_gap_rel(self.tol_gap_rel)
            .build()
            .map_err(|e| Error::Solver(format!("invalid settings: {e:?}")))?;

        let p_csc = dmatrix_to_csc_upper_tri(&problem.p);
        let a_csc = dmatrix_to_csc(&a_all);
        let q: Vec<f64> = problem.q.iter().copied().collect();
        let b: Vec<f64> = b_all.iter().copied().collect();

        trace!(n, n_eq, n_ineq, "clarabel setup");
        let mut solver = DefaultSolver::new(&p_csc, &q, &a_csc, &b, &cones, settings)
            .map_err(|e| Error::Solver(format!("setup failed: {e:?}")))?;
        solver.solve();

        let status = solver.solution.status;
        debug!(?status, n, n_eq, n_ineq, "clarabel finished");
        match status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {
                Ok(DVector::from_column_slice(&solver.solution.x))
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => Err(
                Error::Infeasible(format!("QP with {n} variables has no feasible point")),
            ),
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => Err(
                Error::Unbounded(format!("QP with {n} variables is unbounded below")),
            ),
            other => Err(Error::Solver(format!("{other:?}"))),
        }
    }
}

/// Convert a nalgebra `DMatrix<f64>` to a Clarabel `CscMatrix<f64>` (full matrix).
fn dmatrix_to_csc(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    for j in 0..ncols {
        for i in 0..nrows {
            let v = m[(i, j)];
            if v.abs() > SPARSE_EPS {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }
    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

/// Upper triangle of a symmetric matrix, as Clarabel expects for `P`.
fn dmatrix_to_csc_upper_tri(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    for j in 0..ncols {
        for i in 0..=j.min(nrows.saturating_sub(1)) {
            let v = m[(i, j)];
            if v.abs() > SPARSE_EPS {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }
    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}
