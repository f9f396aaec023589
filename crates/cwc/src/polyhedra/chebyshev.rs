//! Chebyshev center of a polyhedron.

use nalgebra::{DMatrix, DVector, Vector2};
use tracing::trace;

use crate::cfg::FEAS_EPS;
use crate::error::{Error, Result};
use crate::geom2::Hs2;
use crate::solvers::{QpProblem, QpSolver};

/// Center and radius of the largest Euclidean ball inside `{x : B x ≤ c}`.
///
/// Solved as the LP `max r` s.t. `b_i·x + ‖b_i‖ r ≤ c_i`, `r ≥ 0`.
///
/// Errors: `Infeasible` when the polyhedron is empty or has no interior,
/// `Unbounded` when arbitrarily large balls fit.
///
/// # Panics
/// If `c` does not match the rows of `b`.
pub fn compute_chebyshev_center<S: QpSolver>(
    b: &DMatrix<f64>,
    c: &DVector<f64>,
    solver: &S,
) -> Result<(DVector<f64>, f64)> {
    assert_eq!(b.nrows(), c.len(), "B and c size mismatch");
    let (m, n) = b.shape();
    let mut g = DMatrix::zeros(m + 1, n + 1);
    let mut h = DVector::zeros(m + 1);
    for i in 0..m {
        let row = b.row(i);
        g.view_mut((i, 0), (1, n)).copy_from(&row);
        g[(i, n)] = row.norm();
        h[i] = c[i];
    }
    g[(m, n)] = -1.0;
    let mut cost = DVector::zeros(n + 1);
    cost[n] = -1.0;
    let z = solver.solve(&QpProblem::linear(cost).with_ineq(g, h))?;
    let radius = z[n];
    trace!(dim = n, radius, "chebyshev center");
    if radius <= FEAS_EPS {
        return Err(Error::Infeasible(format!(
            "polyhedron has no interior (Chebyshev radius {radius:.3e})"
        )));
    }
    Ok((z.rows(0, n).into_owned(), radius))
}

/// Planar form used by the polygon hull.
pub(crate) fn chebyshev_center_of<S: QpSolver>(
    hs: &[Hs2],
    solver: &S,
) -> Result<(Vector2<f64>, f64)> {
    let b = DMatrix::from_fn(hs.len(), 2, |i, j| hs[i].n[j]);
    let c = DVector::from_fn(hs.len(), |i, _| hs[i].c);
    let (x, r) = compute_chebyshev_center(&b, &c, solver)?;
    Ok((Vector2::new(x[0], x[1]), r))
}
