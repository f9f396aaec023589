//! 2D projection of polytopes.
//!
//! Given `P = {x : G x ≤ h, A x = b}` and an affine map `y = E x + f` into the
//! plane, compute the vertices of `E P + f`. The [`Bretl`] backend grows an
//! inner approximation by support-point queries (one LP each) until every
//! edge is also a supporting line of the projection.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector, Vector2};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::geom2::{convex_hull, drop_collinear_vertices};
use crate::solvers::{ClarabelSolver, QpProblem, QpSolver};

/// Projection problem `y = E x + f` over `{x : G x ≤ h, A x = b}`.
#[derive(Clone, Debug)]
pub struct Projection {
    pub e: DMatrix<f64>,
    pub f: Vector2<f64>,
    pub ineq: (DMatrix<f64>, DVector<f64>),
    pub eq: Option<(DMatrix<f64>, DVector<f64>)>,
}

impl Projection {
    /// # Panics
    /// If `e` does not have two rows or the shapes disagree.
    pub fn new(e: DMatrix<f64>, f: Vector2<f64>, g: DMatrix<f64>, h: DVector<f64>) -> Self {
        assert_eq!(e.nrows(), 2, "projection must map to the plane");
        assert_eq!(g.ncols(), e.ncols(), "G column count mismatch");
        assert_eq!(g.nrows(), h.len(), "G and h size mismatch");
        Self {
            e,
            f,
            ineq: (g, h),
            eq: None,
        }
    }

    /// # Panics
    /// If the shapes disagree.
    pub fn with_eq(mut self, a: DMatrix<f64>, b: DVector<f64>) -> Self {
        assert_eq!(a.ncols(), self.e.ncols(), "A column count mismatch");
        assert_eq!(a.nrows(), b.len(), "A and b size mismatch");
        self.eq = Some((a, b));
        self
    }
}

/// Anything that can compute the projected polygon of a [`Projection`].
pub trait PolytopeProjector {
    /// Counterclockwise vertices of the projection.
    fn project(&self, proj: &Projection) -> Result<Vec<Vector2<f64>>>;
}

/// Incremental projection (Bretl & Lall, 2008).
#[derive(Clone, Debug)]
pub struct Bretl<S = ClarabelSolver> {
    pub solver: S,
    /// Cap on support-point queries after the initial triangle.
    pub max_iter: usize,
    /// Minimal outward progress for an edge to be expanded again.
    pub tol: f64,
}

impl Default for Bretl<ClarabelSolver> {
    fn default() -> Self {
        Self::new(ClarabelSolver::default())
    }
}

impl<S: QpSolver> Bretl<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            max_iter: 1000,
            tol: 1e-6,
        }
    }

    /// Point of the projection furthest along `dir`.
    fn support(&self, proj: &Projection, dir: Vector2<f64>) -> Result<Vector2<f64>> {
        let cost = -(proj.e.tr_mul(&DVector::from_column_slice(dir.as_slice())));
        let (g, h) = &proj.ineq;
        let mut lp = QpProblem::linear(cost).with_ineq(g.clone(), h.clone());
        if let Some((a, b)) = &proj.eq {
            lp = lp.with_eq(a.clone(), b.clone());
        }
        let x = self.solver.solve(&lp)?;
        let y = &proj.e * x;
        Ok(Vector2::new(y[0], y[1]) + proj.f)
    }
}

/// Counterclockwise hull of `points` without vertices inside edges.
fn hull_of(points: &[Vector2<f64>]) -> Vec<Vector2<f64>> {
    let mut hull: Vec<Vector2<f64>> = convex_hull(points).into_iter().map(|i| points[i]).collect();
    drop_collinear_vertices(&mut hull);
    hull
}

fn edges(hull: &[Vector2<f64>]) -> impl Iterator<Item = (Vector2<f64>, Vector2<f64>)> + '_ {
    (0..hull.len()).map(move |k| (hull[k], hull[(k + 1) % hull.len()]))
}

impl<S: QpSolver> PolytopeProjector for Bretl<S> {
    fn project(&self, proj: &Projection) -> Result<Vec<Vector2<f64>>> {
        let mut init: Vec<Vector2<f64>> = Vec::with_capacity(3);
        for k in 0..3 {
            let theta = 2.0 * PI * k as f64 / 3.0;
            let z = self.support(proj, Vector2::new(theta.cos(), theta.sin()))?;
            if init.iter().all(|q| (q - z).norm() > self.tol) {
                init.push(z);
            }
        }
        if init.len() < 3 {
            return Err(Error::Infeasible(format!(
                "projection has empty interior ({} distinct support points)",
                init.len()
            )));
        }
        let mut hull = hull_of(&init);
        if hull.len() < 3 {
            return Err(Error::Infeasible("projection is flat".into()));
        }

        // Edges whose outward support query made no progress. Support points
        // may lie inside faces of the projection, so the hull is rebuilt after
        // every insertion and only edges of the current hull count.
        let mut certified: Vec<(Vector2<f64>, Vector2<f64>)> = Vec::new();
        let mut iters = 0;
        loop {
            let open = edges(&hull).find(|e| !certified.contains(e));
            let Some((a, b)) = open else {
                break;
            };
            if iters >= self.max_iter {
                warn!(
                    max_iter = self.max_iter,
                    vertices = hull.len(),
                    "polytope projection stopped before convergence"
                );
                break;
            }
            iters += 1;
            let edge = b - a;
            let normal = Vector2::new(edge.y, -edge.x).normalize();
            let z = self.support(proj, normal)?;
            if normal.dot(&(z - a)) > self.tol {
                let mut points = hull.clone();
                points.push(z);
                let grown = hull_of(&points);
                if !edges(&grown).any(|e| e == (a, b)) {
                    trace!(x = z.x, y = z.y, "projection vertex");
                    hull = grown;
                    continue;
                }
            }
            certified.push((a, b));
        }
        debug!(iterations = iters, vertices = hull.len(), "polytope projection");
        Ok(hull)
    }
}
