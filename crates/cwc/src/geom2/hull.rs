//! Convex hulls and H↔V conversion for polygons.
//!
//! H→V uses polar duality: with the origin strictly inside `{x : B x ≤ c}`,
//! each row maps to the dual point `b_i / c_i`. Edges of the dual convex hull
//! map back to primal vertices, and the counterclockwise hull order carries
//! over to the primal polygon.

use nalgebra::{DMatrix, DVector, Vector2};
use tracing::{debug, trace};

use super::types::{line_intersection, Hs2};
use crate::cfg::{COLLINEAR_EPS, DET_EPS, FEAS_EPS, INTERIOR_EPS};
use crate::error::{Error, Result};
use crate::polyhedra::chebyshev_center_of;
use crate::solvers::{ClarabelSolver, QpSolver};

/// Andrew's monotone chain convex hull.
///
/// Returns indices into `points`, counterclockwise, without collinear points.
/// Fewer than three indices come back for degenerate inputs (all points equal
/// or collinear).
pub fn convex_hull(points: &[Vector2<f64>]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..points.len()).collect();
    idx.sort_by(|&a, &b| {
        let (pa, pb) = (points[a], points[b]);
        pa.x.partial_cmp(&pb.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| pa.y.partial_cmp(&pb.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    idx.dedup_by(|a, b| (points[*a] - points[*b]).norm() < DET_EPS);
    if idx.len() < 3 {
        return idx;
    }
    let mut lower: Vec<usize> = Vec::with_capacity(idx.len());
    for &i in &idx {
        while lower.len() >= 2
            && cross(
                points[lower[lower.len() - 2]],
                points[lower[lower.len() - 1]],
                points[i],
            ) <= 0.0
        {
            lower.pop();
        }
        lower.push(i);
    }
    let mut upper: Vec<usize> = Vec::with_capacity(idx.len());
    for &i in idx.iter().rev() {
        while upper.len() >= 2
            && cross(
                points[upper[upper.len() - 2]],
                points[upper[upper.len() - 1]],
                points[i],
            ) <= 0.0
        {
            upper.pop();
        }
        upper.push(i);
    }
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    hull
}

#[inline]
fn cross(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Remove vertices of a counterclockwise polygon that lie inside an edge up to
/// round-off, i.e. whose turn angle has a sine below `COLLINEAR_EPS`.
///
/// [`convex_hull`] only drops exactly collinear points; vertices coming out of
/// an interior-point solver sit slightly off the edges they belong to.
pub fn drop_collinear_vertices(vertices: &mut Vec<Vector2<f64>>) {
    let mut k = 0;
    while vertices.len() > 3 && k < vertices.len() {
        let n = vertices.len();
        let incoming = vertices[k] - vertices[(k + n - 1) % n];
        let outgoing = vertices[(k + 1) % n] - vertices[k];
        if incoming.perp(&outgoing) <= COLLINEAR_EPS * incoming.norm() * outgoing.norm() {
            vertices.remove(k);
            k = k.saturating_sub(1);
        } else {
            k += 1;
        }
    }
}

/// Shoelace area; positive for counterclockwise vertex lists.
pub fn signed_area(vertices: &[Vector2<f64>]) -> f64 {
    let n = vertices.len();
    (0..n)
        .map(|k| {
            let p = vertices[k];
            let q = vertices[(k + 1) % n];
            p.x * q.y - p.y * q.x
        })
        .sum::<f64>()
        / 2.0
}

/// V→H: outward half-planes with unit normals, one per hull edge.
pub fn compute_polygon_halfspaces(vertices: &[Vector2<f64>]) -> Vec<Hs2> {
    let hull: Vec<Vector2<f64>> = convex_hull(vertices)
        .into_iter()
        .map(|i| vertices[i])
        .collect();
    if hull.len() < 3 {
        return Vec::new();
    }
    let mut hs = Vec::with_capacity(hull.len());
    for k in 0..hull.len() {
        let p = hull[k];
        let edge = hull[(k + 1) % hull.len()] - p;
        // For CCW hull order, outward normal is 90° CW: (edge.y, -edge.x)
        let n = Vector2::new(edge.y, -edge.x);
        let norm = n.norm();
        if norm > DET_EPS {
            let n = n / norm;
            hs.push(Hs2::new(n, n.dot(&p)));
        }
    }
    hs
}

/// H→V for `{x : B x ≤ c}` with the default QP backend for the Chebyshev
/// center.
///
/// See [`compute_polygon_hull_with`].
pub fn compute_polygon_hull(b: &DMatrix<f64>, c: &DVector<f64>) -> Result<Vec<Vector2<f64>>> {
    compute_polygon_hull_with(b, c, &ClarabelSolver::default())
}

/// H→V for `{x : B x ≤ c}`, vertices counterclockwise.
///
/// Rows whose normal vanishes are dropped when `c_i ≥ 0` and make the polygon
/// empty otherwise. When the origin is not strictly inside, the Chebyshev
/// center becomes the polar reference point.
///
/// Errors: `Infeasible` when no interior point exists, `Unbounded` when the
/// rows do not enclose a bounded region.
///
/// # Panics
/// If `b` does not have two columns or `c` does not match its rows.
pub fn compute_polygon_hull_with<S: QpSolver>(
    b: &DMatrix<f64>,
    c: &DVector<f64>,
    solver: &S,
) -> Result<Vec<Vector2<f64>>> {
    let hs = halfplanes_from_rows(b, c)?;
    let shift = if has_interior_origin(&hs) {
        Vector2::zeros()
    } else {
        let (center, radius) = chebyshev_center_of(&hs, solver)?;
        debug!(x = center.x, y = center.y, radius, "polygon hull shifted to Chebyshev center");
        center
    };
    polar_hull(&hs, shift)
}

/// Polar hull around an explicit reference point `shift`, which must lie
/// strictly inside `{x : B x ≤ c}`.
///
/// # Panics
/// If `b` does not have two columns or `c` does not match its rows.
pub fn polar_polygon_hull(
    b: &DMatrix<f64>,
    c: &DVector<f64>,
    shift: Vector2<f64>,
) -> Result<Vec<Vector2<f64>>> {
    let hs = halfplanes_from_rows(b, c)?;
    polar_hull(&hs, shift)
}

fn halfplanes_from_rows(b: &DMatrix<f64>, c: &DVector<f64>) -> Result<Vec<Hs2>> {
    assert_eq!(
        b.ncols(),
        2,
        "input (B, c) is not a polygon: B.shape = {:?}",
        b.shape()
    );
    assert_eq!(b.nrows(), c.len(), "B and c size mismatch");
    let mut hs = Vec::with_capacity(b.nrows());
    for i in 0..b.nrows() {
        let n = Vector2::new(b[(i, 0)], b[(i, 1)]);
        if n.norm() > FEAS_EPS {
            hs.push(Hs2::new(n, c[i]));
        } else if c[i] < -FEAS_EPS {
            return Err(Error::Infeasible(format!(
                "row {i} reads 0 <= {:.3e}",
                c[i]
            )));
        }
    }
    trace!(rows = b.nrows(), kept = hs.len(), "polygon half-planes");
    Ok(hs)
}

fn has_interior_origin(hs: &[Hs2]) -> bool {
    hs.iter().all(|h| h.c / h.n.norm() > INTERIOR_EPS)
}

fn polar_hull(hs: &[Hs2], shift: Vector2<f64>) -> Result<Vec<Vector2<f64>>> {
    // n·(y + shift) <= c  <=>  n·y <= c - n·shift
    let shifted: Vec<Hs2> = hs
        .iter()
        .map(|h| Hs2::new(h.n, h.c - h.n.dot(&shift)))
        .collect();
    if let Some(h) = shifted.iter().find(|h| h.c / h.n.norm() <= INTERIOR_EPS) {
        return Err(Error::Infeasible(format!(
            "polygon is empty (min. dist. to edge {:.3e})",
            h.c / h.n.norm()
        )));
    }
    let dual: Vec<Vector2<f64>> = shifted.iter().map(|h| h.n / h.c).collect();
    let order = convex_hull(&dual);
    if order.len() < 3 {
        return Err(Error::Unbounded(format!(
            "{} half-planes do not enclose a polygon",
            hs.len()
        )));
    }
    let mut vertices = Vec::with_capacity(order.len());
    for k in 0..order.len() {
        let a = dual[order[k]];
        let b = dual[order[(k + 1) % order.len()]];
        if a.x * b.y - a.y * b.x <= DET_EPS {
            return Err(Error::Unbounded(
                "reference point lies on the dual hull boundary".into(),
            ));
        }
        let v = line_intersection(Hs2::new(a, 1.0), Hs2::new(b, 1.0))
            .ok_or_else(|| Error::Unbounded("parallel consecutive edges".into()))?;
        vertices.push(v + shift);
    }
    dedup_cyclic(&mut vertices);
    Ok(vertices)
}

/// Merge consecutive vertices closer than `FEAS_EPS` (collinear dual points
/// produce repeated primal vertices).
fn dedup_cyclic(vertices: &mut Vec<Vector2<f64>>) {
    vertices.dedup_by(|a, b| (*a - *b).norm() < FEAS_EPS);
    while vertices.len() > 1 && (vertices[0] - vertices[vertices.len() - 1]).norm() < FEAS_EPS {
        vertices.pop();
    }
}
