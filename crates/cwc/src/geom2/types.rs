//! Closed half-plane `n·x ≤ c` and helpers on lists of them.

use nalgebra::Vector2;

use crate::cfg::{DET_EPS, FEAS_EPS};

/// Closed half-plane `n · x <= c` (no normalization required here).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hs2 {
    pub n: Vector2<f64>,
    pub c: f64,
}

impl Hs2 {
    #[inline]
    pub fn new(n: Vector2<f64>, c: f64) -> Self {
        Self { n, c }
    }

    #[inline]
    pub fn satisfies(&self, p: Vector2<f64>) -> bool {
        self.satisfies_eps(p, FEAS_EPS)
    }

    #[inline]
    pub fn satisfies_eps(&self, p: Vector2<f64>, eps: f64) -> bool {
        self.n.dot(&p) <= self.c + eps
    }

    /// Euclidean distance from `p` to the boundary line, positive inside.
    ///
    /// Requires `n != 0`.
    #[inline]
    pub fn signed_distance(&self, p: Vector2<f64>) -> f64 {
        (self.c - self.n.dot(&p)) / self.n.norm()
    }
}

/// Intersection point of the two boundary lines, `None` if (near) parallel.
pub(crate) fn line_intersection(h1: Hs2, h2: Hs2) -> Option<Vector2<f64>> {
    let det = h1.n.perp(&h2.n);
    if det.abs() < DET_EPS {
        return None;
    }
    // Cramer's rule on [n1; n2] x = (c1, c2)
    Some(Vector2::new(
        h1.c * h2.n.y - h2.c * h1.n.y,
        h2.c * h1.n.x - h1.c * h2.n.x,
    ) / det)
}

/// Algebraic distance of `p` to the closest edge of the polygon `hs`.
/// Inner points get a positive value, outer points a negative one.
pub fn dist_to_edges(hs: &[Hs2], p: Vector2<f64>) -> f64 {
    hs.iter()
        .map(|h| h.signed_distance(p))
        .fold(f64::INFINITY, f64::min)
}
