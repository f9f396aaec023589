//! Segment/polygon, segment/prism and polygon/polygon intersections.

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::{Vector2, Vector3};

use super::hull::{convex_hull, signed_area};
use crate::cfg::{FEAS_EPS, PARALLEL_EPS, PREC_TOL};

/// Line `a x + b y = c` through two points.
#[derive(Clone, Copy, Debug)]
struct Line2 {
    a: f64,
    b: f64,
    c: f64,
}

impl Line2 {
    fn through(p1: Vector2<f64>, p2: Vector2<f64>) -> Self {
        Self {
            a: p1.y - p2.y,
            b: p2.x - p1.x,
            c: p2.x * p1.y - p1.x * p2.y,
        }
    }

    /// Cramer's rule; `None` for near-parallel lines.
    fn intersection(&self, other: &Line2) -> Option<Vector2<f64>> {
        let d = self.a * other.b - self.b * other.a;
        if d.abs() < PARALLEL_EPS {
            return None;
        }
        let dx = self.c * other.b - self.b * other.c;
        let dy = self.a * other.c - self.c * other.a;
        Some(Vector2::new(dx / d, dy / d))
    }
}

#[inline]
fn in_box(p: Vector2<f64>, u: Vector2<f64>, v: Vector2<f64>, margin: f64) -> bool {
    u.x.min(v.x) - margin <= p.x
        && p.x <= u.x.max(v.x) + margin
        && u.y.min(v.y) - margin <= p.y
        && p.y <= u.y.max(v.y) + margin
}

/// Intersect the segment `line = (p1, p2)` with the boundary of a polygon.
///
/// With `apply_hull = false` the vertices must already be ordered (either
/// orientation); otherwise their convex hull is used. Near-parallel edges are
/// skipped. A convex boundary yields at most two points; a crossing through a
/// vertex is reported once.
pub fn intersect_line_polygon(
    line: (Vector2<f64>, Vector2<f64>),
    vertices: &[Vector2<f64>],
    apply_hull: bool,
) -> Vec<Vector2<f64>> {
    let ordered: Vec<Vector2<f64>> = if apply_hull {
        convex_hull(vertices).into_iter().map(|i| vertices[i]).collect()
    } else {
        vertices.to_vec()
    };
    let n = ordered.len();
    if n < 2 {
        return Vec::new();
    }
    let (p1, p2) = line;
    let l1 = Line2::through(p1, p2);
    let mut points: Vec<Vector2<f64>> = Vec::with_capacity(2);
    for (i, &v1) in ordered.iter().enumerate() {
        let v2 = ordered[(i + 1) % n];
        let Some(p) = l1.intersection(&Line2::through(v1, v2)) else {
            continue;
        };
        if !in_box(p, p1, p2, PREC_TOL) || !in_box(p, v1, v2, PREC_TOL) {
            continue;
        }
        if points.iter().all(|q| (q - p).norm() > FEAS_EPS) {
            points.push(p);
        }
    }
    points
}

/// Intersect a 3D segment with the vertical prism over a polygonal cross
/// section (given in the xy-plane).
///
/// Intersections are computed in the plane; `z` is interpolated along the
/// segment by the planar length fraction. A vertical segment has no planar
/// extent and yields no point.
pub fn intersect_line_cylinder(
    line: (Vector3<f64>, Vector3<f64>),
    vertices: &[Vector2<f64>],
) -> Vec<Vector3<f64>> {
    let (p1, p2) = line;
    let planar_length = (p2.xy() - p1.xy()).norm();
    if planar_length <= FEAS_EPS {
        return Vec::new();
    }
    intersect_line_polygon((p1.xy(), p2.xy()), vertices, true)
        .into_iter()
        .map(|p| {
            let alpha = (p - p1.xy()).norm() / planar_length;
            Vector3::new(p.x, p.y, p1.z + alpha * (p2.z - p1.z))
        })
        .collect()
}

/// Intersection of two polygons, as its first contour (counterclockwise), or
/// an empty list when they are disjoint.
///
/// Clipping snaps coordinates to an integer grid internally, so touching or
/// overlapping edges do not suffer from floating-point ties.
pub fn intersect_polygons(
    polygon1: &[Vector2<f64>],
    polygon2: &[Vector2<f64>],
) -> Vec<Vector2<f64>> {
    if polygon1.len() < 3 || polygon2.len() < 3 {
        return Vec::new();
    }
    let subject: Vec<Vec<[f64; 2]>> = vec![polygon1.iter().map(|p| [p.x, p.y]).collect()];
    let clip: Vec<[f64; 2]> = polygon2.iter().map(|p| [p.x, p.y]).collect();
    let shapes = subject.overlay(&[clip], OverlayRule::Intersect, FillRule::NonZero);
    let Some(contour) = shapes.into_iter().flatten().find(|c| c.len() >= 3) else {
        return Vec::new();
    };
    let mut out: Vec<Vector2<f64>> = contour
        .into_iter()
        .map(|[x, y]| Vector2::new(x, y))
        .collect();
    if signed_area(&out) < 0.0 {
        out.reverse();
    }
    out
}
