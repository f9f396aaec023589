//! Tolerance defaults (internal).
//!
//! Policy
//! - Fixed constants, no tolerance juggling at call sites. If a caller ever
//!   needs to tune one, promote it to a field of the relevant config struct.

/// Feasibility/membership epsilon for half-space tests and point dedup.
pub(crate) const FEAS_EPS: f64 = 1e-9;
/// Below this determinant two 2D lines are treated as parallel.
pub(crate) const DET_EPS: f64 = 1e-12;
/// Sine of the turn angle below which a polygon vertex lies inside an edge.
pub(crate) const COLLINEAR_EPS: f64 = 1e-6;
/// Line/edge pairs with `|D|` below this are skipped as near-parallel.
pub(crate) const PARALLEL_EPS: f64 = 1e-5;
/// Margin on polygon-edge bounding boxes in line/polygon intersection.
pub(crate) const PREC_TOL: f64 = 1e-10;
/// Minimal normalized distance from the origin to every edge before the polar
/// hull may run without a shift.
pub(crate) const INTERIOR_EPS: f64 = 1e-9;
/// Relative eigenvalue threshold when computing the rank of a span matrix.
pub(crate) const RANK_EPS: f64 = 1e-10;
/// Tightness tolerance for generators on a candidate cone facet (unit scale).
pub(crate) const FACE_EPS: f64 = 1e-9;
/// Rounding step used to dedup facet normals.
pub(crate) const FACE_QUANTUM: f64 = 1e-7;
/// Reference mass for equilibrium computations [kg]; it cancels out.
pub(crate) const REFERENCE_MASS: f64 = 42.0;
