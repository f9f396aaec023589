//! Polyhedral primitives behind the contact computations.
//!
//! - [`compute_cone_face_matrix`]: span (V-form) of a polyhedral cone to its
//!   face matrix (H-form `F x ≤ 0`).
//! - [`compute_chebyshev_center`]: center and radius of the largest ball in
//!   `{x : B x ≤ c}`.
//! - [`PolytopeProjector`]: 2D projection of `{x : G x ≤ h, A x = b}` through
//!   an affine map, with the incremental [`Bretl`] backend.

mod chebyshev;
mod cone;
mod projection;

pub use chebyshev::compute_chebyshev_center;
pub(crate) use chebyshev::chebyshev_center_of;
pub use cone::compute_cone_face_matrix;
pub use projection::{Bretl, PolytopeProjector, Projection};
