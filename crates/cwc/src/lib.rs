//! Contact wrench cones, static-equilibrium polygons and wrench distribution.
//!
//! Layout
//! - `contact`: one rectangular contact surface (friction cones, grasp matrix,
//!   wrench cone in H- and V-form, managed/supporting mode).
//! - `contact_set`: stacked matrices over several contacts, the
//!   static-equilibrium polygon of the center of mass, supporting wrenches.
//! - `geom2`: 2D polygons (polar hull, convex hull, line/cylinder/polygon
//!   intersections).
//! - `polyhedra`: cone-face enumeration, Chebyshev center, 2D projection.
//! - `solvers`: QP capability trait and its Clarabel backend.
//! - `feed`: ordered contact sequences and their JSON persistence.
//! - `rand`: seeded random stances.
//!
//! Conventions
//! - Wrenches are 6-vectors `(f, τ)`; `τ` is taken at a reference point that
//!   every function names explicitly.
//! - `R` is the contact-to-world rotation; its third column is the contact normal.

pub mod contact;
pub mod contact_set;
pub mod error;
pub mod feed;
pub mod geom2;
pub mod polyhedra;
pub mod pose;
pub mod rand;
pub mod solvers;
pub mod wrench;

mod cfg;

pub use contact::{Contact, ContactMode};
pub use contact_set::{
    ContactSet, EquilibriumMethod, StaticEquilibriumPolygon, SupportWeights, SupportingWrench,
    GRAVITY,
};
pub use error::{Error, Result};
pub use feed::{ContactFeed, ContactRecord};
pub use pose::Pose;
pub use wrench::Wrench;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::contact::{Contact, ContactMode};
    pub use crate::contact_set::{
        ContactSet, EquilibriumMethod, StaticEquilibriumPolygon, SupportWeights,
    };
    pub use crate::geom2::{
        compute_polygon_hull, convex_hull, intersect_line_cylinder, intersect_line_polygon,
        intersect_polygons, Hs2,
    };
    pub use crate::polyhedra::{compute_cone_face_matrix, Bretl, PolytopeProjector};
    pub use crate::pose::Pose;
    pub use crate::solvers::{ClarabelSolver, QpProblem, QpSolver};
    pub use crate::wrench::Wrench;
    pub use nalgebra::{Vector2 as Vec2, Vector3 as Vec3};
}
