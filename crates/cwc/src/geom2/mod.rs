//! 2D polygon geometry for support regions.
//!
//! Purpose
//! - Convert polygons between H-representation (`B x ≤ c`) and
//!   V-representation (counterclockwise vertex lists).
//! - Intersect segments with polygons and vertical prisms, and polygons with
//!   each other.
//!
//! Conventions
//! - Vertex lists are counterclockwise unless a function says otherwise.
//! - H→V goes through polar duality and needs the origin strictly inside; the
//!   shift that puts it there is an explicit argument of [`polar_polygon_hull`].

mod hull;
mod intersect;
mod types;

pub use hull::{
    compute_polygon_halfspaces, compute_polygon_hull, compute_polygon_hull_with, convex_hull,
    drop_collinear_vertices, polar_polygon_hull, signed_area,
};
pub use intersect::{intersect_line_cylinder, intersect_line_polygon, intersect_polygons};
pub use types::{dist_to_edges, Hs2};
