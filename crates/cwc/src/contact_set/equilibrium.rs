//! Static-equilibrium polygon (SEP) of the center of mass.
//!
//! With only gravity acting, the contact wrench at the world origin must be
//! `(0, 0, mg, mg·y, −mg·x, 0)` for a CoM at `(x, y, ·)`. The SEP is the set of
//! horizontal CoM positions for which that wrench lies in the CWC; it does
//! not depend on the CoM height nor on the mass.

use nalgebra::{DMatrix, DVector, Vector2, Vector3};
use tracing::debug;

use super::{ContactSet, GRAVITY};
use crate::cfg::{FEAS_EPS, REFERENCE_MASS};
use crate::error::{Error, Result};
use crate::geom2::{compute_polygon_halfspaces, compute_polygon_hull, dist_to_edges, signed_area, Hs2};
use crate::polyhedra::{Bretl, PolytopeProjector, Projection};

/// How to compute the SEP.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EquilibriumMethod {
    /// Rewrite the CWC at the origin as half-planes in `(x, y)`, then H→V.
    #[default]
    Hull,
    /// Project the stacked contact-wrench polytope onto `(x, y)`.
    Bretl,
}

impl ContactSet {
    /// Counterclockwise SEP vertices.
    ///
    /// Errors: `Infeasible` when no CoM position is in equilibrium,
    /// `Unbounded` when the stance holds arbitrarily remote CoMs.
    pub fn compute_static_equilibrium_polygon(
        &self,
        method: EquilibriumMethod,
    ) -> Result<Vec<Vector2<f64>>> {
        let vertices = match method {
            EquilibriumMethod::Hull => self.static_equilibrium_hull(),
            EquilibriumMethod::Bretl => self.project_static_equilibrium_polygon(&Bretl::default()),
        }?;
        debug!(?method, vertices = vertices.len(), "static-equilibrium polygon");
        Ok(vertices)
    }

    fn static_equilibrium_hull(&self) -> Result<Vec<Vector2<f64>>> {
        let a = self.compute_wrench_inequalities(&Vector3::zeros());
        // A (0, 0, 1, y, −x, 0) ≤ 0  <=>  −A₄ x + A₃ y ≤ −A₂
        let b = DMatrix::from_fn(a.nrows(), 2, |i, j| {
            if j == 0 {
                -a[(i, 4)]
            } else {
                a[(i, 3)]
            }
        });
        let c = -a.column(2);
        compute_polygon_hull(&b, &c)
    }

    /// SEP through a polytope projection over the contact-frame wrenches of
    /// all contacts.
    ///
    /// Only the wrench cones enter, with a zero right-hand side, so the
    /// reference mass cancels out. Pressure limits bound the magnitude of a
    /// wrench and would tie the polygon to that mass; they are ignored, as in
    /// the `Hull` method.
    pub fn project_static_equilibrium_polygon<P: PolytopeProjector>(
        &self,
        projector: &P,
    ) -> Result<Vec<Vector2<f64>>> {
        if self.is_empty() {
            return Err(Error::Infeasible("no contact to stand on".into()));
        }
        let mg = REFERENCE_MASS * GRAVITY;
        let n = 6 * self.nb_contacts();
        let mut g = DMatrix::zeros(16 * self.nb_contacts(), n);
        for (k, c) in self.contacts().iter().enumerate() {
            g.view_mut((16 * k, 6 * k), (16, 6))
                .copy_from(&c.local_wrench_inequalities());
        }
        let h = DVector::zeros(g.nrows());
        let g0 = self.compute_grasp_matrix(&Vector3::zeros());
        // force balance and zero yaw moment
        let a = g0.select_rows(&[0, 1, 2, 5]);
        let b = DVector::from_column_slice(&[0.0, 0.0, mg, 0.0]);
        let mut e = DMatrix::zeros(2, n);
        e.row_mut(0).copy_from(&(-g0.row(4) / mg));
        e.row_mut(1).copy_from(&(g0.row(3) / mg));
        let proj = Projection::new(e, Vector2::zeros(), g, h).with_eq(a, b);
        projector.project(&proj)
    }
}

/// SEP vertices together with their half-planes.
#[derive(Clone, Debug)]
pub struct StaticEquilibriumPolygon {
    vertices: Vec<Vector2<f64>>,
    halfspaces: Vec<Hs2>,
}

impl StaticEquilibriumPolygon {
    pub fn compute(contacts: &ContactSet, method: EquilibriumMethod) -> Result<Self> {
        Ok(Self::from_vertices(
            contacts.compute_static_equilibrium_polygon(method)?,
        ))
    }

    pub fn from_vertices(vertices: Vec<Vector2<f64>>) -> Self {
        let halfspaces = compute_polygon_halfspaces(&vertices);
        Self {
            vertices,
            halfspaces,
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vector2<f64>] {
        &self.vertices
    }

    #[inline]
    pub fn halfspaces(&self) -> &[Hs2] {
        &self.halfspaces
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.vertices)
    }

    /// Distance from the ground projection of `com` to the closest edge,
    /// positive inside.
    pub fn dist_to_edge(&self, com: &Vector3<f64>) -> f64 {
        dist_to_edges(&self.halfspaces, com.xy())
    }

    pub fn contains(&self, com: &Vector3<f64>) -> bool {
        self.dist_to_edge(com) >= -FEAS_EPS
    }
}
