//! Ordered sets of contacts.
//!
//! Purpose
//! - Stack per-contact matrices (grasp matrix, wrench span) at a common
//!   reference point and derive the contact wrench cone (CWC) of the whole
//!   stance.
//! - Distribute a target wrench over the supporting contacts (QP).
//! - Static-equilibrium polygon of the center of mass (see `equilibrium`),
//!   the pendular ZMP support area and CoM acceleration cone.
//!
//! Conventions
//! - Contact indices always refer to positions in the set, including managed
//!   contacts.
//! - Per-contact wrenches returned by the distribution are expressed in the
//!   contact frame, at the contact point.

mod equilibrium;

pub use equilibrium::{EquilibriumMethod, StaticEquilibriumPolygon};

use nalgebra::{DMatrix, DVector, Vector2, Vector3};
use tracing::debug;

use crate::cfg::FEAS_EPS;
use crate::contact::Contact;
use crate::error::{Error, Result};
use crate::geom2::compute_polygon_hull;
use crate::polyhedra::{compute_cone_face_matrix, Bretl, PolytopeProjector, Projection};
use crate::solvers::{ClarabelSolver, QpProblem, QpSolver};
use crate::wrench::{crossmat, transport_matrix, Wrench};

/// Gravitational acceleration [m/s²].
pub const GRAVITY: f64 = 9.81;

/// Cost weights of the wrench distribution QP.
///
/// Each supporting wrench `w = (f, τ)` (contact frame) costs
/// `friction·(fx² + fy²) + ε·fz² + cop·(τx² + τy²) + yaw·τz²` with
/// `ε = 1e-3·min(friction, cop, yaw)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportWeights {
    pub friction: f64,
    pub cop: f64,
    pub yaw: f64,
}

impl Default for SupportWeights {
    fn default() -> Self {
        Self {
            friction: 1e-2,
            cop: 1.0,
            yaw: 1e-4,
        }
    }
}

impl SupportWeights {
    fn diagonal(&self) -> [f64; 6] {
        let eps = 1e-3 * self.friction.min(self.cop).min(self.yaw);
        [
            self.friction,
            self.friction,
            eps,
            self.cop,
            self.cop,
            self.yaw,
        ]
    }
}

/// Wrench assigned to one supporting contact (contact frame, contact point).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportingWrench {
    pub contact: usize,
    pub wrench: Wrench,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactSet {
    contacts: Vec<Contact>,
}

impl FromIterator<Contact> for ContactSet {
    fn from_iter<I: IntoIterator<Item = Contact>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ContactSet {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    pub fn push(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    #[inline]
    pub fn nb_contacts(&self) -> usize {
        self.contacts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    #[inline]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    #[inline]
    pub fn contacts_mut(&mut self) -> &mut [Contact] {
        &mut self.contacts
    }

    pub fn get(&self, index: usize) -> Option<&Contact> {
        self.contacts.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Contact> {
        self.contacts.get_mut(index)
    }

    /// Contacts whose wrench is left to the distribution, with their indices.
    pub fn supporting_contacts(&self) -> impl Iterator<Item = (usize, &Contact)> + '_ {
        self.contacts
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_managed())
    }

    /// Sum of the managed wrenches, taken at `point`.
    pub fn managed_wrench_at(&self, point: &Vector3<f64>) -> Wrench {
        self.contacts
            .iter()
            .filter_map(|c| c.wrench_at(point))
            .sum()
    }

    /// `[G_1(p) … G_n(p)]`, 6×6n.
    pub fn compute_grasp_matrix(&self, p: &Vector3<f64>) -> DMatrix<f64> {
        let mut g = DMatrix::zeros(6, 6 * self.nb_contacts());
        for (i, c) in self.contacts.iter().enumerate() {
            g.view_mut((0, 6 * i), (6, 6))
                .copy_from(&c.compute_grasp_matrix(p));
        }
        g
    }

    /// Wrench spans of all contacts, transported to `p`, side by side (6×16n).
    pub fn compute_wrench_span(&self, p: &Vector3<f64>) -> DMatrix<f64> {
        let mut s = DMatrix::zeros(6, 16 * self.nb_contacts());
        for (i, c) in self.contacts.iter().enumerate() {
            let moved = transport_matrix(&c.position(), p) * c.wrench_span();
            s.view_mut((0, 16 * i), (6, 16)).copy_from(&moved);
        }
        s
    }

    /// Face matrix `F` of the CWC at `p`: a world-frame wrench `w` taken at
    /// `p` is feasible iff `F w ≤ 0`.
    pub fn compute_wrench_inequalities(&self, p: &Vector3<f64>) -> DMatrix<f64> {
        compute_cone_face_matrix(&self.compute_wrench_span(p))
    }

    /// Distribute `wrench` (world frame, taken at `point`) over the supporting
    /// contacts, net of the managed ones.
    ///
    /// Returns one contact-frame wrench per supporting contact, in set order.
    /// With no supporting contact the result is empty when the managed wrenches
    /// already match the target.
    ///
    /// Errors: `Infeasible` when no admissible distribution exists.
    pub fn find_supporting_wrenches<S: QpSolver>(
        &self,
        wrench: &Wrench,
        point: &Vector3<f64>,
        weights: &SupportWeights,
        solver: &S,
    ) -> Result<Vec<SupportingWrench>> {
        let target = wrench - self.managed_wrench_at(point);
        let supporting: Vec<(usize, &Contact)> = self.supporting_contacts().collect();
        if supporting.is_empty() {
            let residual = target.norm();
            if residual <= FEAS_EPS * wrench.norm().max(1.0) {
                return Ok(Vec::new());
            }
            return Err(Error::Infeasible(format!(
                "no supporting contact left for a residual wrench of norm {residual:.3e}"
            )));
        }

        let n = 6 * supporting.len();
        let diag = weights.diagonal();
        let p = DMatrix::from_diagonal(&DVector::from_fn(n, |i, _| diag[i % 6]));
        let (g, h) = stacked_local_hrep(supporting.iter().map(|(_, c)| *c));
        let mut a = DMatrix::zeros(6, n);
        for (k, (_, contact)) in supporting.iter().enumerate() {
            a.view_mut((0, 6 * k), (6, 6))
                .copy_from(&contact.compute_grasp_matrix(point));
        }
        let qp = QpProblem::new(p, DVector::zeros(n))
            .with_ineq(g, h)
            .with_eq(a, DVector::from_column_slice(target.as_slice()));
        let x = solver.solve(&qp)?;
        debug!(
            supporting = supporting.len(),
            managed = self.nb_contacts() - supporting.len(),
            "wrench distribution solved"
        );
        Ok(supporting
            .iter()
            .enumerate()
            .map(|(k, (index, _))| SupportingWrench {
                contact: *index,
                wrench: Wrench::from_column_slice(&x.as_slice()[6 * k..6 * k + 6]),
            })
            .collect())
    }

    /// Supporting wrenches that hold a body of `mass` still with its center
    /// of mass at `com`.
    pub fn find_static_supporting_wrenches(
        &self,
        com: &Vector3<f64>,
        mass: f64,
    ) -> Result<Vec<SupportingWrench>> {
        let target = Wrench::new(0.0, 0.0, mass * GRAVITY, 0.0, 0.0, 0.0);
        self.find_supporting_wrenches(
            &target,
            com,
            &SupportWeights::default(),
            &ClarabelSolver::default(),
        )
    }

    /// Pendular ZMP support area in the horizontal plane at `height`.
    ///
    /// The CoM sits at `com` with zero vertical acceleration and zero angular
    /// momentum, so the net contact force points along the line from the ZMP
    /// to the CoM. Pressure limits are honored, which makes the area depend on
    /// `mass`.
    ///
    /// Errors: `Infeasible` when the contacts cannot carry the weight, or when
    /// `height` equals the CoM height (the area collapses to a point).
    pub fn compute_zmp_support_area(
        &self,
        com: &Vector3<f64>,
        mass: f64,
        height: f64,
    ) -> Result<Vec<Vector2<f64>>> {
        self.project_zmp_support_area(com, mass, height, &Bretl::default())
    }

    /// [`ContactSet::compute_zmp_support_area`] with an explicit projector.
    pub fn project_zmp_support_area<P: PolytopeProjector>(
        &self,
        com: &Vector3<f64>,
        mass: f64,
        height: f64,
        projector: &P,
    ) -> Result<Vec<Vector2<f64>>> {
        if self.is_empty() {
            return Err(Error::Infeasible("no contact to stand on".into()));
        }
        let mg = mass * GRAVITY;
        let (g, h) = stacked_local_hrep(self.contacts.iter());
        let g0 = self.compute_grasp_matrix(&Vector3::zeros());
        let n = g0.ncols();
        // τ_O = com × f (no moment about the CoM) and f_z = mg
        let com_cross = DMatrix::from_column_slice(3, 3, crossmat(com).as_slice());
        let mut a = DMatrix::zeros(4, n);
        a.rows_mut(0, 3)
            .copy_from(&(g0.rows(3, 3).into_owned() - com_cross * g0.rows(0, 3)));
        a.row_mut(3).copy_from(&g0.row(2));
        let b = DVector::from_column_slice(&[0.0, 0.0, 0.0, mg]);
        // ZMP = com + (height − z) f / f_z
        let e = g0.rows(0, 2) * ((height - com.z) / mg);
        let proj = Projection::new(e, com.xy(), g, h).with_eq(a, b);
        let area = projector.project(&proj)?;
        debug!(height, mass, vertices = area.len(), "ZMP support area");
        Ok(area)
    }

    /// Reduced pendular cone: the polygon of `(α, β)` such that the CoM
    /// acceleration `(α (g + z̈), β (g + z̈), z̈)` is feasible, with zero
    /// angular momentum at the CoM, from every point of `com_vertices`.
    ///
    /// # Panics
    /// If `com_vertices` is empty.
    pub fn compute_reduced_pendular_accel_cone(
        &self,
        com_vertices: &[Vector3<f64>],
    ) -> Result<Vec<Vector2<f64>>> {
        assert!(!com_vertices.is_empty(), "need at least one CoM position");
        let cwc = self.compute_wrench_inequalities(&Vector3::zeros());
        let m = cwc.nrows();
        let gravity = Vector3::new(0.0, 0.0, -GRAVITY);
        let mut b = DMatrix::zeros(m * com_vertices.len(), 2);
        let mut sigma = DVector::zeros(m * com_vertices.len());
        for (k, v) in com_vertices.iter().enumerate() {
            for i in 0..m {
                let a_f = Vector3::new(cwc[(i, 0)], cwc[(i, 1)], cwc[(i, 2)]);
                let a_t = Vector3::new(cwc[(i, 3)], cwc[(i, 4)], cwc[(i, 5)]);
                let row = a_f + a_t.cross(v);
                b[(k * m + i, 0)] = row.x;
                b[(k * m + i, 1)] = row.y;
                sigma[k * m + i] = row.dot(&gravity) / GRAVITY;
            }
        }
        compute_polygon_hull(&b, &sigma)
    }

    /// Pendular CoM acceleration cone, truncated at vertical acceleration
    /// `zdd_max` (default `g`): gravity as apex, then one point per vertex of
    /// the reduced polygon.
    ///
    /// # Panics
    /// If `com_vertices` is empty.
    pub fn compute_pendular_accel_cone(
        &self,
        com_vertices: &[Vector3<f64>],
        zdd_max: Option<f64>,
    ) -> Result<Vec<Vector3<f64>>> {
        let reduced = self.compute_reduced_pendular_accel_cone(com_vertices)?;
        let zdd = zdd_max.unwrap_or(GRAVITY);
        let scale = GRAVITY + zdd;
        let mut out = Vec::with_capacity(reduced.len() + 1);
        out.push(Vector3::new(0.0, 0.0, -GRAVITY));
        out.extend(
            reduced
                .iter()
                .map(|p| Vector3::new(p.x * scale, p.y * scale, zdd)),
        );
        Ok(out)
    }
}

/// Block-diagonal contact-frame H-rep `(G, h)` of `contacts`, pressure limits
/// included.
fn stacked_local_hrep<'a>(
    contacts: impl Iterator<Item = &'a Contact>,
) -> (DMatrix<f64>, DVector<f64>) {
    let hreps: Vec<(DMatrix<f64>, DVector<f64>)> =
        contacts.map(|c| c.local_wrench_hrep()).collect();
    let nb_rows: usize = hreps.iter().map(|(f, _)| f.nrows()).sum();
    let mut g = DMatrix::zeros(nb_rows, 6 * hreps.len());
    let mut h = DVector::zeros(nb_rows);
    let mut row = 0;
    for (k, (f, bound)) in hreps.iter().enumerate() {
        g.view_mut((row, 6 * k), (f.nrows(), 6)).copy_from(f);
        h.rows_mut(row, bound.len()).copy_from(bound);
        row += f.nrows();
    }
    (g, h)
}

#[cfg(test)]
mod tests;
