//! Rectangular contact surface with Coulomb friction.
//!
//! A contact is a `2X × 2Y` rectangle centered at its frame origin, with its
//! normal along the frame `z` axis. Forces are restricted to the inner
//! friction pyramid of coefficient `μ' = μ/√2`; the resulting contact wrench
//! cone has the closed form of Caron, Pham and Nakamura (ICRA 2015).

use nalgebra::{
    DMatrix, DVector, Matrix3, Matrix4, Matrix6, SMatrix, UnitQuaternion, Vector3, Vector6,
};

use crate::pose::Pose;
use crate::wrench::{block_rotation, crossmat, transport, Wrench};

/// Whether a contact takes part in wrench distribution.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ContactMode {
    /// Unknown wrench, to be found by the distribution QP.
    #[default]
    Supporting,
    /// Fixed wrench, in the world frame at the contact point.
    Managed(Wrench),
}

/// Signs of the four friction-pyramid edges and of the four rectangle
/// corners, counterclockwise from `(+, +)`.
const QUADRANTS: [(f64, f64); 4] = [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)];

#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    /// Half-length `X` (along frame x) and half-width `Y` (along frame y).
    pub shape: (f64, f64),
    pub pose: Pose,
    pub friction: f64,
    pub max_pressure: Option<f64>,
    pub mode: ContactMode,
}

impl Contact {
    /// Supporting contact without pressure limit.
    ///
    /// # Panics
    /// If a half-dimension is not positive or the friction coefficient is
    /// negative or not finite.
    pub fn new(shape: (f64, f64), pose: Pose, friction: f64) -> Self {
        assert!(
            shape.0 > 0.0 && shape.1 > 0.0,
            "contact half-dimensions must be positive, got {shape:?}"
        );
        assert!(
            friction.is_finite() && friction >= 0.0,
            "invalid friction coefficient {friction}"
        );
        Self {
            shape,
            pose,
            friction,
            max_pressure: None,
            mode: ContactMode::Supporting,
        }
    }

    /// # Panics
    /// If `max_pressure` is negative.
    pub fn with_max_pressure(mut self, max_pressure: f64) -> Self {
        assert!(max_pressure >= 0.0, "negative max pressure {max_pressure}");
        self.max_pressure = Some(max_pressure);
        self
    }

    #[inline]
    pub fn position(&self) -> Vector3<f64> {
        self.pose.position()
    }

    /// Contact-to-world rotation.
    #[inline]
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.pose.rotation_matrix()
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.rotation_matrix().column(2).into_owned()
    }

    #[inline]
    pub fn rpy(&self) -> Vector3<f64> {
        self.pose.rpy()
    }

    /// Homogeneous contact-to-world transform.
    #[inline]
    pub fn transform(&self) -> Matrix4<f64> {
        self.pose.transform()
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn set_position(&mut self, position: Vector3<f64>) {
        self.pose.set_position(position);
    }

    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f64>) {
        self.pose.set_orientation(orientation);
    }

    /// World coordinates of the rectangle corners, counterclockwise around
    /// the normal.
    pub fn vertices(&self) -> [Vector3<f64>; 4] {
        self.scaled_vertices(1.0)
    }

    /// Corners of the rectangle shrunk (or grown) by `scale` about its center.
    pub fn scaled_vertices(&self, scale: f64) -> [Vector3<f64>; 4] {
        let (x, y) = self.shape;
        QUADRANTS.map(|(sx, sy)| {
            self.pose
                .transform_point(&Vector3::new(sx * scale * x, sy * scale * y, 0.0))
        })
    }

    #[inline]
    fn inner_friction(&self) -> f64 {
        self.friction / 2f64.sqrt()
    }

    /// Friction pyramid `F f ≤ 0` for world-frame forces.
    pub fn force_inequalities(&self) -> SMatrix<f64, 4, 3> {
        let mu = self.inner_friction();
        let local = SMatrix::<f64, 4, 3>::from_row_slice(&[
            -1.0, 0.0, -mu, //
            1.0, 0.0, -mu, //
            0.0, -1.0, -mu, //
            0.0, 1.0, -mu,
        ]);
        local * self.rotation_matrix().transpose()
    }

    /// World-frame edges of the friction pyramid.
    pub fn force_rays(&self) -> [Vector3<f64>; 4] {
        let mu = self.inner_friction();
        let r = self.rotation_matrix();
        QUADRANTS.map(|(sx, sy)| r * Vector3::new(sx * mu, sy * mu, 1.0))
    }

    /// Friction pyramid as a 3×4 span matrix.
    pub fn force_span(&self) -> SMatrix<f64, 3, 4> {
        SMatrix::from_columns(&self.force_rays())
    }

    /// Maps a contact-frame wrench at the contact point to the world-frame
    /// wrench at `p`: `[[R, 0], [crossmat(c − p) R, R]]`.
    pub fn compute_grasp_matrix(&self, p: &Vector3<f64>) -> Matrix6<f64> {
        let r = self.rotation_matrix();
        let mut g = block_rotation(&r);
        g.fixed_view_mut::<3, 3>(3, 0)
            .copy_from(&(crossmat(&(self.position() - p)) * r));
        g
    }

    /// Contact wrench cone `F w ≤ 0` for contact-frame wrenches at the
    /// contact point.
    pub fn local_wrench_inequalities(&self) -> SMatrix<f64, 16, 6> {
        let (x, y) = self.shape;
        let mu = self.inner_friction();
        let s = -(x + y) * mu;
        SMatrix::<f64, 16, 6>::from_row_slice(&[
            // Coulomb friction
            -1.0, 0.0, -mu, 0.0, 0.0, 0.0, //
            1.0, 0.0, -mu, 0.0, 0.0, 0.0, //
            0.0, -1.0, -mu, 0.0, 0.0, 0.0, //
            0.0, 1.0, -mu, 0.0, 0.0, 0.0, //
            // CoP inside the rectangle
            0.0, 0.0, -y, -1.0, 0.0, 0.0, //
            0.0, 0.0, -y, 1.0, 0.0, 0.0, //
            0.0, 0.0, -x, 0.0, -1.0, 0.0, //
            0.0, 0.0, -x, 0.0, 1.0, 0.0, //
            // yaw moment bounds
            -y, -x, s, mu, mu, -1.0, //
            -y, x, s, mu, -mu, -1.0, //
            y, -x, s, -mu, mu, -1.0, //
            y, x, s, -mu, -mu, -1.0, //
            y, x, s, mu, mu, 1.0, //
            y, -x, s, mu, -mu, 1.0, //
            -y, x, s, -mu, mu, 1.0, //
            -y, -x, s, -mu, -mu, 1.0,
        ])
    }

    /// Contact wrench cone for world-frame wrenches at the contact point.
    pub fn wrench_inequalities(&self) -> SMatrix<f64, 16, 6> {
        self.local_wrench_inequalities() * block_rotation(&self.rotation_matrix().transpose())
    }

    /// `(F, g)` with `F w ≤ g` for world-frame wrenches at the contact point,
    /// including the pressure limit when one is set.
    pub fn wrench_hrep(&self) -> (DMatrix<f64>, DVector<f64>) {
        let n = self.normal();
        let pressure_row = Vector6::new(n.x, n.y, n.z, 0.0, 0.0, 0.0);
        self.stack_hrep(&self.wrench_inequalities(), &pressure_row)
    }

    /// Same as [`Contact::wrench_hrep`] for contact-frame wrenches.
    pub fn local_wrench_hrep(&self) -> (DMatrix<f64>, DVector<f64>) {
        let pressure_row = Vector6::new(0.0, 0.0, 1.0, 0.0, 0.0, 0.0);
        self.stack_hrep(&self.local_wrench_inequalities(), &pressure_row)
    }

    fn stack_hrep(
        &self,
        f: &SMatrix<f64, 16, 6>,
        pressure_row: &Vector6<f64>,
    ) -> (DMatrix<f64>, DVector<f64>) {
        let rows = 16 + usize::from(self.max_pressure.is_some());
        let mut a = DMatrix::zeros(rows, 6);
        let mut b = DVector::zeros(rows);
        a.view_mut((0, 0), (16, 6)).copy_from(f);
        if let Some(p) = self.max_pressure {
            a.row_mut(16).copy_from(&pressure_row.transpose());
            b[16] = p;
        }
        (a, b)
    }

    /// Generators `(f, (v − c) × f)` of the contact wrench cone, world frame
    /// at the contact point, for every corner `v` and friction ray `f`.
    pub fn wrench_rays(&self) -> Vec<Wrench> {
        let c = self.position();
        let rays = self.force_rays();
        self.vertices()
            .iter()
            .flat_map(|v| {
                rays.iter()
                    .map(move |f| crate::wrench::wrench(*f, (v - c).cross(f)))
            })
            .collect()
    }

    /// Contact wrench cone as a 6×16 span matrix.
    pub fn wrench_span(&self) -> SMatrix<f64, 6, 16> {
        SMatrix::from_columns(&self.wrench_rays())
    }

    /// Fix the contact wrench, given in the contact frame at the contact
    /// point, and switch to [`ContactMode::Managed`].
    pub fn set_wrench(&mut self, local: &Wrench) {
        let world = block_rotation(&self.rotation_matrix()) * local;
        self.mode = ContactMode::Managed(world);
    }

    pub fn unset_wrench(&mut self) {
        self.mode = ContactMode::Supporting;
    }

    #[inline]
    pub fn is_managed(&self) -> bool {
        matches!(self.mode, ContactMode::Managed(_))
    }

    /// Managed wrench, world frame at the contact point.
    #[inline]
    pub fn wrench(&self) -> Option<Wrench> {
        match self.mode {
            ContactMode::Managed(w) => Some(w),
            ContactMode::Supporting => None,
        }
    }

    pub fn force(&self) -> Option<Vector3<f64>> {
        self.wrench().map(|w| crate::wrench::force(&w))
    }

    pub fn moment(&self) -> Option<Vector3<f64>> {
        self.wrench().map(|w| crate::wrench::moment(&w))
    }

    /// Managed wrench taken at `point`; `None` for supporting contacts.
    pub fn wrench_at(&self, point: &Vector3<f64>) -> Option<Wrench> {
        self.wrench()
            .map(|w| transport(&w, &self.position(), point))
    }
}
