//! Rigid pose of a contact frame in the world frame.
//!
//! The orientation is stored once, as a unit quaternion; rotation matrices,
//! roll-pitch-yaw angles and the homogeneous transform are derived from it so
//! that all views agree.

use nalgebra::{
    Isometry3, Matrix3, Matrix4, Point3, Rotation3, Translation3, UnitQuaternion, Vector3,
};

/// Position + orientation (contact-to-world).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    iso: Isometry3<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    #[inline]
    pub fn new(position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            iso: Isometry3::from_parts(Translation3::from(position), orientation),
        }
    }

    #[inline]
    pub fn identity() -> Self {
        Self {
            iso: Isometry3::identity(),
        }
    }

    /// Pure translation.
    #[inline]
    pub fn from_position(position: Vector3<f64>) -> Self {
        Self::new(position, UnitQuaternion::identity())
    }

    /// Roll-pitch-yaw angles, applied as `Rz(yaw) · Ry(pitch) · Rx(roll)`.
    pub fn from_rpy(position: Vector3<f64>, rpy: Vector3<f64>) -> Self {
        Self::new(
            position,
            UnitQuaternion::from_euler_angles(rpy.x, rpy.y, rpy.z),
        )
    }

    /// From a rotation matrix. The matrix is re-orthonormalized first.
    pub fn from_rotation_matrix(position: Vector3<f64>, r: &Matrix3<f64>) -> Self {
        let rot = Rotation3::from_matrix(r);
        Self::new(position, UnitQuaternion::from_rotation_matrix(&rot))
    }

    #[inline]
    pub fn position(&self) -> Vector3<f64> {
        self.iso.translation.vector
    }

    #[inline]
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.iso.rotation
    }

    /// Rotation matrix `R` mapping contact-frame coordinates to world coordinates.
    #[inline]
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.iso.rotation.to_rotation_matrix().into_inner()
    }

    /// Roll, pitch, yaw (inverse of [`Pose::from_rpy`]).
    pub fn rpy(&self) -> Vector3<f64> {
        let (roll, pitch, yaw) = self.iso.rotation.euler_angles();
        Vector3::new(roll, pitch, yaw)
    }

    /// Homogeneous 4×4 transform.
    #[inline]
    pub fn transform(&self) -> Matrix4<f64> {
        self.iso.to_homogeneous()
    }

    /// Map a point from the contact frame to the world frame.
    #[inline]
    pub fn transform_point(&self, local: &Vector3<f64>) -> Vector3<f64> {
        (self.iso * Point3::from(*local)).coords
    }

    #[inline]
    pub fn set_position(&mut self, position: Vector3<f64>) {
        self.iso.translation = Translation3::from(position);
    }

    #[inline]
    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f64>) {
        self.iso.rotation = orientation;
    }
}
