//! Rigid transform type.
//!
//! A [`Frame`] maps coordinates expressed in a local frame into its parent
//! frame. Frames form a group under composition; joints, body placements,
//! and attachment offsets are all expressed with them.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ArmatureError, Result};

/// Quaternion norms below this are rejected as degenerate.
const MIN_ROTATION_NORM: f64 = 1e-12;

/// A rigid transform from a local frame to its parent frame.
///
/// Immutable value type: composition and inversion produce new frames.
/// The rotation is always a unit quaternion; constructors that accept raw
/// quaternion coordinates renormalize and reject near-zero norms rather
/// than silently using an un-normalized rotation.
///
/// # Example
///
/// ```
/// use armature_types::Frame;
/// use nalgebra::Vector3;
///
/// let f = Frame::from_translation(Vector3::new(0.0, 0.0, 2.0));
/// let p = f.transform_point(&Vector3::new(1.0, 0.0, 0.0));
/// assert_eq!(p, Vector3::new(1.0, 0.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    /// Translation of the local origin, in parent coordinates.
    pub translation: Vector3<f64>,
    /// Orientation of the local axes, as an active unit quaternion.
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}

impl Frame {
    /// Create an identity frame (zero translation, no rotation).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Create a frame from translation and rotation.
    #[must_use]
    pub const fn from_parts(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Create a pure translation.
    #[must_use]
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            translation,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Create a pure rotation.
    #[must_use]
    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation,
        }
    }

    /// Create a frame from a raw (not necessarily unit) quaternion.
    ///
    /// The quaternion is renormalized. Fails with
    /// [`ArmatureError::DegenerateRotation`] if its norm is near zero.
    pub fn from_quaternion(translation: Vector3<f64>, rotation: Quaternion<f64>) -> Result<Self> {
        let norm = rotation.norm();
        if norm < MIN_ROTATION_NORM {
            return Err(ArmatureError::DegenerateRotation { norm });
        }
        Ok(Self {
            translation,
            rotation: UnitQuaternion::from_quaternion(rotation),
        })
    }

    /// Reconstruct a frame from its 7-element coordinate array.
    ///
    /// Layout is `[tx, ty, tz, qx, qy, qz, qw]`. Inverse of [`Self::to_array`].
    /// Fails with [`ArmatureError::DegenerateRotation`] on a near-zero
    /// quaternion.
    pub fn from_array(coords: &[f64; 7]) -> Result<Self> {
        Self::from_quaternion(
            Vector3::new(coords[0], coords[1], coords[2]),
            Quaternion::new(coords[6], coords[3], coords[4], coords[5]),
        )
    }

    /// The 7-element coordinate array `[tx, ty, tz, qx, qy, qz, qw]`.
    #[must_use]
    pub fn to_array(&self) -> [f64; 7] {
        let q = self.rotation.coords;
        [
            self.translation.x,
            self.translation.y,
            self.translation.z,
            q.x,
            q.y,
            q.z,
            q.w,
        ]
    }

    /// Compose two frames: `other` expressed in `self`'s parent frame.
    ///
    /// Chains transforms left-to-right; associative, not commutative.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            translation: self.translation + self.rotation * other.translation,
            rotation: self.rotation * other.rotation,
        }
    }

    /// The inverse transform.
    ///
    /// `f.compose(&f.inverse())` and `f.inverse().compose(&f)` are both
    /// identity to floating-point tolerance.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();
        Self {
            translation: -(inv_rotation * self.translation),
            rotation: inv_rotation,
        }
    }

    /// Transform a point from local to parent coordinates.
    #[must_use]
    pub fn transform_point(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.translation + self.rotation * local
    }

    /// Transform a vector from local to parent coordinates (rotation only).
    #[must_use]
    pub fn transform_vector(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * local
    }

    /// Transform a point from parent to local coordinates.
    #[must_use]
    pub fn inverse_transform_point(&self, parent: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse() * (parent - self.translation)
    }

    /// Transform a vector from parent to local coordinates.
    #[must_use]
    pub fn inverse_transform_vector(&self, parent: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse() * parent
    }

    /// Whether this frame is the identity to within `tol`.
    #[must_use]
    pub fn is_identity(&self, tol: f64) -> bool {
        self.translation.norm() <= tol && self.rotation.angle() <= tol
    }

    /// Check that no coordinate is `NaN` or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.translation.iter().all(|x| x.is_finite())
            && self.rotation.coords.iter().all(|x| x.is_finite())
    }
}
