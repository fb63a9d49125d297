//! Rigid-body mass properties.
//!
//! [`RigidInfo`] is the tuple a geometry-to-inertia service produces for a
//! mesh: total mass, center of mass, and the inertia tensor reduced to its
//! principal axes (diagonal entries plus the rotation into the principal
//! basis).

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ArmatureError, Frame, Result};

/// Off-diagonal inertia entries above this are treated as a genuinely
/// non-diagonal tensor. Mesh-derived inertia has poor precision, so the
/// threshold is coarse.
const OFF_DIAGONAL_TOL: f64 = 1e-5;

/// Mass, center of mass, and principal inertia of a rigid body.
///
/// # Example
///
/// ```
/// use armature_types::RigidInfo;
/// use nalgebra::Vector3;
///
/// let info = RigidInfo::new(2.0, Vector3::zeros(), Vector3::new(1.0, 2.0, 3.0));
/// let heavier = info.rescaled_to_mass(4.0);
/// assert_eq!(heavier.diagonal_inertia, Vector3::new(2.0, 4.0, 6.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidInfo {
    /// Total mass in kg.
    pub mass: f64,
    /// Center of mass in body coordinates.
    pub center_of_mass: Vector3<f64>,
    /// Principal moments of inertia (kg·m²).
    pub diagonal_inertia: Vector3<f64>,
    /// Rotation from body axes into the principal-axis basis.
    pub inertia_rotation: UnitQuaternion<f64>,
}

impl RigidInfo {
    /// Create rigid info with an already-diagonal inertia tensor.
    #[must_use]
    pub fn new(mass: f64, center_of_mass: Vector3<f64>, diagonal_inertia: Vector3<f64>) -> Self {
        Self {
            mass,
            center_of_mass,
            diagonal_inertia,
            inertia_rotation: UnitQuaternion::identity(),
        }
    }

    /// Create rigid info with an explicit principal-axis rotation.
    #[must_use]
    pub const fn with_rotation(
        mass: f64,
        center_of_mass: Vector3<f64>,
        diagonal_inertia: Vector3<f64>,
        inertia_rotation: UnitQuaternion<f64>,
    ) -> Self {
        Self {
            mass,
            center_of_mass,
            diagonal_inertia,
            inertia_rotation,
        }
    }

    /// Reduce a full inertia tensor to principal axes.
    ///
    /// A tensor with off-diagonal terms is diagonalized by symmetric
    /// eigendecomposition; a reflection in the eigenbasis (negative
    /// determinant) is made a proper rotation by negating one column.
    /// An already-diagonal tensor keeps identity rotation.
    pub fn from_inertia_matrix(
        mass: f64,
        center_of_mass: Vector3<f64>,
        inertia: Matrix3<f64>,
    ) -> Result<Self> {
        let off_diagonal = inertia[(0, 1)]
            .abs()
            .max(inertia[(0, 2)].abs())
            .max(inertia[(1, 2)].abs());

        let info = if off_diagonal > OFF_DIAGONAL_TOL {
            let eigen = inertia.symmetric_eigen();
            let mut basis = eigen.eigenvectors;
            if basis.determinant() < 0.0 {
                let flipped = -basis.column(0).clone_owned();
                basis.set_column(0, &flipped);
            }
            let rotation =
                UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis));
            Self::with_rotation(mass, center_of_mass, eigen.eigenvalues, rotation)
        } else {
            Self::new(mass, center_of_mass, inertia.diagonal())
        };

        info.validate()?;
        Ok(info)
    }

    /// The center-of-mass frame: principal-axis rotation at the center of
    /// mass.
    #[must_use]
    pub fn com_frame(&self) -> Frame {
        Frame::from_parts(self.center_of_mass, self.inertia_rotation)
    }

    /// Rescale so total mass matches `target_mass`, preserving inertia
    /// ratios.
    ///
    /// Inertia is assumed linear in mass at fixed geometry, which holds
    /// only for spatially uniform density; mesh-derived properties at unit
    /// density satisfy this by construction.
    #[must_use]
    pub fn rescaled_to_mass(&self, target_mass: f64) -> Self {
        let scale = target_mass / self.mass;
        Self {
            mass: target_mass,
            center_of_mass: self.center_of_mass,
            diagonal_inertia: self.diagonal_inertia * scale,
            inertia_rotation: self.inertia_rotation,
        }
    }

    /// Validate that the properties are physically usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(ArmatureError::mesh_derivation(
                "<rigid info>",
                format!("mass must be positive and finite, got {}", self.mass),
            ));
        }
        if self.diagonal_inertia.iter().any(|&i| !(i.is_finite() && i >= 0.0)) {
            return Err(ArmatureError::mesh_derivation(
                "<rigid info>",
                "principal inertia entries must be non-negative and finite",
            ));
        }
        if !self.center_of_mass.iter().all(|x| x.is_finite()) {
            return Err(ArmatureError::mesh_derivation(
                "<rigid info>",
                "center of mass must be finite",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rescale_preserves_ratios() {
        let info = RigidInfo::new(0.5, Vector3::new(0.1, 0.0, 0.0), Vector3::new(1.0, 2.0, 4.0));
        let rescaled = info.rescaled_to_mass(2.0);

        assert_relative_eq!(rescaled.mass, 2.0, epsilon = 1e-12);
        assert_relative_eq!(
            rescaled.diagonal_inertia,
            Vector3::new(4.0, 8.0, 16.0),
            epsilon = 1e-12
        );
        // Ratios unchanged.
        assert_relative_eq!(
            rescaled.diagonal_inertia / rescaled.mass,
            info.diagonal_inertia / info.mass,
            epsilon = 1e-12
        );
        assert_relative_eq!(rescaled.center_of_mass, info.center_of_mass, epsilon = 1e-12);
    }

    #[test]
    fn test_diagonal_matrix_kept_directly() {
        let inertia = Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0));
        let info = RigidInfo::from_inertia_matrix(1.0, Vector3::zeros(), inertia).unwrap();

        assert_relative_eq!(info.diagonal_inertia, Vector3::new(1.0, 2.0, 3.0), epsilon = 1e-12);
        assert!(info.inertia_rotation.angle() < 1e-12);
    }

    #[test]
    fn test_principal_axes_recovered() {
        // Diagonal tensor conjugated by a known rotation.
        let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5);
        let basis = rotation.to_rotation_matrix().into_inner();
        let diagonal = Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0));
        let full = basis * diagonal * basis.transpose();

        let info = RigidInfo::from_inertia_matrix(1.0, Vector3::zeros(), full).unwrap();

        // The recovered basis must reproduce the full tensor.
        let recovered_basis = info.inertia_rotation.to_rotation_matrix().into_inner();
        let rebuilt = recovered_basis
            * Matrix3::from_diagonal(&info.diagonal_inertia)
            * recovered_basis.transpose();
        assert_relative_eq!(rebuilt, full, epsilon = 1e-9);
    }

    #[test]
    fn test_com_frame() {
        let info = RigidInfo::new(1.0, Vector3::new(0.0, 0.5, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let frame = info.com_frame();
        assert_relative_eq!(frame.translation, Vector3::new(0.0, 0.5, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_mass() {
        let info = RigidInfo::new(0.0, Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        assert!(info.validate().is_err());

        let info = RigidInfo::new(1.0, Vector3::zeros(), Vector3::new(-1.0, 1.0, 1.0));
        assert!(info.validate().is_err());
    }
}
