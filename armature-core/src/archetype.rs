//! The joint archetype catalog.
//!
//! Each archetype is a fixed policy for partitioning the six relative dofs
//! between two endpoint frames into constrained and free entries. Distance
//! is the one archetype whose constraint is not a linear projection of the
//! 6D relative pose; it constrains a single scalar edge length instead.

use armature_types::{Axis, Dof, DofMask};

/// A joint archetype: a fixed dof-partition policy.
///
/// Archetypes are data, not class hierarchies: the mask derivation below
/// is the whole of what distinguishes them at the constraint level.
/// Axis-parameterized archetypes take the local axis the joint acts along
/// or about (for [`Planar`](Self::Planar), the plane normal; for
/// [`Gimbal`](Self::Gimbal), the suppressed rotation axis).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointArchetype {
    /// No relative motion.
    Fixed,
    /// One rotational dof about the axis.
    Hinge(Axis),
    /// One translational dof along the axis.
    Slider(Axis),
    /// Translation along and rotation about the same axis.
    Cylindrical(Axis),
    /// Free rotation, fixed translation.
    BallAndSocket,
    /// Translation in the plane orthogonal to the normal.
    Planar(Axis),
    /// Rotation about the two axes orthogonal to the given axis.
    Gimbal(Axis),
    /// Fixed distance between the two endpoint positions.
    ///
    /// With no rest length, the distance at construction time is kept.
    Distance {
        /// Target edge length; `None` keeps the initial distance.
        rest_length: Option<f64>,
    },
    /// All six coordinates soft, each with its own stiffness.
    ///
    /// Nothing is rigidly constrained and no stabilization applies; a
    /// non-positive stiffness leaves that coordinate entirely free.
    GenericSpring {
        /// Per-coordinate stiffness, `[tx, ty, tz, rx, ry, rz]`.
        stiffness: [f64; 6],
    },
}

impl JointArchetype {
    /// The constrained/free partition, or `None` for [`Distance`](Self::Distance).
    #[must_use]
    pub fn mask(&self) -> Option<DofMask> {
        match self {
            Self::Fixed => Some(DofMask::all_constrained()),
            Self::Hinge(axis) => Some(DofMask::with_free(&[axis.rotation()])),
            Self::Slider(axis) => Some(DofMask::with_free(&[axis.translation()])),
            Self::Cylindrical(axis) => {
                Some(DofMask::with_free(&[axis.translation(), axis.rotation()]))
            }
            Self::BallAndSocket => Some(DofMask::with_free(&[Dof::Rx, Dof::Ry, Dof::Rz])),
            Self::Planar(normal) => {
                let (u, v) = normal.ortho();
                Some(DofMask::with_free(&[u.translation(), v.translation()]))
            }
            Self::Gimbal(axis) => {
                let (u, v) = axis.ortho();
                Some(DofMask::with_free(&[u.rotation(), v.rotation()]))
            }
            Self::Distance { .. } => None,
            Self::GenericSpring { .. } => Some(DofMask::all_free()),
        }
    }

    /// Number of free dofs the archetype leaves in the 6D basis.
    #[must_use]
    pub fn free_dof_count(&self) -> usize {
        self.mask().map_or(0, |mask| mask.free_count())
    }

    /// Whether the archetype reduces to a masked 6D relative pose.
    #[must_use]
    pub const fn is_reduced(&self) -> bool {
        !matches!(self, Self::Distance { .. })
    }

    /// Archetype name, for display and scene-node labels.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Hinge(_) => "hinge",
            Self::Slider(_) => "slider",
            Self::Cylindrical(_) => "cylindrical",
            Self::BallAndSocket => "ball-and-socket",
            Self::Planar(_) => "planar",
            Self::Gimbal(_) => "gimbal",
            Self::Distance { .. } => "distance",
            Self::GenericSpring { .. } => "spring",
        }
    }
}

impl std::fmt::Display for JointArchetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use armature_types::DofState;

    fn states(mask: DofMask) -> [DofState; 6] {
        let mut out = [DofState::Constrained; 6];
        for (slot, dof) in out.iter_mut().zip(Dof::ALL) {
            *slot = mask.state(dof);
        }
        out
    }

    #[test]
    fn test_mask_partition_totals() {
        let catalog = [
            JointArchetype::Fixed,
            JointArchetype::Hinge(Axis::X),
            JointArchetype::Slider(Axis::Y),
            JointArchetype::Cylindrical(Axis::Z),
            JointArchetype::BallAndSocket,
            JointArchetype::Planar(Axis::Z),
            JointArchetype::Gimbal(Axis::X),
            JointArchetype::GenericSpring { stiffness: [0.0; 6] },
        ];
        for archetype in catalog {
            let mask = archetype.mask().unwrap();
            assert_eq!(
                mask.constrained_count() + archetype.free_dof_count(),
                6,
                "{archetype}"
            );
        }
    }

    #[test]
    fn test_hinge_z_mask() {
        let mask = JointArchetype::Hinge(Axis::Z).mask().unwrap();
        use DofState::{Constrained as C, Free as F};
        assert_eq!(states(mask), [C, C, C, C, C, F]);
    }

    #[test]
    fn test_ball_and_socket_mask() {
        let mask = JointArchetype::BallAndSocket.mask().unwrap();
        use DofState::{Constrained as C, Free as F};
        assert_eq!(states(mask), [C, C, C, F, F, F]);
    }

    #[test]
    fn test_fixed_mask() {
        let mask = JointArchetype::Fixed.mask().unwrap();
        assert_eq!(mask.free_count(), 0);
        assert_eq!(states(mask), [DofState::Constrained; 6]);
    }

    #[test]
    fn test_slider_frees_translation_only() {
        let mask = JointArchetype::Slider(Axis::X).mask().unwrap();
        assert_eq!(mask.free_dofs().collect::<Vec<_>>(), vec![Dof::Tx]);
    }

    #[test]
    fn test_cylindrical_same_axis() {
        let mask = JointArchetype::Cylindrical(Axis::Y).mask().unwrap();
        assert_eq!(mask.free_dofs().collect::<Vec<_>>(), vec![Dof::Ty, Dof::Ry]);
    }

    #[test]
    fn test_planar_frees_in_plane_translations() {
        let mask = JointArchetype::Planar(Axis::Z).mask().unwrap();
        assert_eq!(mask.free_dofs().collect::<Vec<_>>(), vec![Dof::Tx, Dof::Ty]);
    }

    #[test]
    fn test_gimbal_frees_orthogonal_rotations() {
        let mask = JointArchetype::Gimbal(Axis::Y).mask().unwrap();
        assert_eq!(mask.free_dofs().collect::<Vec<_>>(), vec![Dof::Rx, Dof::Rz]);
    }

    #[test]
    fn test_distance_has_no_mask() {
        let archetype = JointArchetype::Distance { rest_length: None };
        assert!(archetype.mask().is_none());
        assert!(!archetype.is_reduced());
        assert_eq!(archetype.free_dof_count(), 0);
    }
}
