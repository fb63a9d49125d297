//! A built joint and its handle surface.
//!
//! Joints are created through [`Linkage::add_joint`](crate::Linkage::add_joint)
//! once both endpoint frames exist. Limits, springs, dampers, and
//! controllers are layered on afterwards through the methods here; all of
//! them are owned by the joint, so removing the joint invalidates every
//! dependent at once.

use armature_types::{ArmatureError, Axis, BodyId, Dof, DofMask, OffsetId, Result};

use crate::archetype::JointArchetype;
use crate::constraint::{ConstraintBlock, Damper, DamperCoefficients, DiagonalSpring};
use crate::controller::{ControllerPurpose, Forcing, PositionServo, Resistance, VelocityServo};
use crate::limit::{paired_limits, single_dof_limit, BoundPair};

/// A joint endpoint: a body's own frame or one of its attachment offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// The body's frame itself.
    Body(BodyId),
    /// A named offset previously created on a body.
    Offset(OffsetId),
}

/// A joint between rigid bodies, compiled to constraint blocks.
///
/// The reduced 6-vector coordinate of a non-distance joint equals the
/// relative rigid transform between its endpoint frames; the blocks
/// constrain or drive entries of that vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    name: String,
    archetype: JointArchetype,
    anchors: Vec<Anchor>,
    mask: Option<DofMask>,
    compliance: f64,
    blocks: Vec<ConstraintBlock>,
}

impl Joint {
    pub(crate) fn new(
        name: String,
        archetype: JointArchetype,
        anchors: Vec<Anchor>,
        compliance: f64,
        base_block: ConstraintBlock,
    ) -> Self {
        Self {
            name,
            mask: archetype.mask(),
            archetype,
            anchors,
            compliance,
            blocks: vec![base_block],
        }
    }

    /// Joint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The archetype this joint was built from.
    #[must_use]
    pub const fn archetype(&self) -> &JointArchetype {
        &self.archetype
    }

    /// The endpoint anchors, in attachment order.
    #[must_use]
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// The constrained/free partition, if the archetype has one.
    #[must_use]
    pub const fn mask(&self) -> Option<DofMask> {
        self.mask
    }

    /// The free dofs, in coordinate order.
    #[must_use]
    pub fn free_dofs(&self) -> Vec<Dof> {
        self.mask
            .map(|mask| mask.free_dofs().collect())
            .unwrap_or_default()
    }

    /// Compliance of the joint's rigid part.
    #[must_use]
    pub const fn compliance(&self) -> f64 {
        self.compliance
    }

    /// The compiled constraint blocks, in creation order.
    #[must_use]
    pub fn blocks(&self) -> &[ConstraintBlock] {
        &self.blocks
    }

    /// Add limits from fully-paired bounds, one pair per free dof in
    /// coordinate order.
    ///
    /// Each paired dof yields a lower and an upper unilateral row; a dof
    /// with neither bound is skipped. Half-specified pairs are rejected;
    /// use [`add_limit`](Self::add_limit) for one-sided bounds.
    pub fn add_limits(&mut self, bounds: &[BoundPair], compliance: f64) -> Result<()> {
        let free = self.free_dofs();
        let set = paired_limits(
            &format!("limits for joint '{}'", self.name),
            &free,
            bounds,
            compliance,
        )?;
        self.blocks.push(ConstraintBlock::Limits(set));
        Ok(())
    }

    /// Add a limit on a single-dof joint, each side independently
    /// optional.
    pub fn add_limit(
        &mut self,
        lower: Option<f64>,
        upper: Option<f64>,
        compliance: f64,
    ) -> Result<()> {
        let dof = self.single_free_dof("limit")?;
        let set = single_dof_limit(dof, lower, upper, compliance);
        self.blocks.push(ConstraintBlock::Limits(set));
        Ok(())
    }

    /// Add a spring on the free dofs, one stiffness per free dof in
    /// coordinate order.
    ///
    /// Emitted as a diagonal compliance with 1/stiffness at each free
    /// coordinate; constrained coordinates stay inert. A non-positive
    /// stiffness leaves its coordinate unsprung.
    pub fn add_spring(&mut self, stiffness: &[f64]) -> Result<()> {
        let free = self.free_dofs();
        if stiffness.len() != free.len() {
            return Err(ArmatureError::mismatched_dofs(
                format!("spring stiffness for joint '{}'", self.name),
                free.len(),
                stiffness.len(),
            ));
        }

        let mut per_coordinate = [0.0; Dof::COUNT];
        for (&dof, &k) in free.iter().zip(stiffness) {
            if k <= 0.0 {
                tracing::warn!(
                    "joint '{}': non-positive stiffness on {dof} leaves it unsprung",
                    self.name
                );
            }
            per_coordinate[dof.index()] = k;
        }
        self.blocks
            .push(ConstraintBlock::DiagonalSpring(DiagonalSpring::from_stiffness(
                &per_coordinate,
            )));
        Ok(())
    }

    /// Add uniform velocity damping over the joint coordinates.
    pub fn add_damper(&mut self, coefficient: f64) {
        self.blocks.push(ConstraintBlock::Damper(Damper {
            coefficients: DamperCoefficients::Uniform(coefficient),
        }));
    }

    /// Add per-coordinate velocity damping.
    pub fn add_diagonal_damper(&mut self, coefficients: [f64; Dof::COUNT]) {
        self.blocks.push(ConstraintBlock::Damper(Damper {
            coefficients: DamperCoefficients::Diagonal(coefficients),
        }));
    }

    /// Add a position servo over all free dofs.
    ///
    /// With no targets, the current reduced coordinates are captured as
    /// the initial target: zero at construction, since the reduced
    /// coordinate measures displacement from the initial relative pose.
    /// Rotational targets must lie in `(−π, π]` (not wrapped).
    pub fn add_position_controller(
        &mut self,
        targets: Option<&[f64]>,
        compliance: f64,
    ) -> Result<()> {
        let dofs = self.free_dofs();
        let targets = match targets {
            Some(values) => values.to_vec(),
            None => vec![0.0; dofs.len()],
        };
        self.push_controller(ConstraintBlock::PositionServo(PositionServo::new(
            dofs, targets, compliance,
        )?))
    }

    /// Add a position servo over an explicit subset of the free dofs.
    pub fn add_position_controller_masked(
        &mut self,
        dofs: &[Dof],
        targets: &[f64],
        compliance: f64,
    ) -> Result<()> {
        self.push_controller(ConstraintBlock::PositionServo(PositionServo::new(
            dofs.to_vec(),
            targets.to_vec(),
            compliance,
        )?))
    }

    /// Add a position servo about a single rotation axis.
    ///
    /// The ball-and-socket form: drives the rotation about `axis` toward
    /// `target`, leaving the other rotations free.
    pub fn add_position_controller_about(
        &mut self,
        axis: Axis,
        target: f64,
        compliance: f64,
    ) -> Result<()> {
        self.push_controller(ConstraintBlock::PositionServo(PositionServo::new(
            vec![axis.rotation()],
            vec![target],
            compliance,
        )?))
    }

    /// Add a velocity servo over all free dofs.
    pub fn add_velocity_controller(&mut self, targets: &[f64], compliance: f64) -> Result<()> {
        let dofs = self.free_dofs();
        self.push_controller(ConstraintBlock::VelocityServo(VelocityServo::new(
            dofs,
            targets.to_vec(),
            compliance,
        )?))
    }

    /// Add explicit generalized forces on all free dofs.
    pub fn add_force_controller(&mut self, forces: &[f64]) -> Result<()> {
        let dofs = self.free_dofs();
        self.push_controller(ConstraintBlock::Forcing(Forcing::new(
            dofs,
            forces.to_vec(),
        )?))
    }

    /// Add friction-like resistance on all free dofs.
    pub fn add_resistance(&mut self, threshold: f64) -> Result<()> {
        let dofs = self.free_dofs();
        self.push_controller(ConstraintBlock::Resistance(Resistance::new(
            dofs, threshold,
        )))
    }

    /// The position servo, if one was added.
    pub fn position_controller_mut(&mut self) -> Option<&mut PositionServo> {
        self.blocks.iter_mut().find_map(|block| match block {
            ConstraintBlock::PositionServo(servo) => Some(servo),
            _ => None,
        })
    }

    /// The velocity servo, if one was added. Targets can be updated live.
    pub fn velocity_controller_mut(&mut self) -> Option<&mut VelocityServo> {
        self.blocks.iter_mut().find_map(|block| match block {
            ConstraintBlock::VelocityServo(servo) => Some(servo),
            _ => None,
        })
    }

    /// The forcing term, if one was added. Forces can be updated live.
    pub fn force_controller_mut(&mut self) -> Option<&mut Forcing> {
        self.blocks.iter_mut().find_map(|block| match block {
            ConstraintBlock::Forcing(forcing) => Some(forcing),
            _ => None,
        })
    }

    fn push_controller(&mut self, block: ConstraintBlock) -> Result<()> {
        if let Some(purpose) = block.purpose() {
            if self.has_controller(purpose) {
                return Err(ArmatureError::duplicate_controller(
                    &self.name,
                    purpose.to_string(),
                ));
            }
        }
        self.blocks.push(block);
        Ok(())
    }

    fn has_controller(&self, purpose: ControllerPurpose) -> bool {
        self.blocks
            .iter()
            .any(|block| block.purpose() == Some(purpose))
    }

    fn single_free_dof(&self, what: &str) -> Result<Dof> {
        let free = self.free_dofs();
        if free.len() == 1 {
            Ok(free[0])
        } else {
            Err(ArmatureError::mismatched_dofs(
                format!("single-dof {what} for joint '{}'", self.name),
                1,
                free.len(),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::constraint::{MaskedEquality, DEFAULT_COMPLIANCE};
    use armature_types::Sign;

    fn hinge() -> Joint {
        let archetype = JointArchetype::Hinge(Axis::Z);
        let mask = archetype.mask().unwrap();
        Joint::new(
            "elbow".to_string(),
            archetype,
            vec![Anchor::Body(BodyId::new(0)), Anchor::Body(BodyId::new(1))],
            DEFAULT_COMPLIANCE,
            ConstraintBlock::MaskedEquality(MaskedEquality {
                mask,
                compliance: DEFAULT_COMPLIANCE,
            }),
        )
    }

    #[test]
    fn test_hinge_limit_rows() {
        let mut joint = hinge();
        joint.add_limit(Some(-0.5), Some(1.0), 0.0).unwrap();

        let ConstraintBlock::Limits(set) = &joint.blocks()[1] else {
            panic!("expected a limit block");
        };
        assert_eq!(set.rows.len(), 2);
        assert_eq!(set.rows[0].selector.row(), [0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(set.rows[0].offset, -0.5);
        assert_eq!(set.rows[1].selector.row(), [0.0, 0.0, 0.0, 0.0, 0.0, -1.0]);
        assert_eq!(set.rows[1].offset, -1.0);
    }

    #[test]
    fn test_single_dof_limit_needs_one_free_dof() {
        let archetype = JointArchetype::BallAndSocket;
        let mut joint = Joint::new(
            "shoulder".to_string(),
            archetype,
            vec![Anchor::Body(BodyId::new(0))],
            0.0,
            ConstraintBlock::MaskedEquality(MaskedEquality {
                mask: archetype.mask().unwrap(),
                compliance: 0.0,
            }),
        );

        let err = joint.add_limit(Some(0.0), Some(1.0), 0.0).unwrap_err();
        assert!(matches!(
            err,
            ArmatureError::MismatchedDofCount {
                expected: 1,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_spring_lands_on_free_dof() {
        let mut joint = hinge();
        joint.add_spring(&[10.0]).unwrap();

        let ConstraintBlock::DiagonalSpring(spring) = &joint.blocks()[1] else {
            panic!("expected a spring block");
        };
        assert_eq!(spring.compliance[5], 0.1);
        // Constrained coordinates stay inert.
        assert_eq!(spring.compliance[0], f64::INFINITY);
    }

    #[test]
    fn test_duplicate_controller_rejected() {
        let mut joint = hinge();
        joint.add_velocity_controller(&[1.0], 0.0).unwrap();
        let err = joint.add_velocity_controller(&[2.0], 0.0).unwrap_err();
        assert!(matches!(err, ArmatureError::DuplicateController { .. }));
    }

    #[test]
    fn test_different_purposes_coexist() {
        let mut joint = hinge();
        joint.add_position_controller(None, 0.0).unwrap();
        joint.add_velocity_controller(&[0.5], 0.0).unwrap();
        joint.add_force_controller(&[2.0]).unwrap();
        joint.add_resistance(0.1).unwrap();
        assert_eq!(joint.blocks().len(), 5);
    }

    #[test]
    fn test_position_targets_default_to_current() {
        let mut joint = hinge();
        joint.add_position_controller(None, 0.0).unwrap();

        let ConstraintBlock::PositionServo(servo) = &joint.blocks()[1] else {
            panic!("expected a position servo");
        };
        assert_eq!(servo.dofs, vec![Dof::Rz]);
        assert_eq!(servo.targets, vec![0.0]);
    }

    #[test]
    fn test_velocity_live_update_through_joint() {
        let mut joint = hinge();
        joint.add_velocity_controller(&[0.0], 0.0).unwrap();
        joint
            .velocity_controller_mut()
            .unwrap()
            .set_targets(&[3.0])
            .unwrap();

        let ConstraintBlock::VelocityServo(servo) = &joint.blocks()[1] else {
            panic!("expected a velocity servo");
        };
        assert_eq!(servo.targets, vec![3.0]);
    }

    #[test]
    fn test_resistance_shape() {
        let mut joint = hinge();
        joint.add_resistance(0.25).unwrap();

        let ConstraintBlock::Resistance(resistance) = &joint.blocks()[1] else {
            panic!("expected a resistance block");
        };
        assert_eq!(resistance.dofs, vec![Dof::Rz]);
        assert_eq!(resistance.threshold, 0.25);
    }

    #[test]
    fn test_ball_and_socket_axis_servo() {
        let archetype = JointArchetype::BallAndSocket;
        let mut joint = Joint::new(
            "shoulder".to_string(),
            archetype,
            vec![Anchor::Body(BodyId::new(0))],
            0.0,
            ConstraintBlock::MaskedEquality(MaskedEquality {
                mask: archetype.mask().unwrap(),
                compliance: 0.0,
            }),
        );
        joint
            .add_position_controller_about(Axis::Y, 0.7, 0.0)
            .unwrap();

        let ConstraintBlock::PositionServo(servo) = &joint.blocks()[1] else {
            panic!("expected a position servo");
        };
        assert_eq!(servo.dofs, vec![Dof::Ry]);
        assert_eq!(servo.targets, vec![0.7]);
    }

    #[test]
    fn test_paired_limits_order_matches_free_dofs() {
        let archetype = JointArchetype::Cylindrical(Axis::Y);
        let mut joint = Joint::new(
            "piston".to_string(),
            archetype,
            vec![Anchor::Body(BodyId::new(0))],
            0.0,
            ConstraintBlock::MaskedEquality(MaskedEquality {
                mask: archetype.mask().unwrap(),
                compliance: 0.0,
            }),
        );
        joint
            .add_limits(
                &[BoundPair::both(-0.1, 0.1), BoundPair::both(-1.0, 1.0)],
                0.0,
            )
            .unwrap();

        let ConstraintBlock::Limits(set) = &joint.blocks()[1] else {
            panic!("expected a limit block");
        };
        // Translation rows first (ty), then rotation (ry).
        assert_eq!(set.rows[0].selector.dof, Dof::Ty);
        assert_eq!(set.rows[0].selector.sign, Sign::Positive);
        assert_eq!(set.rows[2].selector.dof, Dof::Ry);
        assert_eq!(set.rows[3].offset, -1.0);
    }
}
