//! The linkage registry.
//!
//! A [`Linkage`] owns every body and joint in one articulated mechanism
//! and hands out typed IDs. It enforces the construction order: bodies
//! before offsets, endpoint frames before joints, joints before their
//! limits and controllers. Removing a joint drops everything layered on
//! it, since the joint owns its dependents.

use armature_types::{ArmatureError, BodyId, DofMask, Frame, JointId, OffsetId, Result};

use crate::archetype::JointArchetype;
use crate::body::{BodyOffset, RigidBody};
use crate::constraint::{
    ConstraintBlock, DiagonalSpring, DistanceEquality, MaskedEquality, DEFAULT_COMPLIANCE,
};
use crate::joint::{Anchor, Joint};

/// Registry of bodies, offsets, and joints forming one mechanism.
///
/// Construction is single-threaded and synchronous; every failure is
/// reported immediately and registers nothing.
#[derive(Debug, Default)]
pub struct Linkage {
    bodies: Vec<RigidBody>,
    offsets: Vec<OffsetRecord>,
    joints: Vec<Option<Joint>>,
}

#[derive(Debug)]
struct OffsetRecord {
    body: BodyId,
    index: usize,
}

impl Linkage {
    /// Create an empty linkage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body and take ownership of it.
    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        self.bodies.push(body);
        BodyId::new(self.bodies.len() as u64 - 1)
    }

    /// Body by ID.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.raw() as usize)
    }

    /// Mutable body by ID.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id.raw() as usize)
    }

    /// All bodies with their IDs, in creation order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, body)| (BodyId::new(i as u64), body))
    }

    /// Number of bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Create an attachment offset on a body, target relative to the
    /// body's placement.
    pub fn add_offset(
        &mut self,
        body: BodyId,
        name: impl Into<String>,
        target: &Frame,
    ) -> Result<OffsetId> {
        let record = self.body_for_offset(body, "add_offset")?;
        let index = record.add_offset(name, target);
        self.offsets.push(OffsetRecord { body, index });
        Ok(OffsetId::new(self.offsets.len() as u64 - 1))
    }

    /// Create an attachment offset on a body from an absolute target.
    pub fn add_absolute_offset(
        &mut self,
        body: BodyId,
        name: impl Into<String>,
        target: &Frame,
    ) -> Result<OffsetId> {
        let record = self.body_for_offset(body, "add_absolute_offset")?;
        let index = record.add_absolute_offset(name, target);
        self.offsets.push(OffsetRecord { body, index });
        Ok(OffsetId::new(self.offsets.len() as u64 - 1))
    }

    fn body_for_offset(&mut self, body: BodyId, context: &str) -> Result<&mut RigidBody> {
        let name = body.to_string();
        self.bodies
            .get_mut(body.raw() as usize)
            .ok_or_else(|| ArmatureError::missing_endpoint(name, context))
    }

    /// The body and record behind an offset ID.
    #[must_use]
    pub fn offset(&self, id: OffsetId) -> Option<(BodyId, &BodyOffset)> {
        let record = self.offsets.get(id.raw() as usize)?;
        let body = self.bodies.get(record.body.raw() as usize)?;
        Some((record.body, body.offset(record.index)?))
    }

    /// The owning body and per-body index behind an offset ID.
    #[must_use]
    pub fn offset_record(&self, id: OffsetId) -> Option<(BodyId, usize)> {
        self.offsets
            .get(id.raw() as usize)
            .map(|record| (record.body, record.index))
    }

    /// All registered offsets as `(id, owning body, per-body index)`.
    pub fn offsets(&self) -> impl Iterator<Item = (OffsetId, BodyId, usize)> + '_ {
        self.offsets
            .iter()
            .enumerate()
            .map(|(i, record)| (OffsetId::new(i as u64), record.body, record.index))
    }

    /// World pose of an offset under its body's current frame.
    #[must_use]
    pub fn offset_world_pose(&self, id: OffsetId) -> Option<Frame> {
        let record = self.offsets.get(id.raw() as usize)?;
        self.bodies
            .get(record.body.raw() as usize)?
            .offset_world_pose(record.index)
    }

    /// World pose of a joint anchor.
    pub fn anchor_pose(&self, anchor: &Anchor, context: &str) -> Result<Frame> {
        match anchor {
            Anchor::Body(id) => self
                .body(*id)
                .map(|body| *body.frame())
                .ok_or_else(|| ArmatureError::missing_endpoint(id.to_string(), context)),
            Anchor::Offset(id) => self
                .offset_world_pose(*id)
                .ok_or_else(|| ArmatureError::missing_endpoint(id.to_string(), context)),
        }
    }

    /// Build a joint with the default (stiff near-rigid) compliance.
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        archetype: JointArchetype,
        anchors: &[Anchor],
    ) -> Result<JointId> {
        self.add_joint_with_compliance(name, archetype, anchors, DEFAULT_COMPLIANCE)
    }

    /// Build a joint with explicit compliance on its rigid part.
    ///
    /// Fails with [`ArmatureError::EmptyJoint`] on an empty anchor list
    /// and [`ArmatureError::MissingEndpoint`] on an unresolvable anchor;
    /// nothing is registered on failure.
    pub fn add_joint_with_compliance(
        &mut self,
        name: impl Into<String>,
        archetype: JointArchetype,
        anchors: &[Anchor],
        compliance: f64,
    ) -> Result<JointId> {
        let name = name.into();
        if anchors.is_empty() {
            return Err(ArmatureError::empty_joint(name));
        }

        let context = format!("joint '{name}'");
        let poses: Vec<Frame> = anchors
            .iter()
            .map(|anchor| self.anchor_pose(anchor, &context))
            .collect::<Result<_>>()?;

        let base_block = base_block(&name, &archetype, &poses, compliance)?;
        let joint = Joint::new(name, archetype, anchors.to_vec(), compliance, base_block);
        self.joints.push(Some(joint));
        Ok(JointId::new(self.joints.len() as u64 - 1))
    }

    /// Joint by ID (`None` once removed).
    #[must_use]
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.raw() as usize)?.as_ref()
    }

    /// Mutable joint by ID.
    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(id.raw() as usize)?.as_mut()
    }

    /// All live joints with their IDs, in creation order.
    pub fn joints(&self) -> impl Iterator<Item = (JointId, &Joint)> {
        self.joints
            .iter()
            .enumerate()
            .filter_map(|(i, joint)| Some((JointId::new(i as u64), joint.as_ref()?)))
    }

    /// Number of live joints.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.iter().flatten().count()
    }

    /// Remove a joint, dropping its limits and controllers with it.
    ///
    /// The ID is never reused; later lookups return `None`.
    pub fn remove_joint(&mut self, id: JointId) -> Option<Joint> {
        self.joints.get_mut(id.raw() as usize)?.take()
    }
}

fn base_block(
    name: &str,
    archetype: &JointArchetype,
    poses: &[Frame],
    compliance: f64,
) -> Result<ConstraintBlock> {
    match archetype {
        JointArchetype::Distance { rest_length } => {
            let [first, second, ..] = poses else {
                return Err(ArmatureError::missing_endpoint(
                    "second endpoint",
                    format!("distance joint '{name}'"),
                ));
            };
            let rest_length =
                rest_length.unwrap_or_else(|| (first.translation - second.translation).norm());
            Ok(ConstraintBlock::Distance(DistanceEquality {
                rest_length,
                compliance,
            }))
        }
        JointArchetype::GenericSpring { stiffness } => Ok(ConstraintBlock::DiagonalSpring(
            DiagonalSpring::from_stiffness(stiffness),
        )),
        reduced => {
            // Every remaining archetype carries a mask.
            let mask = reduced.mask().unwrap_or_else(DofMask::all_constrained);
            Ok(ConstraintBlock::MaskedEquality(MaskedEquality {
                mask,
                compliance,
            }))
        }
    }
}
