//! Rigid-body descriptors and attachment offsets.
//!
//! A [`RigidBody`] owns its placement frame, its center-of-mass frame, its
//! mass properties, and the named [`BodyOffset`]s joints attach to. The
//! body's stored frame is the placement composed with the center-of-mass
//! frame, so the mass object always sits at the center of mass with
//! principal-axis alignment; offsets compensate by removing the
//! center-of-mass transform when they are created.

use std::path::Path;

use nalgebra::Vector3;

use armature_types::{Frame, Result, RigidInfo};

use crate::inertia::{parse_rigid_file, InertiaSource};

/// A constant generalized force (force + torque) attached to a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wrench {
    /// Linear force.
    pub force: Vector3<f64>,
    /// Torque.
    pub torque: Vector3<f64>,
}

impl Wrench {
    /// Create a wrench from force and torque.
    #[must_use]
    pub const fn new(force: Vector3<f64>, torque: Vector3<f64>) -> Self {
        Self { force, torque }
    }

    /// The zero wrench.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            force: Vector3::zeros(),
            torque: Vector3::zeros(),
        }
    }

    /// The 6-element array `[fx, fy, fz, tx, ty, tz]`.
    #[must_use]
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.force.x,
            self.force.y,
            self.force.z,
            self.torque.x,
            self.torque.y,
            self.torque.z,
        ]
    }
}

/// A named auxiliary frame rigidly attached to a body.
///
/// Offsets are the attachment points joints connect to. The stored frame
/// is relative to the body's center-of-mass frame; the originally
/// requested target pose is recovered by composing through the body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyOffset {
    name: String,
    local: Frame,
    motors: Vec<Wrench>,
}

impl BodyOffset {
    fn new(name: impl Into<String>, local: Frame) -> Self {
        Self {
            name: name.into(),
            local,
            motors: Vec::new(),
        }
    }

    /// Offset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored frame, relative to the body's center-of-mass frame.
    #[must_use]
    pub const fn local(&self) -> &Frame {
        &self.local
    }

    /// Attach a constant wrench at this offset.
    pub fn add_motor(&mut self, wrench: Wrench) {
        self.motors.push(wrench);
    }

    /// Wrenches attached at this offset.
    #[must_use]
    pub fn motors(&self) -> &[Wrench] {
        &self.motors
    }
}

/// A mesh attached to a body for visualization or collision.
///
/// Loading and shape setup happen in external pipelines; the descriptor
/// only records what to emit. The stored offset has the body's
/// center-of-mass translation removed, like [`BodyOffset`].
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAttachment {
    /// Path of the mesh file.
    pub mesh_path: String,
    /// Anisotropic scale.
    pub scale: Vector3<f64>,
    /// Attachment frame relative to the body's center-of-mass frame.
    pub offset: Frame,
}

/// Description of one rigid body in a linkage.
///
/// Three mutually exclusive construction policies:
///
/// 1. [`from_mesh`](Self::from_mesh) - mass, inertia, and center of mass
///    derived from geometry at a given density.
/// 2. [`from_mesh_with_mass`](Self::from_mesh_with_mass) - geometric
///    derivation at unit density, rescaled to a target mass.
/// 3. [`manual`](Self::manual) - caller-supplied mass and inertia.
///
/// [`new`](Self::new) is the permissive prototyping fallback: unit mass,
/// unit inertia, identity placement.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    name: String,
    frame: Frame,
    framecom: Frame,
    mass: f64,
    inertia: Vector3<f64>,
    inertia_forces: bool,
    offsets: Vec<BodyOffset>,
    motors: Vec<Wrench>,
    visuals: Vec<MeshAttachment>,
    collisions: Vec<MeshAttachment>,
}

impl RigidBody {
    /// Create a body with permissive defaults: mass 1, inertia `[1, 1, 1]`,
    /// identity placement.
    ///
    /// This is the one non-fatal fallback in body construction, meant for
    /// rapid prototyping; every other missing-data situation is an error.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let body = Self::bare(name);
        tracing::debug!("body '{}' using default unit mass and inertia", body.name);
        body
    }

    fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frame: Frame::identity(),
            framecom: Frame::identity(),
            mass: 1.0,
            inertia: Vector3::new(1.0, 1.0, 1.0),
            inertia_forces: false,
            offsets: Vec::new(),
            motors: Vec::new(),
            visuals: Vec::new(),
            collisions: Vec::new(),
        }
    }

    /// Create a body from caller-supplied mass and diagonal inertia.
    ///
    /// No geometric derivation; the center-of-mass frame is identity,
    /// coincident with the placement.
    #[must_use]
    pub fn manual(
        name: impl Into<String>,
        placement: Frame,
        mass: f64,
        inertia: Vector3<f64>,
    ) -> Self {
        let mut body = Self::bare(name);
        body.frame = placement;
        body.mass = mass;
        body.inertia = inertia;
        body
    }

    /// Create a body from derived rigid info and a placement.
    ///
    /// The center-of-mass frame comes from the info; the body frame is the
    /// placement composed with it.
    pub fn from_rigid_info(
        name: impl Into<String>,
        info: &RigidInfo,
        placement: &Frame,
    ) -> Result<Self> {
        info.validate()?;
        let mut body = Self::bare(name);
        body.framecom = info.com_frame();
        body.frame = placement.compose(&body.framecom);
        body.mass = info.mass;
        body.inertia = info.diagonal_inertia;
        Ok(body)
    }

    /// Create a body from a mesh at the given density.
    ///
    /// Mass, inertia, and center of mass come from the geometry-to-inertia
    /// service; a failing derivation aborts construction.
    pub fn from_mesh(
        name: impl Into<String>,
        source: &dyn InertiaSource,
        mesh_path: &Path,
        density: f64,
        placement: &Frame,
        scale: Vector3<f64>,
    ) -> Result<Self> {
        let info = source.rigid_info(mesh_path, density, scale)?;
        Self::from_rigid_info(name, &info, placement)
    }

    /// Create a body from a mesh with a target total mass.
    ///
    /// The geometry is derived at unit density, then mass and inertia are
    /// rescaled together so inertia ratios are preserved.
    pub fn from_mesh_with_mass(
        name: impl Into<String>,
        source: &dyn InertiaSource,
        mesh_path: &Path,
        target_mass: f64,
        placement: &Frame,
        scale: Vector3<f64>,
    ) -> Result<Self> {
        let raw = source.rigid_info(mesh_path, 1.0, scale)?;
        raw.validate()?;
        Self::from_rigid_info(name, &raw.rescaled_to_mass(target_mass), placement)
    }

    /// Create a body from a rigid-descriptor file's contents.
    pub fn from_rigid_file(
        name: impl Into<String>,
        path: &str,
        contents: &str,
        placement: &Frame,
    ) -> Result<Self> {
        let info = parse_rigid_file(path, contents)?;
        Self::from_rigid_info(name, &info, placement)
    }

    /// Enable or disable explicit gyroscopic force computation on the
    /// emitted mass.
    #[must_use]
    pub fn with_inertia_forces(mut self, enabled: bool) -> Self {
        self.inertia_forces = enabled;
        self
    }

    /// Body name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The body's frame: placement composed with the center-of-mass frame.
    #[must_use]
    pub const fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The center-of-mass frame (identity for manually-built bodies).
    #[must_use]
    pub const fn com_frame(&self) -> &Frame {
        &self.framecom
    }

    /// Total mass.
    #[must_use]
    pub const fn mass(&self) -> f64 {
        self.mass
    }

    /// Principal diagonal inertia.
    #[must_use]
    pub const fn inertia(&self) -> Vector3<f64> {
        self.inertia
    }

    /// Whether gyroscopic forces are computed for this body.
    #[must_use]
    pub const fn inertia_forces(&self) -> bool {
        self.inertia_forces
    }

    /// Add an attachment offset from a target frame relative to the body's
    /// placement.
    ///
    /// The stored frame removes the center-of-mass transform, so composing
    /// the body frame with it reproduces the requested target exactly.
    /// Returns the offset's index within this body.
    pub fn add_offset(&mut self, name: impl Into<String>, target: &Frame) -> usize {
        let local = self.framecom.inverse().compose(target);
        self.offsets.push(BodyOffset::new(name, local));
        self.offsets.len() - 1
    }

    /// Add an attachment offset from a target frame in absolute
    /// coordinates.
    pub fn add_absolute_offset(&mut self, name: impl Into<String>, target: &Frame) -> usize {
        let local = self.frame.inverse().compose(target);
        self.offsets.push(BodyOffset::new(name, local));
        self.offsets.len() - 1
    }

    /// Offset by index.
    #[must_use]
    pub fn offset(&self, index: usize) -> Option<&BodyOffset> {
        self.offsets.get(index)
    }

    /// Mutable offset by index.
    pub fn offset_mut(&mut self, index: usize) -> Option<&mut BodyOffset> {
        self.offsets.get_mut(index)
    }

    /// All offsets, in creation order.
    #[must_use]
    pub fn offsets(&self) -> &[BodyOffset] {
        &self.offsets
    }

    /// World pose of an offset under the body's current frame.
    #[must_use]
    pub fn offset_world_pose(&self, index: usize) -> Option<Frame> {
        self.offsets
            .get(index)
            .map(|offset| self.frame.compose(&offset.local))
    }

    /// Attach a constant wrench at the body frame.
    pub fn add_motor(&mut self, wrench: Wrench) {
        self.motors.push(wrench);
    }

    /// Wrenches attached at the body frame.
    #[must_use]
    pub fn motors(&self) -> &[Wrench] {
        &self.motors
    }

    /// Attach a visual mesh with a placement relative to the body.
    ///
    /// The center-of-mass translation is removed from the stored offset,
    /// as for [`add_offset`](Self::add_offset).
    pub fn add_visual(&mut self, mesh_path: impl Into<String>, scale: Vector3<f64>, offset: &Frame) {
        self.visuals.push(MeshAttachment {
            mesh_path: mesh_path.into(),
            scale,
            offset: self.framecom.inverse().compose(offset),
        });
    }

    /// Attach a collision mesh with a placement relative to the body.
    pub fn add_collision(
        &mut self,
        mesh_path: impl Into<String>,
        scale: Vector3<f64>,
        offset: &Frame,
    ) {
        self.collisions.push(MeshAttachment {
            mesh_path: mesh_path.into(),
            scale,
            offset: self.framecom.inverse().compose(offset),
        });
    }

    /// Visual mesh attachments.
    #[must_use]
    pub fn visuals(&self) -> &[MeshAttachment] {
        &self.visuals
    }

    /// Collision mesh attachments.
    #[must_use]
    pub fn collisions(&self) -> &[MeshAttachment] {
        &self.collisions
    }
}
