//! Joint construction for articulated rigid-body linkages.
//!
//! This crate turns a declarative description of a linkage (rigid bodies,
//! named attachment offsets, and a catalog of joint archetypes) into the
//! reduced-coordinate constraint structure a compliance-based solver
//! consumes:
//!
//! - [`RigidBody`] - Mass, inertia, placement, and attachment offsets
//! - [`JointArchetype`] - The nine joint archetypes and their dof masks
//! - [`Joint`] - A built joint: limits, springs, dampers, controllers
//! - [`ConstraintBlock`] - The solver-facing constraint vocabulary
//! - [`Linkage`] - Registry tying bodies and joints together by ID
//! - [`InertiaSource`] - Collaborator contract for geometry-derived mass
//!   properties
//!
//! Construction is single-threaded and synchronous: a body must exist
//! before its offsets, a joint's endpoints before the joint, and limits or
//! controllers reference an already-built joint. All failures are raised
//! immediately; nothing is retried, and a failed build registers nothing.
//!
//! What happens to the constraints afterwards (assembly, solving,
//! stabilization passes) is the solver's business; this crate only fixes
//! their shape.
//!
//! # Example
//!
//! ```
//! use armature_core::{Anchor, JointArchetype, Linkage, RigidBody};
//! use armature_types::{Axis, Frame, Vector3};
//!
//! let mut linkage = Linkage::new();
//! let base = linkage.add_body(RigidBody::manual(
//!     "base",
//!     Frame::identity(),
//!     2.0,
//!     Vector3::new(1.0, 2.0, 3.0),
//! ));
//! let arm = linkage.add_body(RigidBody::manual(
//!     "arm",
//!     Frame::from_translation(Vector3::new(0.0, 0.0, 1.0)),
//!     1.0,
//!     Vector3::new(1.0, 1.0, 1.0),
//! ));
//!
//! let elbow = linkage
//!     .add_joint("elbow", JointArchetype::Hinge(Axis::Z), &[
//!         Anchor::Body(base),
//!         Anchor::Body(arm),
//!     ])
//!     .unwrap();
//!
//! let joint = linkage.joint_mut(elbow).unwrap();
//! joint.add_limit(Some(-0.5), Some(1.0), 0.0).unwrap();
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for builder code
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to nalgebra
    clippy::missing_errors_doc,    // Error docs added where non-obvious
)]

mod archetype;
mod body;
mod constraint;
mod controller;
mod inertia;
mod joint;
mod limit;
mod linkage;

pub use archetype::JointArchetype;
pub use body::{BodyOffset, MeshAttachment, RigidBody, Wrench};
pub use constraint::{
    ConstraintBlock, Damper, DamperCoefficients, DiagonalSpring, DistanceEquality, LimitSet,
    MaskedEquality, UnilateralRow, DEFAULT_COMPLIANCE,
};
pub use controller::{ControllerPurpose, Forcing, PositionServo, Resistance, VelocityServo};
pub use inertia::{parse_rigid_file, InertiaSource};
pub use joint::{Anchor, Joint};
pub use limit::{paired_limits, single_dof_limit, BoundPair};
pub use linkage::Linkage;
