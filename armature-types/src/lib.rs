//! Core types for articulated linkage construction.
//!
//! This crate provides the foundational vocabulary for describing an
//! articulated rigid-body linkage before it is compiled into solver
//! constraints:
//!
//! - [`Frame`] - Rigid transform (rotation + translation) with composition
//!   and inversion
//! - [`Dof`], [`DofState`], [`DofMask`] - The six relative degrees of
//!   freedom between two frames and their constrained/free partition
//! - [`LimitSelector`] - Signed single-dof selection used by limit and
//!   controller wiring
//! - [`RigidInfo`] - Mass, center of mass, and principal inertia as
//!   returned by a geometry-to-inertia service
//! - [`ArmatureError`] - Shared error type for construction failures
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They carry no scene-graph handles, no
//! solver state, and no I/O. They're the common language between:
//!
//! - Linkage construction (armature-core)
//! - Scene emission (armature-scene)
//! - External inertia tooling and solvers
//!
//! # Conventions
//!
//! Frames transform local coordinates into parent coordinates, rotations
//! are active unit quaternions, and the six relative degrees of freedom
//! are ordered `[tx, ty, tz, rx, ry, rz]`. Right-handed throughout.
//!
//! # Example
//!
//! ```
//! use armature_types::Frame;
//! use nalgebra::{UnitQuaternion, Vector3};
//!
//! let a = Frame::from_translation(Vector3::new(1.0, 0.0, 0.0));
//! let b = Frame::from_rotation(UnitQuaternion::from_euler_angles(0.0, 0.0, 0.3));
//!
//! let ab = a.compose(&b);
//! let round_trip = ab.compose(&ab.inverse());
//! assert!(round_trip.translation.norm() < 1e-10);
//! ```

#![doc(html_root_url = "https://docs.rs/armature-types/0.4.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for type definitions
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to nalgebra
    clippy::missing_errors_doc,    // Error docs added where non-obvious
)]

mod dof;
mod error;
mod frame;
mod ids;
mod mass;

pub use dof::{Axis, Dof, DofMask, DofState, LimitSelector, Sign};
pub use error::ArmatureError;
pub use frame::Frame;
pub use ids::{BodyId, JointId, OffsetId};
pub use mass::RigidInfo;

// Re-export math types for convenience
pub use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// Result type for linkage construction operations.
pub type Result<T> = std::result::Result<T, ArmatureError>;
