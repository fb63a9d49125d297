//! Scene-graph emission for compiled linkages.
//!
//! The constraint structure built by `armature-core` still has to be
//! materialized as nodes and components in an external scene-graph engine.
//! This crate fixes that boundary:
//!
//! - [`SceneSink`] - The scene-graph builder contract
//!   (`create_child`/`create_object`), with typed node and object handles
//! - [`relative_path`] - Pure relative-path computation over the node
//!   hierarchy, used to wire joint mappings to endpoint dof components
//! - [`SceneCompiler`] - Dependency-ordered emission of bodies, offsets,
//!   and joints, with atomic-or-nothing node creation
//! - [`RecordingScene`] - In-memory sink recording every issued call, for
//!   tests and dry runs
//!
//! Calls into the sink are applied in issued order; no numbering or
//! threading guarantees are assumed beyond that. The compiler owns the
//! one piece of mutable bookkeeping state this layer needs, the counter
//! generating unique display names for visual attachments, so independent
//! compilations never collide.
//!
//! # Example
//!
//! ```
//! use armature_core::{Anchor, JointArchetype, Linkage, RigidBody};
//! use armature_scene::{RecordingScene, SceneCompiler};
//! use armature_types::{Axis, Frame, Vector3};
//!
//! let mut linkage = Linkage::new();
//! let base = linkage.add_body(RigidBody::manual(
//!     "base", Frame::identity(), 1.0, Vector3::new(1.0, 1.0, 1.0),
//! ));
//! let arm = linkage.add_body(RigidBody::manual(
//!     "arm", Frame::identity(), 1.0, Vector3::new(1.0, 1.0, 1.0),
//! ));
//! linkage
//!     .add_joint("elbow", JointArchetype::Hinge(Axis::Z), &[
//!         Anchor::Body(base),
//!         Anchor::Body(arm),
//!     ])
//!     .unwrap();
//!
//! let mut scene = RecordingScene::new();
//! let map = SceneCompiler::new(&mut scene).compile(&linkage).unwrap();
//! assert_eq!(map.joint_nodes.len(), 1);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for emission code
#![allow(
    clippy::missing_errors_doc,    // Error docs added where non-obvious
)]

mod compile;
mod graph;
mod path;

pub use compile::{CompileConfig, Precision, SceneCompiler, SceneMap};
pub use graph::{
    NodeId, ObjectId, ParamSet, ParamValue, RecordedNode, RecordedObject, RecordingScene,
    SceneSink,
};
pub use path::relative_path;
