//! Error types for linkage construction.

use thiserror::Error;

use crate::Dof;

/// Errors that can occur while building bodies, joints, or scene output.
///
/// All construction failures are raised synchronously at the point of
/// construction; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArmatureError {
    /// A supplied rotation quaternion has near-zero norm.
    #[error("degenerate rotation: quaternion norm {norm:.3e} is too close to zero")]
    DegenerateRotation {
        /// Norm of the rejected quaternion.
        norm: f64,
    },

    /// A joint was requested with no resolvable endpoints.
    #[error("joint '{joint_name}' has no endpoints")]
    EmptyJoint {
        /// Name of the joint that could not be built.
        joint_name: String,
    },

    /// A bounds/targets list does not match the free-dof count.
    #[error("{context}: expected {expected} values, got {actual}")]
    MismatchedDofCount {
        /// Number of values required by the free-dof subspace.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
        /// What was being built.
        context: String,
    },

    /// A half-specified bound pair reached the paired-bounds limit builder.
    #[error("one-sided limit on {dof} is not supported by the paired-bounds builder")]
    UnsupportedOneSidedLimit {
        /// The dof with only one bound present.
        dof: Dof,
    },

    /// The geometry-to-inertia service failed for a mesh.
    #[error("rigid-body derivation failed for '{path}': {message}")]
    MeshDerivation {
        /// Mesh path or source description.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// A referenced body or offset does not exist.
    #[error("missing endpoint '{name}' in {context}")]
    MissingEndpoint {
        /// The endpoint that could not be resolved.
        name: String,
        /// Where it was referenced.
        context: String,
    },

    /// A joint already hosts a controller of this purpose.
    #[error("joint '{joint_name}' already has a {purpose} controller")]
    DuplicateController {
        /// The joint being extended.
        joint_name: String,
        /// The controller purpose that is already occupied.
        purpose: String,
    },

    /// A rigid-descriptor file could not be parsed.
    #[error("failed to parse rigid file '{path}': {message}")]
    RigidFileParse {
        /// The file path.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// Relative-path computation between two unrelated scene nodes.
    #[error("no path between scene nodes '{from}' and '{to}'")]
    DisconnectedNodes {
        /// Start node name.
        from: String,
        /// Target node name.
        to: String,
    },

    /// A scene object could not be created by the scene-graph builder.
    #[error("failed to create scene object '{type_name}': {message}")]
    ObjectCreation {
        /// The requested component type.
        type_name: String,
        /// What went wrong.
        message: String,
    },
}

impl ArmatureError {
    /// Create an empty-joint error.
    #[must_use]
    pub fn empty_joint(joint_name: impl Into<String>) -> Self {
        Self::EmptyJoint {
            joint_name: joint_name.into(),
        }
    }

    /// Create a mismatched dof-count error.
    #[must_use]
    pub fn mismatched_dofs(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::MismatchedDofCount {
            expected,
            actual,
            context: context.into(),
        }
    }

    /// Create a mesh-derivation error.
    #[must_use]
    pub fn mesh_derivation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MeshDerivation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a missing-endpoint error.
    #[must_use]
    pub fn missing_endpoint(name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingEndpoint {
            name: name.into(),
            context: context.into(),
        }
    }

    /// Create a duplicate-controller error.
    #[must_use]
    pub fn duplicate_controller(joint_name: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self::DuplicateController {
            joint_name: joint_name.into(),
            purpose: purpose.into(),
        }
    }

    /// Create a rigid-file parse error.
    #[must_use]
    pub fn rigid_file(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RigidFileParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a disconnected-nodes error.
    #[must_use]
    pub fn disconnected(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::DisconnectedNodes {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create an object-creation error.
    #[must_use]
    pub fn object_creation(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ObjectCreation {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}
