//! End-to-end construction and emission tests.
//!
//! Builds small mechanisms through the full stack (bodies, offsets,
//! joints, limits, controllers) and checks the scene calls an engine
//! would receive.

#![allow(clippy::unwrap_used)]

use armature_core::{Anchor, BoundPair, JointArchetype, Linkage, RigidBody};
use armature_scene::{
    NodeId, ParamValue, RecordingScene, SceneCompiler, SceneMap, SceneSink,
};
use armature_types::{ArmatureError, Axis, Frame, Result, UnitQuaternion, Vector3};

fn unit_inertia() -> Vector3<f64> {
    Vector3::new(1.0, 1.0, 1.0)
}

/// Base with a socket offset, arm body, hinge about Z through the socket.
fn arm_linkage() -> (Linkage, armature_types::JointId) {
    let mut linkage = Linkage::new();
    let base = linkage.add_body(RigidBody::manual(
        "base",
        Frame::identity(),
        2.0,
        Vector3::new(1.0, 2.0, 3.0),
    ));
    let arm = linkage.add_body(RigidBody::manual(
        "arm",
        Frame::from_translation(Vector3::new(0.0, 0.0, 1.0)),
        1.0,
        unit_inertia(),
    ));
    let socket = linkage
        .add_offset(
            base,
            "socket",
            &Frame::from_translation(Vector3::new(0.0, 0.0, 1.0)),
        )
        .unwrap();

    let elbow = linkage
        .add_joint(
            "elbow",
            JointArchetype::Hinge(Axis::Z),
            &[Anchor::Offset(socket), Anchor::Body(arm)],
        )
        .unwrap();
    (linkage, elbow)
}

fn compile(linkage: &Linkage) -> (RecordingScene, SceneMap) {
    let mut scene = RecordingScene::new();
    let map = SceneCompiler::new(&mut scene).compile(linkage).unwrap();
    (scene, map)
}

#[test]
fn hinge_arm_emits_expected_tree() {
    let (mut linkage, elbow) = arm_linkage();
    linkage
        .joint_mut(elbow)
        .unwrap()
        .add_limits(&[BoundPair::both(-0.5, 1.0)], 0.0)
        .unwrap();

    let (scene, map) = compile(&linkage);
    let root = scene.root();

    // Bodies at the root, with dofs and mass.
    let base = scene.find_child(root, "base").unwrap();
    let mass = scene.object_of_type(base, "RigidMass").unwrap();
    assert_eq!(mass.params.get("mass"), Some(&ParamValue::Scalar(2.0)));
    assert_eq!(
        mass.params.get("inertia"),
        Some(&ParamValue::Scalars(vec![1.0, 2.0, 3.0]))
    );

    // The joint node hangs under the socket offset and is attached to the
    // arm as a second parent.
    let socket = scene.find_child(base, "socket").unwrap();
    let joint_node = scene.find_child(socket, "elbow").unwrap();
    assert_eq!(map.joint_nodes.values().next(), Some(&joint_node));
    let arm = scene.find_child(root, "arm").unwrap();
    assert_eq!(scene.node(joint_node).unwrap().extra_parents, vec![arm]);

    // The multimapping wires both endpoints through relative paths.
    let mapping = scene
        .object_of_type(joint_node, "RigidJointMultiMapping")
        .unwrap();
    assert_eq!(
        mapping.params.get("input"),
        Some(&ParamValue::Links(vec![
            "@../dofs".to_string(),
            "@../../../arm/dofs".to_string(),
        ]))
    );

    // Rigid part: hinge mask, compliant, stabilized.
    let constraint = scene.find_child(joint_node, "constraint").unwrap();
    let mask = scene.object_of_type(constraint, "MaskMapping").unwrap();
    assert_eq!(
        mask.params.get("dofs"),
        Some(&ParamValue::Scalars(vec![1.0, 1.0, 1.0, 1.0, 1.0, 0.0]))
    );
    assert!(scene.object_of_type(constraint, "Stabilization").is_some());
    assert!(scene.object_of_type(constraint, "UniformCompliance").is_some());

    // Limits: two signed rows, unilateral, no stabilization.
    let limits = scene.find_child(joint_node, "limits").unwrap();
    let projection = scene.object_of_type(limits, "ProjectionMapping").unwrap();
    assert_eq!(
        projection.params.get("set"),
        Some(&ParamValue::Scalars(vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, //
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0,
        ]))
    );
    assert_eq!(
        projection.params.get("offset"),
        Some(&ParamValue::Scalars(vec![-0.5, -1.0]))
    );
    assert!(scene.object_of_type(limits, "UnilateralConstraint").is_some());
    assert!(scene.object_of_type(limits, "Stabilization").is_none());
}

#[test]
fn offset_world_pose_round_trips_through_mesh_derived_body() {
    let mut linkage = Linkage::new();
    let placement = Frame::from_parts(
        Vector3::new(0.3, -0.2, 1.5),
        UnitQuaternion::from_euler_angles(0.2, -0.1, 0.4),
    );
    let contents = "\
Xsp 3.0
mass 1.5
inrt 1.0 0.2 0.0 0.2 2.0 0.0 0.0 0.0 3.0
cntr 0.05 0.0 -0.1
";
    let body =
        RigidBody::from_rigid_file("pendulum", "pendulum.rigid", contents, &placement).unwrap();
    let id = linkage.add_body(body);

    let target = Frame::from_parts(
        Vector3::new(0.0, 0.4, 0.0),
        UnitQuaternion::from_euler_angles(0.0, 0.0, 0.9),
    );
    let offset = linkage.add_offset(id, "tip", &target).unwrap();

    let world = linkage.offset_world_pose(offset).unwrap();
    let expected = placement.compose(&target);
    assert!((world.translation - expected.translation).norm() < 1e-9);
    assert!(world.rotation.angle_to(&expected.rotation) < 1e-9);
}

#[test]
fn empty_joint_creates_no_scene_node() {
    let (mut linkage, _) = arm_linkage();
    let before_joints = linkage.joint_count();

    let err = linkage
        .add_joint("ghost", JointArchetype::Fixed, &[])
        .unwrap_err();
    assert!(matches!(err, ArmatureError::EmptyJoint { .. }));
    assert_eq!(linkage.joint_count(), before_joints);

    // Compiling the untouched linkage emits only the real joint.
    let (scene, map) = compile(&linkage);
    assert_eq!(map.joint_nodes.len(), 1);
    assert!(scene.find_child(scene.root(), "ghost").is_none());
}

#[test]
fn velocity_controller_round_trip() {
    let (mut linkage, elbow) = arm_linkage();
    let joint = linkage.joint_mut(elbow).unwrap();
    joint.add_velocity_controller(&[0.0], 0.0).unwrap();
    joint
        .velocity_controller_mut()
        .unwrap()
        .set_targets(&[2.5])
        .unwrap();

    let (scene, map) = compile(&linkage);
    let joint_node = map.joint_nodes.values().next().copied().unwrap();
    let controller = scene.find_child(joint_node, "controller").unwrap();
    let value = scene
        .object_of_type(controller, "VelocityConstraintValue")
        .unwrap();
    assert_eq!(
        value.params.get("velocities"),
        Some(&ParamValue::Scalars(vec![2.5]))
    );
    let compliance = scene
        .object_of_type(controller, "UniformCompliance")
        .unwrap();
    assert_eq!(
        compliance.params.get("isCompliance"),
        Some(&ParamValue::Bool(true))
    );
}

#[test]
fn ball_and_socket_axis_servo_selects_one_rotation() {
    let mut linkage = Linkage::new();
    let a = linkage.add_body(RigidBody::manual("a", Frame::identity(), 1.0, unit_inertia()));
    let b = linkage.add_body(RigidBody::manual("b", Frame::identity(), 1.0, unit_inertia()));
    let shoulder = linkage
        .add_joint(
            "shoulder",
            JointArchetype::BallAndSocket,
            &[Anchor::Body(a), Anchor::Body(b)],
        )
        .unwrap();
    linkage
        .joint_mut(shoulder)
        .unwrap()
        .add_position_controller_about(Axis::Y, 0.6, 0.0)
        .unwrap();

    let (scene, map) = compile(&linkage);
    let joint_node = map.joint_nodes[&shoulder];
    let mask_node = scene.find_child(joint_node, "controller-mask").unwrap();
    let mask = scene.object_of_type(mask_node, "MaskMapping").unwrap();
    assert_eq!(
        mask.params.get("dofs"),
        Some(&ParamValue::Scalars(vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0]))
    );

    let target_node = scene.find_child(mask_node, "controller-target").unwrap();
    let difference = scene
        .object_of_type(target_node, "DifferenceFromTargetMapping")
        .unwrap();
    assert_eq!(
        difference.params.get("targets"),
        Some(&ParamValue::Scalars(vec![0.6]))
    );
    assert!(scene.object_of_type(target_node, "Stabilization").is_some());
}

#[test]
fn distance_joint_emits_edge_constraint() {
    let mut linkage = Linkage::new();
    let a = linkage.add_body(RigidBody::manual("a", Frame::identity(), 1.0, unit_inertia()));
    let b = linkage.add_body(RigidBody::manual(
        "b",
        Frame::from_translation(Vector3::new(3.0, 0.0, 0.0)),
        1.0,
        unit_inertia(),
    ));
    let tether = linkage
        .add_joint(
            "tether",
            JointArchetype::Distance { rest_length: None },
            &[Anchor::Body(a), Anchor::Body(b)],
        )
        .unwrap();

    let (scene, map) = compile(&linkage);
    let joint_node = map.joint_nodes[&tether];

    // Endpoints subset-mapped as rigid frames, not reduced to 6 coords.
    let subset = scene
        .object_of_type(joint_node, "SubsetMultiMapping")
        .unwrap();
    assert_eq!(
        subset.params.get("indexPairs"),
        Some(&ParamValue::Text("0 0 1 0".to_string()))
    );
    assert!(scene
        .object_of_type(joint_node, "RigidJointMultiMapping")
        .is_none());

    let constraint = scene.find_child(joint_node, "constraint").unwrap();
    let mapping = scene.object_of_type(constraint, "DistanceMapping").unwrap();
    // Rest length resolved to the initial separation.
    assert_eq!(
        mapping.params.get("restLength"),
        Some(&ParamValue::Scalar(3.0))
    );
    assert!(scene
        .object_of_type(constraint, "EdgeSetTopologyContainer")
        .is_some());
}

/// Sink that fails on one component type, for rollback tests.
struct FailingScene {
    inner: RecordingScene,
    poison: &'static str,
}

impl SceneSink for FailingScene {
    fn root(&self) -> NodeId {
        self.inner.root()
    }

    fn create_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.inner.create_child(parent, name)
    }

    fn create_object(
        &mut self,
        node: NodeId,
        type_name: &str,
        params: armature_scene::ParamSet,
    ) -> Result<armature_scene::ObjectId> {
        if type_name == self.poison {
            return Err(ArmatureError::object_creation(type_name, "not registered"));
        }
        self.inner.create_object(node, type_name, params)
    }

    fn attach_child(&mut self, extra_parent: NodeId, node: NodeId) {
        self.inner.attach_child(extra_parent, node);
    }

    fn remove_node(&mut self, node: NodeId) {
        self.inner.remove_node(node);
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.inner.parent_of(node)
    }

    fn name_of(&self, node: NodeId) -> Option<&str> {
        self.inner.name_of(node)
    }
}

#[test]
fn failed_joint_emission_rolls_back_its_subtree() {
    let (mut linkage, elbow) = arm_linkage();
    linkage
        .joint_mut(elbow)
        .unwrap()
        .add_limits(&[BoundPair::both(-0.5, 1.0)], 0.0)
        .unwrap();

    let mut scene = FailingScene {
        inner: RecordingScene::new(),
        poison: "UnilateralConstraint",
    };
    let err = SceneCompiler::new(&mut scene).compile(&linkage).unwrap_err();
    assert!(matches!(err, ArmatureError::ObjectCreation { .. }));

    // Bodies were emitted whole; the half-built joint is gone.
    let root = scene.inner.root();
    let base = scene.inner.find_child(root, "base").unwrap();
    let socket = scene.inner.find_child(base, "socket").unwrap();
    assert!(scene.inner.find_child(socket, "elbow").is_none());
    assert!(scene.inner.find_child(root, "arm").is_some());
}
