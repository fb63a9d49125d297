//! Dependency-ordered scene emission.
//!
//! The compiler walks a [`Linkage`] and issues scene-graph calls in
//! construction order: every body (dofs, mass, offsets, attachments)
//! before any joint, every joint before the constraint blocks layered on
//! it. Emission of one body or joint is atomic: if any component creation
//! fails, the node subtree built so far for it is removed before the
//! error propagates, so no partially-registered node stays reachable by
//! name.

use hashbrown::HashMap;

use armature_core::{
    Anchor, ConstraintBlock, DamperCoefficients, Joint, Linkage, MeshAttachment, RigidBody,
    Wrench,
};
use armature_types::{ArmatureError, BodyId, Dof, Frame, JointId, OffsetId, Result};

use crate::graph::{NodeId, ParamSet, ParamValue, SceneSink};
use crate::path::relative_path;

/// Scalar precision of the emitted component templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Single precision (`Rigid3f`, `Vec6f`, …).
    F32,
    /// Double precision (`Rigid3d`, `Vec6d`, …).
    #[default]
    F64,
}

impl Precision {
    /// Template suffix for this precision.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::F32 => "f",
            Self::F64 => "d",
        }
    }
}

/// Compilation options.
///
/// These replace what used to be ambient module state in scene tooling:
/// the template precision suffix and the geometric-stiffness flag on
/// emitted rigid mappings are explicit per-compiler values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompileConfig {
    /// Emit geometric stiffness on rigid mappings.
    pub geometric_stiffness: bool,
    /// Scalar precision of component templates.
    pub precision: Precision,
}

/// Handles for everything one compilation emitted.
#[derive(Debug, Clone, Default)]
pub struct SceneMap {
    /// Node per body.
    pub body_nodes: HashMap<BodyId, NodeId>,
    /// Node per registered attachment offset.
    pub offset_nodes: HashMap<OffsetId, NodeId>,
    /// Node per joint.
    pub joint_nodes: HashMap<JointId, NodeId>,
}

/// Emits a [`Linkage`] into a [`SceneSink`].
///
/// Owns the monotonically-incrementing counter that names successive
/// visual attachments, so two compilers never collide even within one
/// process.
pub struct SceneCompiler<'a, S: SceneSink> {
    scene: &'a mut S,
    config: CompileConfig,
    visual_index: u64,
}

impl<'a, S: SceneSink> SceneCompiler<'a, S> {
    /// Create a compiler with default options.
    pub fn new(scene: &'a mut S) -> Self {
        Self::with_config(scene, CompileConfig::default())
    }

    /// Create a compiler with explicit options.
    pub fn with_config(scene: &'a mut S, config: CompileConfig) -> Self {
        Self {
            scene,
            config,
            visual_index: 0,
        }
    }

    /// Emit every body and joint of the linkage, in dependency order.
    pub fn compile(&mut self, linkage: &Linkage) -> Result<SceneMap> {
        let mut map = SceneMap::default();
        let mut per_body_offsets: HashMap<BodyId, Vec<NodeId>> = HashMap::new();

        for (id, body) in linkage.bodies() {
            let (node, offsets) = self.emit_body(body)?;
            map.body_nodes.insert(id, node);
            per_body_offsets.insert(id, offsets);
        }

        for (offset_id, body_id, index) in linkage.offsets() {
            let node = per_body_offsets
                .get(&body_id)
                .and_then(|nodes| nodes.get(index))
                .copied()
                .ok_or_else(|| {
                    ArmatureError::missing_endpoint(offset_id.to_string(), "scene emission")
                })?;
            map.offset_nodes.insert(offset_id, node);
        }

        for (id, joint) in linkage.joints() {
            let node = self.emit_joint(joint, &map)?;
            map.joint_nodes.insert(id, node);
        }

        tracing::debug!(
            "emitted {} bodies and {} joints",
            map.body_nodes.len(),
            map.joint_nodes.len()
        );
        Ok(map)
    }

    /// The display name for the next visual attachment.
    fn next_visual_name(&mut self) -> String {
        let name = format!("visual{}", self.visual_index);
        self.visual_index += 1;
        name
    }

    fn rigid_template(&self) -> String {
        format!("Rigid3{}", self.config.precision.suffix())
    }

    fn vec_template(&self, arity: usize) -> String {
        format!("Vec{arity}{}", self.config.precision.suffix())
    }

    fn emit_body(&mut self, body: &RigidBody) -> Result<(NodeId, Vec<NodeId>)> {
        let node = self.scene.create_child(self.scene.root(), body.name());
        match self.emit_body_contents(node, body) {
            Ok(offsets) => Ok((node, offsets)),
            Err(err) => {
                self.scene.remove_node(node);
                Err(err)
            }
        }
    }

    fn emit_body_contents(&mut self, node: NodeId, body: &RigidBody) -> Result<Vec<NodeId>> {
        let rigid = self.rigid_template();
        let inertia = body.inertia();

        self.scene.create_object(
            node,
            "MechanicalObject",
            ParamSet::new()
                .with("template", ParamValue::Text(rigid.clone()))
                .with("name", ParamValue::Text("dofs".to_string()))
                .with(
                    "position",
                    ParamValue::Scalars(body.frame().to_array().to_vec()),
                ),
        )?;
        self.scene.create_object(
            node,
            "RigidMass",
            ParamSet::new()
                .with("name", ParamValue::Text("mass".to_string()))
                .with("mass", ParamValue::Scalar(body.mass()))
                .with(
                    "inertia",
                    ParamValue::Scalars(vec![inertia.x, inertia.y, inertia.z]),
                )
                .with("inertia_forces", ParamValue::Bool(body.inertia_forces())),
        )?;

        for wrench in body.motors() {
            self.emit_motor(node, &rigid, wrench)?;
        }

        let mut offset_nodes = Vec::with_capacity(body.offsets().len());
        for offset in body.offsets() {
            let child = self.scene.create_child(node, offset.name());
            self.scene.create_object(
                child,
                "MechanicalObject",
                ParamSet::new()
                    .with("template", ParamValue::Text(rigid.clone()))
                    .with("name", ParamValue::Text("dofs".to_string()))
                    .with(
                        "position",
                        ParamValue::Scalars(offset.local().to_array().to_vec()),
                    ),
            )?;
            self.emit_rigid_mapping(child, offset.local())?;
            for wrench in offset.motors() {
                self.emit_motor(child, &rigid, wrench)?;
            }
            offset_nodes.push(child);
        }

        for visual in body.visuals() {
            self.emit_visual(node, visual)?;
        }
        for collision in body.collisions() {
            self.emit_collision(node, collision)?;
        }

        Ok(offset_nodes)
    }

    fn emit_motor(&mut self, node: NodeId, template: &str, wrench: &Wrench) -> Result<()> {
        self.scene.create_object(
            node,
            "ConstantForceField",
            ParamSet::new()
                .with("template", ParamValue::Text(template.to_string()))
                .with("name", ParamValue::Text("motor".to_string()))
                .with("points", ParamValue::Text("0".to_string()))
                .with("forces", ParamValue::Scalars(wrench.to_array().to_vec())),
        )?;
        Ok(())
    }

    /// Rigid-to-rigid mapping carrying a constant local frame.
    fn emit_rigid_mapping(&mut self, node: NodeId, local: &Frame) -> Result<()> {
        let mut source = vec![0.0];
        source.extend(local.to_array());
        self.scene.create_object(
            node,
            "AssembledRigidRigidMapping",
            ParamSet::new()
                .with("name", ParamValue::Text("mapping".to_string()))
                .with("source", ParamValue::Scalars(source))
                .with(
                    "geometricStiffness",
                    ParamValue::Bool(self.config.geometric_stiffness),
                ),
        )?;
        Ok(())
    }

    fn emit_loader(&mut self, node: NodeId, attachment: &MeshAttachment) -> Result<()> {
        let coords = attachment.offset.to_array();
        self.scene.create_object(
            node,
            "MeshObjLoader",
            ParamSet::new()
                .with("name", ParamValue::Text("loader".to_string()))
                .with(
                    "filename",
                    ParamValue::Text(attachment.mesh_path.clone()),
                )
                .with(
                    "scale3d",
                    ParamValue::Scalars(vec![
                        attachment.scale.x,
                        attachment.scale.y,
                        attachment.scale.z,
                    ]),
                )
                .with("translation", ParamValue::Scalars(coords[..3].to_vec()))
                .with("orientation", ParamValue::Scalars(coords[3..].to_vec())),
        )?;
        Ok(())
    }

    fn emit_visual(&mut self, parent: NodeId, attachment: &MeshAttachment) -> Result<()> {
        let node = self.scene.create_child(parent, "visual");
        let name = self.next_visual_name();
        let result = (|| -> Result<()> {
            self.emit_loader(node, attachment)?;
            self.scene.create_object(
                node,
                "VisualModel",
                ParamSet::new()
                    .with("name", ParamValue::Text(name))
                    .with("src", ParamValue::Links(vec!["@loader".to_string()])),
            )?;
            self.scene.create_object(
                node,
                "RigidMapping",
                ParamSet::new().with("name", ParamValue::Text("mapping".to_string())),
            )?;
            Ok(())
        })();
        self.rollback_on_error(node, result)
    }

    fn emit_collision(&mut self, parent: NodeId, attachment: &MeshAttachment) -> Result<()> {
        let node = self.scene.create_child(parent, "collision");
        let result = (|| -> Result<()> {
            self.emit_loader(node, attachment)?;
            self.scene.create_object(
                node,
                "MeshTopology",
                ParamSet::new()
                    .with("name", ParamValue::Text("topology".to_string()))
                    .with("src", ParamValue::Links(vec!["@loader".to_string()])),
            )?;
            self.scene.create_object(
                node,
                "MechanicalObject",
                ParamSet::new()
                    .with("template", ParamValue::Text(self.vec_template(3)))
                    .with("name", ParamValue::Text("dofs".to_string())),
            )?;
            self.scene.create_object(
                node,
                "TriangleModel",
                ParamSet::new().with("name", ParamValue::Text("model".to_string())),
            )?;
            self.scene.create_object(
                node,
                "RigidMapping",
                ParamSet::new().with("name", ParamValue::Text("mapping".to_string())),
            )?;
            Ok(())
        })();
        self.rollback_on_error(node, result)
    }

    fn emit_joint(&mut self, joint: &Joint, map: &SceneMap) -> Result<NodeId> {
        let context = format!("joint '{}'", joint.name());
        let endpoints: Vec<NodeId> = joint
            .anchors()
            .iter()
            .map(|anchor| match anchor {
                Anchor::Body(id) => map
                    .body_nodes
                    .get(id)
                    .copied()
                    .ok_or_else(|| ArmatureError::missing_endpoint(id.to_string(), &context)),
                Anchor::Offset(id) => map
                    .offset_nodes
                    .get(id)
                    .copied()
                    .ok_or_else(|| ArmatureError::missing_endpoint(id.to_string(), &context)),
            })
            .collect::<Result<_>>()?;

        let Some((&host, rest)) = endpoints.split_first() else {
            return Err(ArmatureError::empty_joint(joint.name()));
        };

        let node = self.scene.create_child(host, joint.name());
        for &extra in rest {
            self.scene.attach_child(extra, node);
        }

        let result = self.emit_joint_contents(node, joint, &endpoints);
        self.rollback_on_error(node, result)?;
        Ok(node)
    }

    fn emit_joint_contents(
        &mut self,
        node: NodeId,
        joint: &Joint,
        endpoints: &[NodeId],
    ) -> Result<()> {
        let links: Vec<String> = endpoints
            .iter()
            .map(|&endpoint| {
                Ok(format!(
                    "@{}/dofs",
                    relative_path(self.scene, node, endpoint)?
                ))
            })
            .collect::<Result<_>>()?;

        if joint.archetype().is_reduced() {
            self.scene.create_object(
                node,
                "MechanicalObject",
                ParamSet::new()
                    .with("template", ParamValue::Text(self.vec_template(6)))
                    .with("name", ParamValue::Text("dofs".to_string()))
                    .with("position", ParamValue::Scalars(vec![0.0; 6])),
            )?;
            self.scene.create_object(
                node,
                "RigidJointMultiMapping",
                ParamSet::new()
                    .with("name", ParamValue::Text("mapping".to_string()))
                    .with("input", ParamValue::Links(links))
                    .with("output", ParamValue::Links(vec!["@dofs".to_string()]))
                    .with("pairs", ParamValue::Text("0 0".to_string()))
                    .with(
                        "geometricStiffness",
                        ParamValue::Bool(self.config.geometric_stiffness),
                    ),
            )?;
        } else {
            // Distance: endpoints kept as rigid frames; the scalar edge
            // constraint lives in the block below.
            let index_pairs = (0..endpoints.len())
                .map(|i| format!("{i} 0"))
                .collect::<Vec<_>>()
                .join(" ");
            self.scene.create_object(
                node,
                "MechanicalObject",
                ParamSet::new()
                    .with("template", ParamValue::Text(self.rigid_template()))
                    .with("name", ParamValue::Text("dofs".to_string())),
            )?;
            self.scene.create_object(
                node,
                "SubsetMultiMapping",
                ParamSet::new()
                    .with("name", ParamValue::Text("mapping".to_string()))
                    .with("input", ParamValue::Links(links))
                    .with("output", ParamValue::Links(vec!["@dofs".to_string()]))
                    .with("indexPairs", ParamValue::Text(index_pairs)),
            )?;
        }

        for block in joint.blocks() {
            self.emit_block(node, block)?;
        }
        Ok(())
    }

    fn emit_block(&mut self, joint_node: NodeId, block: &ConstraintBlock) -> Result<()> {
        match block {
            ConstraintBlock::MaskedEquality(eq) => {
                let node = self.scene.create_child(joint_node, block.label());
                self.emit_vec1_dofs(node, None)?;
                self.emit_mask_mapping(node, eq.mask.constrained_row())?;
                self.emit_compliance(node, eq.compliance, None)?;
                self.emit_stabilization(node)?;
            }
            ConstraintBlock::DiagonalSpring(spring) => {
                self.scene.create_object(
                    joint_node,
                    "DiagonalCompliance",
                    ParamSet::new()
                        .with(
                            "compliance",
                            ParamValue::Scalars(spring.compliance.to_vec()),
                        )
                        .with("isCompliance", ParamValue::Bool(false)),
                )?;
            }
            ConstraintBlock::Limits(set) => {
                if set.rows.is_empty() {
                    return Ok(());
                }
                let node = self.scene.create_child(joint_node, block.label());
                self.emit_vec1_dofs(node, Some(set.rows.len()))?;

                let mut projection = Vec::with_capacity(7 * set.rows.len());
                let mut offsets = Vec::with_capacity(set.rows.len());
                for row in &set.rows {
                    projection.push(0.0);
                    projection.extend(row.selector.row());
                    offsets.push(row.offset);
                }
                self.scene.create_object(
                    node,
                    "ProjectionMapping",
                    ParamSet::new()
                        .with("name", ParamValue::Text("mapping".to_string()))
                        .with("set", ParamValue::Scalars(projection))
                        .with("offset", ParamValue::Scalars(offsets)),
                )?;
                self.emit_compliance(node, set.compliance, None)?;
                // No stabilization: violated rows must keep their sign
                // until the solver has seen them.
                self.scene
                    .create_object(node, "UnilateralConstraint", ParamSet::new())?;
            }
            ConstraintBlock::Distance(distance) => {
                let node = self.scene.create_child(joint_node, block.label());
                self.emit_vec1_dofs(node, Some(1))?;
                self.scene.create_object(
                    node,
                    "EdgeSetTopologyContainer",
                    ParamSet::new().with("edges", ParamValue::Text("0 1".to_string())),
                )?;
                self.scene.create_object(
                    node,
                    "DistanceMapping",
                    ParamSet::new()
                        .with("name", ParamValue::Text("mapping".to_string()))
                        .with("restLength", ParamValue::Scalar(distance.rest_length)),
                )?;
                self.emit_compliance(node, distance.compliance, None)?;
                self.emit_stabilization(node)?;
            }
            ConstraintBlock::Damper(damper) => match damper.coefficients {
                DamperCoefficients::Uniform(coefficient) => {
                    self.scene.create_object(
                        joint_node,
                        "UniformVelocityDampingForceField",
                        ParamSet::new()
                            .with("dampingCoefficient", ParamValue::Scalar(coefficient)),
                    )?;
                }
                DamperCoefficients::Diagonal(coefficients) => {
                    self.scene.create_object(
                        joint_node,
                        "DiagonalVelocityDampingForceField",
                        ParamSet::new().with(
                            "dampingCoefficients",
                            ParamValue::Scalars(coefficients.to_vec()),
                        ),
                    )?;
                }
            },
            ConstraintBlock::PositionServo(servo) => {
                let mask_node = self.scene.create_child(joint_node, block.label());
                self.emit_vec1_dofs(mask_node, None)?;
                self.emit_mask_mapping(mask_node, selection_row(&servo.dofs))?;

                let target_node = self.scene.create_child(mask_node, "controller-target");
                self.emit_vec1_dofs(target_node, None)?;
                self.scene.create_object(
                    target_node,
                    "DifferenceFromTargetMapping",
                    ParamSet::new()
                        .with("name", ParamValue::Text("mapping".to_string()))
                        .with("targets", ParamValue::Scalars(servo.targets.clone())),
                )?;
                self.emit_compliance(target_node, servo.compliance, Some(false))?;
                self.emit_stabilization(target_node)?;
            }
            ConstraintBlock::VelocityServo(servo) => {
                let node = self.scene.create_child(joint_node, block.label());
                self.emit_vec1_dofs(node, Some(servo.dofs.len()))?;
                self.emit_mask_mapping(node, selection_row(&servo.dofs))?;
                self.emit_compliance(node, servo.compliance, Some(true))?;
                self.scene.create_object(
                    node,
                    "VelocityConstraintValue",
                    ParamSet::new()
                        .with("velocities", ParamValue::Scalars(servo.targets.clone())),
                )?;
            }
            ConstraintBlock::Forcing(forcing) => {
                let node = self.scene.create_child(joint_node, block.label());
                self.emit_vec1_dofs(node, Some(forcing.dofs.len()))?;
                self.emit_mask_mapping(node, selection_row(&forcing.dofs))?;
                let points: Vec<f64> = (0..forcing.dofs.len()).map(|i| i as f64).collect();
                self.scene.create_object(
                    node,
                    "ConstantForceField",
                    ParamSet::new()
                        .with("template", ParamValue::Text(self.vec_template(1)))
                        .with("forces", ParamValue::Scalars(forcing.forces.clone()))
                        .with("points", ParamValue::Scalars(points)),
                )?;
            }
            ConstraintBlock::Resistance(resistance) => {
                let node = self.scene.create_child(joint_node, block.label());
                self.emit_vec1_dofs(node, Some(resistance.dofs.len()))?;
                self.emit_mask_mapping(node, selection_row(&resistance.dofs))?;
                self.emit_compliance(node, 0.0, Some(true))?;
                self.scene.create_object(
                    node,
                    "VelocityConstraintValue",
                    ParamSet::new().with(
                        "velocities",
                        ParamValue::Scalars(vec![0.0; resistance.dofs.len()]),
                    ),
                )?;
                self.scene.create_object(
                    node,
                    "ResistanceConstraint",
                    ParamSet::new().with("threshold", ParamValue::Scalar(resistance.threshold)),
                )?;
            }
        }
        Ok(())
    }

    fn emit_vec1_dofs(&mut self, node: NodeId, count: Option<usize>) -> Result<()> {
        let mut params = ParamSet::new()
            .with("template", ParamValue::Text(self.vec_template(1)))
            .with("name", ParamValue::Text("dofs".to_string()));
        if let Some(count) = count {
            params.push("position", ParamValue::Scalars(vec![0.0; count]));
        }
        self.scene.create_object(node, "MechanicalObject", params)?;
        Ok(())
    }

    fn emit_mask_mapping(&mut self, node: NodeId, row: [f64; Dof::COUNT]) -> Result<()> {
        self.scene.create_object(
            node,
            "MaskMapping",
            ParamSet::new()
                .with("name", ParamValue::Text("mapping".to_string()))
                .with("dofs", ParamValue::Scalars(row.to_vec())),
        )?;
        Ok(())
    }

    fn emit_compliance(
        &mut self,
        node: NodeId,
        compliance: f64,
        is_compliance: Option<bool>,
    ) -> Result<()> {
        let mut params = ParamSet::new()
            .with("name", ParamValue::Text("compliance".to_string()))
            .with("compliance", ParamValue::Scalar(compliance));
        if let Some(flag) = is_compliance {
            params.push("isCompliance", ParamValue::Bool(flag));
        }
        self.scene.create_object(node, "UniformCompliance", params)?;
        Ok(())
    }

    fn emit_stabilization(&mut self, node: NodeId) -> Result<()> {
        self.scene
            .create_object(node, "Stabilization", ParamSet::new())?;
        Ok(())
    }

    fn rollback_on_error<T>(&mut self, node: NodeId, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                self.scene.remove_node(node);
                Err(err)
            }
        }
    }
}

fn selection_row(dofs: &[Dof]) -> [f64; Dof::COUNT] {
    let mut row = [0.0; Dof::COUNT];
    for dof in dofs {
        row[dof.index()] = 1.0;
    }
    row
}
