//! The scene-graph builder contract.
//!
//! The engine that actually owns nodes and components is an external
//! collaborator; construction code only needs to create named child
//! nodes, create typed components on them, and (for rollback) remove a
//! node subtree again. Handles are opaque IDs, not paths: path strings
//! appear only inside component parameters, computed by
//! [`relative_path`](crate::relative_path).

use armature_types::Result;

/// Handle to a scene-graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a node handle.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Handle to a component created on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// Create an object handle.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// One typed component parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Scalar value.
    Scalar(f64),
    /// Flat list of scalars.
    Scalars(Vec<f64>),
    /// Free-form text.
    Text(String),
    /// Links to other components, as `@path/component` references.
    Links(Vec<String>),
}

/// Ordered set of component parameters.
///
/// Order is preserved as issued; engines that care about parameter order
/// receive them unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamSet(Vec<(String, ParamValue)>);

impl ParamSet {
    /// Create an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a parameter, builder-style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.0.push((name.into(), value));
        self
    }

    /// Append a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.push((name.into(), value));
    }

    /// First parameter with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    /// All parameters, in issued order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The scene-graph builder collaborator.
///
/// Implementations apply calls in issued order. `create_child` and
/// `attach_child` are pure tree operations and cannot fail;
/// `create_object` may fail (unknown component type, bad parameters) and
/// the caller must then remove the node subtree it was building, so no
/// partially-registered node stays reachable by name.
pub trait SceneSink {
    /// The pre-existing root node.
    fn root(&self) -> NodeId;

    /// Create a named child node.
    fn create_child(&mut self, parent: NodeId, name: &str) -> NodeId;

    /// Create a typed component on a node.
    fn create_object(
        &mut self,
        node: NodeId,
        type_name: &str,
        params: ParamSet,
    ) -> Result<ObjectId>;

    /// Attach an existing node under an additional parent.
    ///
    /// Joints live under both endpoint nodes; the first parent stays the
    /// primary one for path purposes.
    fn attach_child(&mut self, extra_parent: NodeId, node: NodeId);

    /// Remove a node and everything beneath it.
    fn remove_node(&mut self, node: NodeId);

    /// Primary parent of a node (`None` for the root).
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;

    /// Name of a node.
    fn name_of(&self, node: NodeId) -> Option<&str>;
}

/// A node recorded by [`RecordingScene`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedNode {
    /// Node name.
    pub name: String,
    /// Primary parent (`None` for the root).
    pub parent: Option<NodeId>,
    /// Additional parents from `attach_child`.
    pub extra_parents: Vec<NodeId>,
    /// Children, in creation order.
    pub children: Vec<NodeId>,
    /// Whether the node has been removed.
    pub removed: bool,
}

/// A component recorded by [`RecordingScene`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedObject {
    /// The node the component was created on.
    pub node: NodeId,
    /// Component type name.
    pub type_name: String,
    /// Parameters, in issued order.
    pub params: ParamSet,
}

/// In-memory scene sink for tests and dry runs.
///
/// Records every node and component in issued order; removal marks the
/// subtree removed and detaches it from its parent, so name lookups see
/// exactly what a real engine would.
#[derive(Debug)]
pub struct RecordingScene {
    nodes: Vec<RecordedNode>,
    objects: Vec<RecordedObject>,
}

impl Default for RecordingScene {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingScene {
    /// Create a scene containing only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![RecordedNode {
                name: "root".to_string(),
                parent: None,
                extra_parents: Vec::new(),
                children: Vec::new(),
                removed: false,
            }],
            objects: Vec::new(),
        }
    }

    /// Recorded node by handle.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&RecordedNode> {
        self.nodes.get(id.raw() as usize)
    }

    /// Live child of a node, by name.
    #[must_use]
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let parent = self.node(parent)?;
        parent.children.iter().copied().find(|&child| {
            self.node(child)
                .is_some_and(|node| !node.removed && node.name == name)
        })
    }

    /// Whether a node (or an ancestor of it) has been removed.
    #[must_use]
    pub fn is_removed(&self, id: NodeId) -> bool {
        self.node(id).map_or(true, |node| node.removed)
    }

    /// Components created on a node, in issued order.
    pub fn objects_in(&self, node: NodeId) -> impl Iterator<Item = &RecordedObject> {
        self.objects.iter().filter(move |object| object.node == node)
    }

    /// First component of a type on a node.
    #[must_use]
    pub fn object_of_type(&self, node: NodeId, type_name: &str) -> Option<&RecordedObject> {
        self.objects_in(node)
            .find(|object| object.type_name == type_name)
    }

    /// Number of live nodes (excluding the root).
    #[must_use]
    pub fn live_node_count(&self) -> usize {
        self.nodes
            .iter()
            .skip(1)
            .filter(|node| !node.removed)
            .count()
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(id.raw() as usize) {
            Some(node) => {
                node.removed = true;
                node.children.clone()
            }
            None => return,
        };
        for child in children {
            self.remove_subtree(child);
        }
    }
}

impl SceneSink for RecordingScene {
    fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    fn create_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u64);
        self.nodes.push(RecordedNode {
            name: name.to_string(),
            parent: Some(parent),
            extra_parents: Vec::new(),
            children: Vec::new(),
            removed: false,
        });
        if let Some(node) = self.nodes.get_mut(parent.raw() as usize) {
            node.children.push(id);
        }
        id
    }

    fn create_object(
        &mut self,
        node: NodeId,
        type_name: &str,
        params: ParamSet,
    ) -> Result<ObjectId> {
        let id = ObjectId::new(self.objects.len() as u64);
        self.objects.push(RecordedObject {
            node,
            type_name: type_name.to_string(),
            params,
        });
        Ok(id)
    }

    fn attach_child(&mut self, extra_parent: NodeId, node: NodeId) {
        if let Some(record) = self.nodes.get_mut(node.raw() as usize) {
            record.extra_parents.push(extra_parent);
        }
        if let Some(record) = self.nodes.get_mut(extra_parent.raw() as usize) {
            record.children.push(node);
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        if let Some(parent) = self.node(node).and_then(|record| record.parent) {
            if let Some(record) = self.nodes.get_mut(parent.raw() as usize) {
                record.children.retain(|&child| child != node);
            }
        }
        self.remove_subtree(node);
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn name_of(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|record| record.name.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_child_creation_and_lookup() {
        let mut scene = RecordingScene::new();
        let body = scene.create_child(scene.root(), "body");
        let inner = scene.create_child(body, "collision");

        assert_eq!(scene.find_child(scene.root(), "body"), Some(body));
        assert_eq!(scene.find_child(body, "collision"), Some(inner));
        assert_eq!(scene.parent_of(inner), Some(body));
        assert_eq!(scene.name_of(inner), Some("collision"));
    }

    #[test]
    fn test_object_recording() {
        let mut scene = RecordingScene::new();
        let node = scene.create_child(scene.root(), "body");
        scene
            .create_object(
                node,
                "RigidMass",
                ParamSet::new().with("mass", ParamValue::Scalar(2.0)),
            )
            .unwrap();

        let object = scene.object_of_type(node, "RigidMass").unwrap();
        assert_eq!(object.params.get("mass"), Some(&ParamValue::Scalar(2.0)));
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut scene = RecordingScene::new();
        let body = scene.create_child(scene.root(), "body");
        let inner = scene.create_child(body, "visual");

        scene.remove_node(body);

        assert!(scene.is_removed(body));
        assert!(scene.is_removed(inner));
        assert_eq!(scene.find_child(scene.root(), "body"), None);
        assert_eq!(scene.live_node_count(), 0);
    }

    #[test]
    fn test_attach_child_records_extra_parent() {
        let mut scene = RecordingScene::new();
        let a = scene.create_child(scene.root(), "a");
        let b = scene.create_child(scene.root(), "b");
        let joint = scene.create_child(a, "joint");

        scene.attach_child(b, joint);

        assert_eq!(scene.parent_of(joint), Some(a));
        assert_eq!(scene.node(joint).unwrap().extra_parents, vec![b]);
        assert_eq!(scene.find_child(b, "joint"), Some(joint));
    }
}
