//! Relative paths between scene nodes.
//!
//! Joint mappings reference their endpoint dof components by a path
//! relative to the joint's own node. The path is a pure function of the
//! node hierarchy: walk both nodes to the root, drop the common prefix,
//! and join `..` segments with child names.

use armature_types::{ArmatureError, Result};

use crate::graph::{NodeId, SceneSink};

/// Compute the relative path from one node to another.
///
/// Uses primary parents only; a node attached under several parents is
/// addressed through the parent it was created under. Returns `"."` when
/// both nodes are the same. Fails with
/// [`ArmatureError::DisconnectedNodes`] when the nodes share no ancestor.
pub fn relative_path<S: SceneSink + ?Sized>(scene: &S, from: NodeId, to: NodeId) -> Result<String> {
    let from_chain = ancestor_chain(scene, from);
    let to_chain = ancestor_chain(scene, to);

    // Number of trailing (root-side) entries the chains share.
    let common = from_chain
        .iter()
        .rev()
        .zip(to_chain.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        let name = |id| scene.name_of(id).unwrap_or("?").to_string();
        return Err(ArmatureError::disconnected(name(from), name(to)));
    }

    let ups = from_chain.len() - common;
    let mut segments: Vec<String> = vec!["..".to_string(); ups];
    for &node in to_chain[..to_chain.len() - common].iter().rev() {
        segments.push(scene.name_of(node).unwrap_or("?").to_string());
    }

    if segments.is_empty() {
        return Ok(".".to_string());
    }
    Ok(segments.join("/"))
}

fn ancestor_chain<S: SceneSink + ?Sized>(scene: &S, node: NodeId) -> Vec<NodeId> {
    let mut chain = vec![node];
    let mut current = node;
    while let Some(parent) = scene.parent_of(current) {
        chain.push(parent);
        current = parent;
    }
    chain
}
