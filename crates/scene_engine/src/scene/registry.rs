//! Flat lists of nodes the scene visits outside the tree walk
//!
//! The render traversal walks the mesh list and the collision sync walks the
//! collision list. Both hold handles only; entity destruction prunes them and
//! readers still skip handles that no longer resolve.

use crate::ecs::ComponentKind;
use crate::foundation::collections::NodeHandle;

/// Mesh and collision node lists
#[derive(Debug, Default, Clone)]
pub struct SceneRegistry {
    meshes: Vec<NodeHandle>,
    colliders: Vec<NodeHandle>,
}

impl SceneRegistry {
    /// Empty lists
    pub fn new() -> Self {
        Self::default()
    }

    /// File a node under the list its component belongs to
    pub fn register(&mut self, node: NodeHandle, kind: Option<ComponentKind>) {
        match kind {
            Some(ComponentKind::MeshRender) => self.meshes.push(node),
            Some(ComponentKind::Collision) => self.colliders.push(node),
            _ => {}
        }
    }

    /// Forget removed nodes
    pub fn prune(&mut self, removed: &[NodeHandle]) {
        self.meshes.retain(|h| !removed.contains(h));
        self.colliders.retain(|h| !removed.contains(h));
    }

    /// Mesh nodes in registration order
    pub fn mesh_nodes(&self) -> &[NodeHandle] {
        &self.meshes
    }

    /// Collision nodes in registration order
    pub fn collision_nodes(&self) -> &[NodeHandle] {
        &self.colliders
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.colliders.clear();
    }
}
