//! Scene nodes
//!
//! A node carries a local translation, an Euler rotation in degrees and a
//! scale, plus the world matrix cached by the [`SceneGraph`]. Nodes are only
//! mutated through the graph so the cached matrices can never go stale.
//!
//! [`SceneGraph`]: super::SceneGraph

use crate::ecs::Component;
use crate::foundation::collections::{EntityHandle, NodeHandle};
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

/// A transform-bearing node, optionally carrying one component
#[derive(Debug)]
pub struct SceneNode {
    /// Debug name
    pub name: String,
    pub(crate) owner: Option<EntityHandle>,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
    pub(crate) position: Vec3,
    pub(crate) rotation: Vec3,
    pub(crate) scale: Vec3,
    pub(crate) previous_position: Vec3,
    pub(crate) previous_world_position: Vec3,
    pub(crate) world: Mat4,
    pub(crate) component: Option<Component>,
}

impl SceneNode {
    /// Bare node at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            parent: None,
            children: Vec::new(),
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::repeat(1.0),
            previous_position: Vec3::zeros(),
            previous_world_position: Vec3::zeros(),
            world: Mat4::identity(),
            component: None,
        }
    }

    /// Node carrying a component
    pub fn with_component(name: impl Into<String>, component: Component) -> Self {
        Self {
            component: Some(component),
            ..Self::new(name)
        }
    }

    /// Initial local position
    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self.previous_position = position;
        self
    }

    /// Initial local rotation in degrees
    #[must_use]
    pub fn rotated(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    /// Initial local scale
    #[must_use]
    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Entity owning this node
    pub fn owner(&self) -> Option<EntityHandle> {
        self.owner
    }

    /// Parent node, `None` for roots
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Children in attach order
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation in degrees
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Local position before the last mutation
    pub fn previous_position(&self) -> Vec3 {
        self.previous_position
    }

    /// World position before the last mutation
    pub fn previous_world_position(&self) -> Vec3 {
        self.previous_world_position
    }

    /// Local matrix, `T * Rz * Ry * Rx * S`
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_euler_trs(&self.position, &self.rotation, &self.scale)
    }

    /// Cached world matrix
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world
    }

    /// Translation of the cached world matrix
    pub fn world_position(&self) -> Vec3 {
        self.world.translation()
    }

    /// Attached component
    pub fn component(&self) -> Option<&Component> {
        self.component.as_ref()
    }

    /// Attached component, mutably
    pub fn component_mut(&mut self) -> Option<&mut Component> {
        self.component.as_mut()
    }
}
