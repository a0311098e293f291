//! Entities
//!
//! An entity owns one root scene node (with whatever hangs below it) and a
//! list of components that have no transform. The scene decides when each of
//! the two groups is updated; the entity only knows how.

use super::component::{Component, ComponentContext, ComponentError, ComponentKind, ComponentServices};
use crate::foundation::collections::{EntityHandle, NodeHandle};
use crate::level::EntityDefinition;
use crate::scene::{SceneGraph, SceneNode, SceneRegistry};

/// A named game object
#[derive(Debug)]
pub struct Entity {
    handle: EntityHandle,
    name: String,
    /// Invisible entities are skipped by the render traversal
    pub visible: bool,
    root: Option<NodeHandle>,
    owned: Vec<Component>,
    definition: Option<EntityDefinition>,
}

impl Entity {
    /// Empty, visible entity
    pub fn new(handle: EntityHandle, name: impl Into<String>) -> Self {
        Self {
            handle,
            name: name.into(),
            visible: true,
            root: None,
            owned: Vec::new(),
            definition: None,
        }
    }

    /// Handle of this entity in its scene
    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    /// Entity name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root node, once the first component has been attached
    pub fn root(&self) -> Option<NodeHandle> {
        self.root
    }

    /// Description the entity was spawned from
    pub fn definition(&self) -> Option<&EntityDefinition> {
        self.definition.as_ref()
    }

    /// Remember the description the entity was spawned from
    pub fn set_definition(&mut self, definition: EntityDefinition) {
        self.definition = Some(definition);
    }

    /// Components without a transform
    pub fn components(&self) -> &[Component] {
        &self.owned
    }

    /// Components without a transform, mutably
    pub fn components_mut(&mut self) -> &mut [Component] {
        &mut self.owned
    }

    /// Insert a node into the graph as part of this entity.
    ///
    /// The first node becomes the root; later nodes are attached under it.
    pub fn attach_component(
        &mut self,
        graph: &mut SceneGraph,
        registry: &mut SceneRegistry,
        node: SceneNode,
    ) -> NodeHandle {
        let handle = graph.insert(node);
        graph.set_owner(handle, self.handle);

        match self.root {
            None => self.root = Some(handle),
            Some(root) => {
                graph.attach_child(root, handle);
            }
        }

        registry.register(handle, graph.component(handle).map(Component::kind));
        handle
    }

    /// Insert a node under one of this entity's nodes.
    ///
    /// Returns `None`, inserting nothing, when `parent` is not part of this
    /// entity.
    pub fn attach_child_to_component(
        &mut self,
        graph: &mut SceneGraph,
        registry: &mut SceneRegistry,
        parent: NodeHandle,
        node: SceneNode,
    ) -> Option<NodeHandle> {
        if graph.get(parent)?.owner() != Some(self.handle) {
            log::warn!("'{}' cannot attach under a node it does not own", self.name);
            return None;
        }

        let handle = graph.insert(node);
        graph.set_owner(handle, self.handle);
        graph.attach_child(parent, handle);
        registry.register(handle, graph.component(handle).map(Component::kind));
        Some(handle)
    }

    /// Hold a component that has no transform
    pub fn add_component(&mut self, component: impl Into<Component>) {
        self.owned.push(component.into());
    }

    /// Initialise every component, nodes first, stopping at the first failure
    pub fn init(
        &mut self,
        graph: &mut SceneGraph,
        services: &mut ComponentServices<'_>,
    ) -> Result<(), ComponentError> {
        if let Some(root) = self.root {
            graph.init(root, services)?;
        }

        let owner = Some(self.handle);
        for component in &mut self.owned {
            let mut cx = ComponentContext::new(graph, None, owner, services);
            component.init(&mut cx)?;
        }
        Ok(())
    }

    /// Update the node tree
    pub fn update_transforms(
        &mut self,
        graph: &mut SceneGraph,
        services: &mut ComponentServices<'_>,
        delta_ms: f32,
    ) {
        if let Some(root) = self.root {
            graph.update(root, services, delta_ms);
        }
    }

    /// Update the components without a transform
    pub fn update_components(
        &mut self,
        graph: &mut SceneGraph,
        services: &mut ComponentServices<'_>,
        delta_ms: f32,
    ) {
        let owner = Some(self.handle);
        for component in &mut self.owned {
            let mut cx = ComponentContext::new(graph, None, owner, services);
            component.update(&mut cx, delta_ms);
        }
    }

    /// Update the node tree, then the components without a transform
    pub fn update(
        &mut self,
        graph: &mut SceneGraph,
        services: &mut ComponentServices<'_>,
        delta_ms: f32,
    ) {
        self.update_transforms(graph, services, delta_ms);
        self.update_components(graph, services, delta_ms);
    }

    /// Tear down owned components, then the node tree, then the definition.
    ///
    /// Removed nodes are pruned from `registry`.
    pub fn destroy(
        &mut self,
        graph: &mut SceneGraph,
        registry: &mut SceneRegistry,
        services: &mut ComponentServices<'_>,
    ) {
        for mut component in self.owned.drain(..) {
            component.destroy(services);
        }

        if let Some(root) = self.root.take() {
            Self::tear_down(graph, registry, services, root);
        }

        self.definition = None;
        log::debug!("Destroyed entity '{}'", self.name);
    }

    /// Destroy one attached node and everything below it, keeping the entity.
    ///
    /// The root cannot be removed this way, use [`Entity::destroy`]. Returns
    /// `false`, touching nothing, for the root and for nodes this entity
    /// does not own.
    pub fn destroy_component(
        &mut self,
        graph: &mut SceneGraph,
        registry: &mut SceneRegistry,
        services: &mut ComponentServices<'_>,
        node: NodeHandle,
    ) -> bool {
        if self.root == Some(node) {
            log::warn!("'{}' cannot destroy its root node alone", self.name);
            return false;
        }
        if graph.get(node).and_then(SceneNode::owner) != Some(self.handle) {
            log::debug!("'{}' does not own node {node:?}", self.name);
            return false;
        }

        Self::tear_down(graph, registry, services, node);
        true
    }

    /// Remove a subtree, destroy its components and prune the flat lists
    fn tear_down(
        graph: &mut SceneGraph,
        registry: &mut SceneRegistry,
        services: &mut ComponentServices<'_>,
        node: NodeHandle,
    ) {
        let removed = graph.remove_subtree(node);
        let handles: Vec<NodeHandle> = removed.iter().map(|(h, _)| *h).collect();
        for (_, node) in removed {
            if let Some(mut component) = node.component {
                component.destroy(services);
            }
        }
        registry.prune(&handles);
    }

    /// Every node of this entity, depth first
    pub fn nodes(&self, graph: &SceneGraph) -> Vec<NodeHandle> {
        self.root.map(|r| graph.descendants(r)).unwrap_or_default()
    }

    /// First node carrying a component of `kind`
    pub fn find_node(&self, graph: &SceneGraph, kind: ComponentKind) -> Option<NodeHandle> {
        self.nodes(graph)
            .into_iter()
            .find(|&h| graph.component(h).map(Component::kind) == Some(kind))
    }
}
