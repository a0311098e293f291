//! Scene graph
//!
//! Nodes live in a slot map and link to each other by handle. Every mutation
//! recomputes the world matrix of the mutated node and all of its descendants
//! before returning, so readers always see `world == parent.world * local`.

use crate::ecs::{Component, ComponentContext, ComponentError, ComponentServices};
use crate::foundation::collections::{EntityHandle, NodeHandle, NodeMap};
use crate::foundation::math::{Axis, Mat4, Mat4Ext, Point3, Vec3};

use super::node::SceneNode;

/// Arena of scene nodes
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: NodeMap<SceneNode>,
}

impl SceneGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a handle still resolves
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    /// Look up a node
    pub fn get(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(handle)
    }

    /// All live nodes in arena order
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &SceneNode)> {
        self.nodes.iter()
    }

    /// Component attached to a node
    pub fn component(&self, handle: NodeHandle) -> Option<&Component> {
        self.nodes.get(handle)?.component.as_ref()
    }

    /// Component attached to a node, mutably
    pub fn component_mut(&mut self, handle: NodeHandle) -> Option<&mut Component> {
        self.nodes.get_mut(handle)?.component.as_mut()
    }

    /// Insert a detached node and compute its world matrix
    pub fn insert(&mut self, mut node: SceneNode) -> NodeHandle {
        node.parent = None;
        node.children.clear();
        node.world = node.local_matrix();
        node.previous_world_position = node.world.translation();
        self.nodes.insert(node)
    }

    /// Record the owning entity; the owner of a node never changes
    pub(crate) fn set_owner(&mut self, handle: NodeHandle, owner: EntityHandle) {
        if let Some(node) = self.nodes.get_mut(handle) {
            debug_assert!(
                node.owner.is_none() || node.owner == Some(owner),
                "node '{}' already has an owner",
                node.name
            );
            node.owner.get_or_insert(owner);
        }
    }

    /// Set the local position
    pub fn set_position(&mut self, handle: NodeHandle, position: Vec3) -> bool {
        self.mutate(handle, |node| node.position = position)
    }

    /// Set the local rotation in degrees
    pub fn set_rotation(&mut self, handle: NodeHandle, degrees: Vec3) -> bool {
        self.mutate(handle, |node| node.rotation = degrees)
    }

    /// Set the local scale
    pub fn set_scale(&mut self, handle: NodeHandle, scale: Vec3) -> bool {
        self.mutate(handle, |node| node.scale = scale)
    }

    /// Offset the local position
    pub fn add_position(&mut self, handle: NodeHandle, offset: Vec3) -> bool {
        self.mutate(handle, |node| node.position += offset)
    }

    /// Rotate further around one axis, in degrees
    pub fn add_rotation(&mut self, handle: NodeHandle, degrees: f32, axis: Axis) -> bool {
        self.mutate(handle, |node| match axis {
            Axis::X => node.rotation.x += degrees,
            Axis::Y => node.rotation.y += degrees,
            Axis::Z => node.rotation.z += degrees,
        })
    }

    /// Multiply the local scale component-wise
    pub fn add_scale(&mut self, handle: NodeHandle, factor: Vec3) -> bool {
        self.mutate(handle, |node| node.scale.component_mul_assign(&factor))
    }

    /// Move a node so its world translation becomes `position`
    pub fn set_world_position(&mut self, handle: NodeHandle, position: Vec3) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            log::debug!("Ignoring world move of stale node {handle:?}");
            return false;
        };

        let local = match node.parent.and_then(|p| self.nodes.get(p)) {
            Some(parent) => match parent.world.try_inverse() {
                Some(inverse) => inverse.transform_point(&Point3::from(position)).coords,
                None => {
                    log::warn!("Parent of '{}' has a singular world matrix", node.name);
                    return false;
                }
            },
            None => position,
        };

        self.set_position(handle, local)
    }

    /// Make `child` the last child of `parent`.
    ///
    /// `child` must be a root. Attaching a node that already has a parent is
    /// a bug: debug builds panic, release builds refuse. Attaching an
    /// ancestor under its own descendant is refused as well.
    pub fn attach_child(&mut self, parent: NodeHandle, child: NodeHandle) -> bool {
        if parent == child || !self.contains(parent) {
            return false;
        }
        let Some(child_node) = self.nodes.get(child) else {
            return false;
        };

        debug_assert!(
            child_node.parent.is_none(),
            "node '{}' is already attached",
            child_node.name
        );
        if child_node.parent.is_some() {
            log::error!("Refusing to re-attach node '{}'", child_node.name);
            return false;
        }

        if self.is_ancestor(child, parent) {
            log::warn!("Refusing to attach '{}' below its own descendant", child_node.name);
            return false;
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        self.update_transform(child);
        self.settle(child);
        true
    }

    /// Detach a node from its parent, making it a root
    pub fn detach(&mut self, child: NodeHandle) -> bool {
        let Some(parent) = self.nodes.get(child).and_then(|n| n.parent) else {
            return false;
        };

        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|&c| c != child);
        }
        self.nodes[child].parent = None;
        self.update_transform(child);
        self.settle(child);
        true
    }

    /// Recompute the world matrices of a node and its descendants
    pub fn update_transform(&mut self, handle: NodeHandle) {
        for h in self.descendants(handle) {
            let parent_world = self.nodes[h]
                .parent
                .and_then(|p| self.nodes.get(p))
                .map_or_else(Mat4::identity, |p| p.world);

            let node = &mut self.nodes[h];
            node.world = parent_world * node.local_matrix();
        }
    }

    /// Cached world matrix
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<&Mat4> {
        self.nodes.get(handle).map(SceneNode::world_matrix)
    }

    /// World translation
    pub fn world_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.nodes.get(handle).map(SceneNode::world_position)
    }

    /// World-space displacement caused by the last mutation
    pub fn velocity(&self, handle: NodeHandle) -> Option<Vec3> {
        self.nodes
            .get(handle)
            .map(|n| n.world_position() - n.previous_world_position)
    }

    /// `handle` and every node below it, depth first, parents before children
    pub fn descendants(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut order = Vec::new();
        let mut stack = vec![handle];

        while let Some(h) = stack.pop() {
            let Some(node) = self.nodes.get(h) else {
                continue;
            };
            order.push(h);
            stack.extend(node.children.iter().rev());
        }
        order
    }

    /// Whether `ancestor` lies on the parent chain of `handle` (or is it)
    pub fn is_ancestor(&self, ancestor: NodeHandle, handle: NodeHandle) -> bool {
        let mut current = Some(handle);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    /// Remove a node and everything below it.
    ///
    /// The node is unlinked from its parent first. Removed nodes are returned
    /// in depth-first order so their components can be torn down.
    pub(crate) fn remove_subtree(&mut self, handle: NodeHandle) -> Vec<(NodeHandle, SceneNode)> {
        if let Some(parent) = self.nodes.get(handle).and_then(|n| n.parent) {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|&c| c != handle);
            }
        }

        self.descendants(handle)
            .into_iter()
            .filter_map(|h| self.nodes.remove(h).map(|node| (h, node)))
            .collect()
    }

    /// Run the components of a subtree, parents before children
    pub fn update(&mut self, root: NodeHandle, services: &mut ComponentServices<'_>, delta_ms: f32) {
        for handle in self.descendants(root) {
            self.with_component(handle, services, |component, cx| component.update(cx, delta_ms));
        }
    }

    /// Initialise the components of a subtree, stopping at the first failure
    pub fn init(
        &mut self,
        root: NodeHandle,
        services: &mut ComponentServices<'_>,
    ) -> Result<(), ComponentError> {
        for handle in self.descendants(root) {
            let result = self.with_component(handle, services, |component, cx| component.init(cx));
            if let Some(result) = result {
                result?;
            }
        }
        Ok(())
    }

    /// Run `f` on a node's component with a context pointing at the node.
    ///
    /// The component is lifted out of the node while `f` runs, so `f` may
    /// mutate the graph freely. Returns `None` when the node carries nothing.
    pub fn with_component<R>(
        &mut self,
        handle: NodeHandle,
        services: &mut ComponentServices<'_>,
        f: impl FnOnce(&mut Component, &mut ComponentContext<'_, '_>) -> R,
    ) -> Option<R> {
        let (owner, mut component) = self.take_component(handle)?;
        let result = {
            let mut cx = ComponentContext::new(self, Some(handle), owner, services);
            f(&mut component, &mut cx)
        };
        self.restore_component(handle, component);
        Some(result)
    }

    fn take_component(&mut self, handle: NodeHandle) -> Option<(Option<EntityHandle>, Component)> {
        let node = self.nodes.get_mut(handle)?;
        let component = node.component.take()?;
        Some((node.owner, component))
    }

    fn restore_component(&mut self, handle: NodeHandle, component: Component) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.component = Some(component);
        }
    }

    /// Re-parenting is not motion: the new world position becomes the
    /// previous one as well
    fn settle(&mut self, handle: NodeHandle) {
        for h in self.descendants(handle) {
            let node = &mut self.nodes[h];
            node.previous_world_position = node.world.translation();
        }
    }

    fn mutate(&mut self, handle: NodeHandle, apply: impl FnOnce(&mut SceneNode)) -> bool {
        if !self.contains(handle) {
            log::debug!("Ignoring transform change on stale node {handle:?}");
            return false;
        }

        for h in self.descendants(handle) {
            let node = &mut self.nodes[h];
            node.previous_position = node.position;
            node.previous_world_position = node.world.translation();
        }

        apply(&mut self.nodes[handle]);
        self.update_transform(handle);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn chain(graph: &mut SceneGraph) -> (NodeHandle, NodeHandle, NodeHandle) {
        let root = graph.insert(SceneNode::new("root"));
        let child = graph.insert(SceneNode::new("child").at(Vec3::new(1.0, 0.0, 0.0)));
        let grandchild = graph.insert(SceneNode::new("grandchild").at(Vec3::new(0.0, 2.0, 0.0)));
        assert!(graph.attach_child(root, child));
        assert!(graph.attach_child(child, grandchild));
        (root, child, grandchild)
    }

    fn assert_world_invariant(graph: &SceneGraph) {
        for (_, node) in graph.iter() {
            let parent_world = node
                .parent()
                .map_or_else(Mat4::identity, |p| *graph.world_matrix(p).unwrap());
            assert_relative_eq!(
                *node.world_matrix(),
                parent_world * node.local_matrix(),
                epsilon = 1e-5
            );
        }
    }

    #[test]
    fn test_parent_move_propagates_to_child() {
        let mut graph = SceneGraph::new();
        let (root, child, grandchild) = chain(&mut graph);

        graph.set_position(root, Vec3::new(5.0, 0.0, 0.0));

        assert_relative_eq!(graph.world_position(child).unwrap(), Vec3::new(6.0, 0.0, 0.0));
        assert_relative_eq!(graph.world_position(grandchild).unwrap(), Vec3::new(6.0, 2.0, 0.0));
    }

    #[test]
    fn test_world_invariant_after_mixed_mutations() {
        let mut graph = SceneGraph::new();
        let (root, child, grandchild) = chain(&mut graph);

        graph.set_rotation(root, Vec3::new(10.0, 20.0, 30.0));
        graph.set_scale(child, Vec3::new(2.0, 1.0, 0.5));
        graph.add_position(grandchild, Vec3::new(0.0, 0.0, 3.0));
        graph.add_rotation(child, 45.0, Axis::Y);
        graph.add_scale(root, Vec3::repeat(2.0));

        assert_world_invariant(&graph);
    }

    #[test]
    fn test_rotation_is_applied_around_parent() {
        let mut graph = SceneGraph::new();
        let (root, child, _) = chain(&mut graph);

        graph.set_rotation(root, Vec3::new(0.0, 0.0, 90.0));

        assert_relative_eq!(
            graph.world_position(child).unwrap(),
            Vec3::new(0.0, 1.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_update_transform_is_idempotent() {
        let mut graph = SceneGraph::new();
        let (root, _, grandchild) = chain(&mut graph);
        graph.set_rotation(root, Vec3::new(13.0, 27.0, 71.0));

        graph.update_transform(root);
        let first = *graph.world_matrix(grandchild).unwrap();
        graph.update_transform(root);
        let second = *graph.world_matrix(grandchild).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_previous_position_and_velocity() {
        let mut graph = SceneGraph::new();
        let (root, child, _) = chain(&mut graph);

        graph.set_position(root, Vec3::new(2.0, 0.0, 0.0));
        graph.set_position(root, Vec3::new(3.0, 0.0, 0.0));

        let root_node = graph.get(root).unwrap();
        assert_eq!(root_node.previous_position(), Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(graph.velocity(root).unwrap(), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(graph.velocity(child).unwrap(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(graph.get(child).unwrap().previous_position(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_attaching_is_not_motion() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(SceneNode::new("root").at(Vec3::new(4.0, 0.0, 0.0)));
        let child = graph.insert(SceneNode::new("child"));
        graph.attach_child(root, child);

        assert_eq!(graph.world_position(child), Some(Vec3::new(4.0, 0.0, 0.0)));
        assert_eq!(graph.velocity(child), Some(Vec3::zeros()));
    }

    #[test]
    fn test_set_world_position_under_parent() {
        let mut graph = SceneGraph::new();
        let (root, child, _) = chain(&mut graph);
        graph.set_position(root, Vec3::new(5.0, 0.0, 0.0));
        graph.set_scale(root, Vec3::repeat(2.0));

        assert!(graph.set_world_position(child, Vec3::new(9.0, 4.0, 0.0)));

        assert_relative_eq!(
            graph.world_position(child).unwrap(),
            Vec3::new(9.0, 4.0, 0.0),
            epsilon = 1e-5
        );
        assert_relative_eq!(
            graph.get(child).unwrap().position(),
            Vec3::new(2.0, 2.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_detach_and_remove_subtree() {
        let mut graph = SceneGraph::new();
        let (root, child, grandchild) = chain(&mut graph);
        graph.set_position(root, Vec3::new(5.0, 0.0, 0.0));

        assert!(graph.detach(child));
        assert!(graph.get(root).unwrap().children().is_empty());
        assert_relative_eq!(graph.world_position(child).unwrap(), Vec3::new(1.0, 0.0, 0.0));

        assert!(graph.attach_child(root, child));
        let removed = graph.remove_subtree(child);
        let handles: Vec<NodeHandle> = removed.iter().map(|(h, _)| *h).collect();

        assert_eq!(handles, vec![child, grandchild]);
        assert!(graph.get(root).unwrap().children().is_empty());
        assert!(!graph.contains(grandchild));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_stale_handles_are_ignored() {
        let mut graph = SceneGraph::new();
        let (root, child, _) = chain(&mut graph);
        graph.remove_subtree(child);

        assert!(!graph.set_position(child, Vec3::repeat(1.0)));
        assert!(!graph.attach_child(root, child));
        assert!(graph.world_matrix(child).is_none());
        assert!(graph.descendants(child).is_empty());
    }

    #[test]
    fn test_cycles_are_refused() {
        let mut graph = SceneGraph::new();
        let (root, _, grandchild) = chain(&mut graph);

        assert!(!graph.attach_child(grandchild, root));
        assert!(!graph.attach_child(root, root));
        assert!(graph.get(root).unwrap().parent().is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already attached")]
    fn test_double_attach_panics_in_debug() {
        let mut graph = SceneGraph::new();
        let (_, child, _) = chain(&mut graph);
        let other = graph.insert(SceneNode::new("other"));
        graph.attach_child(other, child);
    }

    #[test]
    fn test_descendants_preserve_child_order() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(SceneNode::new("root"));
        let a = graph.insert(SceneNode::new("a"));
        let b = graph.insert(SceneNode::new("b"));
        let a1 = graph.insert(SceneNode::new("a1"));
        graph.attach_child(root, a);
        graph.attach_child(root, b);
        graph.attach_child(a, a1);

        assert_eq!(graph.descendants(root), vec![root, a, a1, b]);
    }
}
