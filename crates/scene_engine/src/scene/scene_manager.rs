//! The scene: graph, entities and the per-frame drive
//!
//! The scene owns every entity and every node. Collaborators are borrowed
//! from the [`EngineContext`] for the duration of each call.

use thiserror::Error;

use super::graph::SceneGraph;
use super::lights::SceneLights;
use super::node::SceneNode;
use super::registry::SceneRegistry;
use crate::backend::{AudioBackend, PhysicsBackend, RenderBackend, SoundParams};
use crate::config::ConfigError;
use crate::core::config::SceneConfig;
use crate::core::EngineContext;
use crate::ecs::{Camera, Component, ComponentContext, ComponentError, ComponentKind, Entity};
use crate::foundation::collections::{EntityHandle, EntityMap, NodeHandle};

/// Scene errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// The entity handle does not resolve
    #[error("Unknown entity {0:?}")]
    UnknownEntity(EntityHandle),

    /// A node was to be attached under a node the entity does not own
    #[error("Entity '{entity}' does not own the requested parent node")]
    ForeignParent {
        /// Entity name
        entity: String,
    },

    /// An entity failed to initialise and was removed again
    #[error("Failed to initialise entity '{name}': {source}")]
    EntityInit {
        /// Entity name
        name: String,
        /// What went wrong
        #[source]
        source: ComponentError,
    },

    /// A component operation failed
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// The entity has no audio component
    #[error("Entity '{0}' has no sound")]
    NoSound(String),

    /// A level file could not be read
    #[error("Level error: {0}")]
    Level(#[from] ConfigError),
}

/// A level's worth of entities
#[derive(Debug)]
pub struct Scene {
    graph: SceneGraph,
    entities: EntityMap<Entity>,
    order: Vec<EntityHandle>,
    registry: SceneRegistry,
    lights: SceneLights,
    player: Option<EntityHandle>,
}

impl Scene {
    /// Empty scene
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            graph: SceneGraph::new(),
            entities: EntityMap::with_key(),
            order: Vec::new(),
            registry: SceneRegistry::new(),
            lights: SceneLights::new(config),
            player: None,
        }
    }

    /// Node arena
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Node arena, for transform changes
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Light registry
    pub fn lights(&self) -> &SceneLights {
        &self.lights
    }

    /// Light registry, mutably
    pub fn lights_mut(&mut self) -> &mut SceneLights {
        &mut self.lights
    }

    /// Mesh and collision lists
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    /// Create an empty entity
    pub fn spawn_entity(&mut self, name: impl Into<String>) -> EntityHandle {
        let name = name.into();
        let handle = self.entities.insert_with_key(|h| Entity::new(h, name));
        self.order.push(handle);
        handle
    }

    /// Look up an entity
    pub fn entity(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.get(handle)
    }

    /// Look up an entity mutably
    pub fn entity_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.entities.get_mut(handle)
    }

    /// First entity with the given name
    pub fn entity_by_name(&self, name: &str) -> Option<EntityHandle> {
        self.order
            .iter()
            .copied()
            .find(|&h| self.entities.get(h).is_some_and(|e| e.name() == name))
    }

    /// Entities in spawn order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|&h| self.entities.get(h))
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Attach a node to an entity; the first node becomes its root
    pub fn attach_component(
        &mut self,
        entity: EntityHandle,
        node: SceneNode,
    ) -> Result<NodeHandle, SceneError> {
        let e = self.entities.get_mut(entity).ok_or(SceneError::UnknownEntity(entity))?;
        Ok(e.attach_component(&mut self.graph, &mut self.registry, node))
    }

    /// Attach a node under one of the entity's nodes
    pub fn attach_child_to_component(
        &mut self,
        entity: EntityHandle,
        parent: NodeHandle,
        node: SceneNode,
    ) -> Result<NodeHandle, SceneError> {
        let e = self.entities.get_mut(entity).ok_or(SceneError::UnknownEntity(entity))?;
        e.attach_child_to_component(&mut self.graph, &mut self.registry, parent, node)
            .ok_or_else(|| SceneError::ForeignParent {
                entity: e.name().to_string(),
            })
    }

    /// Give an entity a component without a transform
    pub fn add_component(
        &mut self,
        entity: EntityHandle,
        component: impl Into<Component>,
    ) -> Result<(), SceneError> {
        let e = self.entities.get_mut(entity).ok_or(SceneError::UnknownEntity(entity))?;
        e.add_component(component);
        Ok(())
    }

    /// Initialise every component of an entity
    pub fn init_entity<R, A, P>(
        &mut self,
        entity: EntityHandle,
        ctx: &mut EngineContext<R, A, P>,
    ) -> Result<(), SceneError>
    where
        R: RenderBackend,
        A: AudioBackend,
        P: PhysicsBackend,
    {
        let e = self.entities.get_mut(entity).ok_or(SceneError::UnknownEntity(entity))?;
        let mut services = ctx.services(&mut self.lights);
        e.init(&mut self.graph, &mut services)
            .map_err(|source| SceneError::EntityInit {
                name: e.name().to_string(),
                source,
            })
    }

    /// Mark the entity whose camera renders the scene
    pub fn set_player(&mut self, entity: Option<EntityHandle>) {
        self.player = entity;
    }

    /// The player entity, if set and alive
    pub fn player(&self) -> Option<EntityHandle> {
        self.player.filter(|&h| self.entities.contains_key(h))
    }

    /// Camera of the player entity, or of the first entity with one
    pub fn player_camera(&self) -> Option<&Camera> {
        let camera_of = |h: EntityHandle| {
            let node = self.entities.get(h)?.find_node(&self.graph, ComponentKind::Camera)?;
            Some(self.graph.component(node)?.as_camera()?.camera())
        };

        self.player()
            .and_then(camera_of)
            .or_else(|| self.order.iter().find_map(|&h| camera_of(h)))
    }

    /// Destroy an entity and everything it owns
    pub fn destroy_entity<R, A, P>(
        &mut self,
        entity: EntityHandle,
        ctx: &mut EngineContext<R, A, P>,
    ) -> bool
    where
        R: RenderBackend,
        A: AudioBackend,
        P: PhysicsBackend,
    {
        let Some(mut e) = self.entities.remove(entity) else {
            return false;
        };

        let mut services = ctx.services(&mut self.lights);
        e.destroy(&mut self.graph, &mut self.registry, &mut services);
        self.order.retain(|&h| h != entity);
        if self.player == Some(entity) {
            self.player = None;
        }
        true
    }

    /// Destroy one attached node of an entity and everything below it.
    ///
    /// The owning entity stays alive. Entity roots are refused; destroy the
    /// entity instead.
    pub fn destroy_node<R, A, P>(
        &mut self,
        node: NodeHandle,
        ctx: &mut EngineContext<R, A, P>,
    ) -> bool
    where
        R: RenderBackend,
        A: AudioBackend,
        P: PhysicsBackend,
    {
        let Some(owner) = self.graph.get(node).and_then(SceneNode::owner) else {
            log::debug!("Ignoring destroy of unowned or stale node {node:?}");
            return false;
        };
        let Some(e) = self.entities.get_mut(owner) else {
            return false;
        };

        let mut services = ctx.services(&mut self.lights);
        e.destroy_component(&mut self.graph, &mut self.registry, &mut services, node)
    }

    /// Destroy the first entity with the given name
    pub fn delete_entity_by_name<R, A, P>(
        &mut self,
        name: &str,
        ctx: &mut EngineContext<R, A, P>,
    ) -> bool
    where
        R: RenderBackend,
        A: AudioBackend,
        P: PhysicsBackend,
    {
        match self.entity_by_name(name) {
            Some(handle) => self.destroy_entity(handle, ctx),
            None => {
                log::warn!("No entity named '{name}' to delete");
                false
            }
        }
    }

    /// Destroy every entity and light
    pub fn clear<R, A, P>(&mut self, ctx: &mut EngineContext<R, A, P>)
    where
        R: RenderBackend,
        A: AudioBackend,
        P: PhysicsBackend,
    {
        for handle in std::mem::take(&mut self.order) {
            if let Some(mut e) = self.entities.remove(handle) {
                let mut services = ctx.services(&mut self.lights);
                e.destroy(&mut self.graph, &mut self.registry, &mut services);
            }
        }

        self.entities.clear();
        self.graph = SceneGraph::new();
        self.registry.clear();
        self.lights.clear();
        self.player = None;
    }

    /// Play an entity's sound
    pub fn fire_sound<R, A, P>(
        &mut self,
        entity: EntityHandle,
        params: &SoundParams,
        ctx: &mut EngineContext<R, A, P>,
    ) -> Result<(), SceneError>
    where
        R: RenderBackend,
        A: AudioBackend,
        P: PhysicsBackend,
    {
        let e = self.entities.get_mut(entity).ok_or(SceneError::UnknownEntity(entity))?;
        let mut services = ctx.services(&mut self.lights);

        if let Some(node) = e.find_node(&self.graph, ComponentKind::Audio) {
            let result = self.graph.with_component(node, &mut services, |component, cx| {
                component.as_audio_mut().map(|audio| audio.fire_sound(cx, params))
            });
            if let Some(Some(result)) = result {
                return Ok(result?);
            }
        }

        let owner = Some(entity);
        if let Some(audio) = e.components_mut().iter_mut().find_map(Component::as_audio_mut) {
            let mut cx = ComponentContext::new(&mut self.graph, None, owner, &mut services);
            return Ok(audio.fire_sound(&mut cx, params)?);
        }

        Err(SceneError::NoSound(e.name().to_string()))
    }

    /// Advance one frame.
    ///
    /// Every entity's node tree is updated before any non-transform
    /// component runs; physics is stepped and collision nodes synced last.
    pub fn update<R, A, P>(&mut self, ctx: &mut EngineContext<R, A, P>, delta_ms: f32)
    where
        R: RenderBackend,
        A: AudioBackend,
        P: PhysicsBackend,
    {
        {
            let mut services = ctx.services(&mut self.lights);

            for &handle in &self.order {
                if let Some(e) = self.entities.get_mut(handle) {
                    e.update_transforms(&mut self.graph, &mut services, delta_ms);
                }
            }

            for &handle in &self.order {
                if let Some(e) = self.entities.get_mut(handle) {
                    e.update_components(&mut self.graph, &mut services, delta_ms);
                }
            }
        }

        ctx.physics.step(delta_ms);
        self.sync_collisions(&ctx.physics);
    }

    /// Move every collision node back when it collides, otherwise to where
    /// physics put its body
    fn sync_collisions(&mut self, physics: &dyn PhysicsBackend) {
        for &node in self.registry.collision_nodes() {
            let Some(body) = self
                .graph
                .component(node)
                .and_then(Component::as_collision)
                .and_then(|c| c.body())
            else {
                continue;
            };
            let Some(current) = self.graph.get(node) else {
                continue;
            };

            let target = if physics.is_colliding(body) {
                current.previous_world_position()
            } else {
                match physics.body_position(body) {
                    Some(position) => position,
                    None => continue,
                }
            };

            // Also when unchanged: refreshes the previous world position
            self.graph.set_world_position(node, target);
        }
    }

    /// Submit every visible mesh.
    ///
    /// Shadow passes skip meshes that cast no shadow. Handles whose node is
    /// gone are skipped.
    pub fn render<R, A, P>(&self, ctx: &mut EngineContext<R, A, P>, shadow_pass: bool)
    where
        R: RenderBackend,
        A: AudioBackend,
        P: PhysicsBackend,
    {
        self.render_to(&mut ctx.renderer, shadow_pass);
    }

    /// Submit every visible mesh to an explicit renderer
    pub fn render_to(&self, renderer: &mut dyn RenderBackend, shadow_pass: bool) {
        if let Some(camera) = self.player_camera() {
            renderer.set_view_projection(&camera.view_matrix(), &camera.projection_matrix());
        }
        renderer.set_lights(&self.lights);

        for &handle in self.registry.mesh_nodes() {
            let Some(node) = self.graph.get(handle) else {
                log::trace!("Skipping dead mesh node {handle:?}");
                continue;
            };
            let Some(owner) = node.owner() else {
                continue;
            };
            if !self.entities.get(owner).is_some_and(|e| e.visible) {
                continue;
            }

            if let Some(mesh) = node.component().and_then(Component::as_mesh) {
                mesh.render(renderer, shadow_pass, handle, owner, node.world_matrix());
            }
        }
    }
}
