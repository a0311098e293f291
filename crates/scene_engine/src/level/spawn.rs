//! Building entities and levels from their definitions

use std::path::Path;

use super::definition::{Archetype, CollisionDefinition, EntityDefinition, LevelDefinition};
use crate::backend::{AudioBackend, PhysicsBackend, RenderBackend};
use crate::config::Config;
use crate::core::EngineContext;
use crate::ecs::{
    AudioComponent, CameraComponent, CollisionComponent, Component, ComponentError,
    LightComponent, MeshRenderComponent,
};
use crate::foundation::bounds::Aabb;
use crate::foundation::collections::EntityHandle;
use crate::foundation::time::Stopwatch;
use crate::scene::{Scene, SceneError, SceneNode};

/// Root node of a spawned entity, placed at the spawn transform
fn root_node(definition: &EntityDefinition, component: Option<Component>) -> SceneNode {
    let node = match component {
        Some(component) => SceneNode::with_component(definition.name.clone(), component),
        None => SceneNode::new(definition.name.clone()),
    };
    node.at(definition.position)
        .rotated(definition.rotation)
        .scaled(definition.scale)
}

fn collision_component(collision: &CollisionDefinition, bounds: Aabb) -> CollisionComponent {
    CollisionComponent::new(collision.shape)
        .with_bounds(bounds)
        .with_dimensions(collision.radius, collision.height)
        .with_flags(collision.collision_flags())
}

fn build<R, A, P>(
    scene: &mut Scene,
    ctx: &mut EngineContext<R, A, P>,
    entity: EntityHandle,
    definition: &EntityDefinition,
) -> Result<(), SceneError>
where
    R: RenderBackend,
    A: AudioBackend,
    P: PhysicsBackend,
{
    match &definition.archetype {
        Archetype::StaticMesh {
            mesh,
            collision,
            casts_shadow,
        } => {
            let mesh = ctx.resources.get_static_mesh(mesh).map_err(ComponentError::from)?;
            let collider = collision_component(collision, *mesh.bounds());
            let root = scene.attach_component(entity, root_node(definition, Some(collider.into())))?;
            let render = MeshRenderComponent::from_static_mesh(mesh).with_shadow(*casts_shadow);
            scene.attach_child_to_component(
                entity,
                root,
                SceneNode::with_component(format!("{}_mesh", definition.name), render.into()),
            )?;
        }
        Archetype::SkeletalMesh {
            mesh,
            clip,
            collision,
            casts_shadow,
        } => {
            let mesh = ctx.resources.get_skeletal_mesh(mesh).map_err(ComponentError::from)?;
            let collider = collision_component(collision, *mesh.bounds());
            let root = scene.attach_component(entity, root_node(definition, Some(collider.into())))?;
            let render =
                MeshRenderComponent::from_skeletal_mesh(mesh, *clip).with_shadow(*casts_shadow);
            scene.attach_child_to_component(
                entity,
                root,
                SceneNode::with_component(format!("{}_mesh", definition.name), render.into()),
            )?;
        }
        Archetype::Sound { source, autoplay } => {
            let mut audio = AudioComponent::new(source.clone());
            if let Some(params) = autoplay {
                audio = audio.with_autoplay(*params);
            }
            scene.attach_component(entity, root_node(definition, Some(audio.into())))?;
        }
        Archetype::Light(source) => {
            let light = LightComponent::new(*source);
            scene.attach_component(entity, root_node(definition, Some(light.into())))?;
        }
        Archetype::Camera { camera, player } => {
            let mut camera = *camera;
            camera.position = definition.position;
            let component = CameraComponent::new(camera);
            scene.attach_component(entity, root_node(definition, Some(component.into())))?;
            if *player {
                scene.set_player(Some(entity));
            }
        }
        Archetype::Empty => {
            scene.attach_component(entity, root_node(definition, None))?;
        }
    }
    Ok(())
}

/// Spawn one entity and initialise its components.
///
/// On failure the half-built entity is destroyed again and nothing of it
/// stays in the scene.
pub fn spawn_entity<R, A, P>(
    scene: &mut Scene,
    ctx: &mut EngineContext<R, A, P>,
    definition: &EntityDefinition,
) -> Result<EntityHandle, SceneError>
where
    R: RenderBackend,
    A: AudioBackend,
    P: PhysicsBackend,
{
    let entity = scene.spawn_entity(definition.name.clone());

    let result = build(scene, ctx, entity, definition).and_then(|()| {
        if let Some(e) = scene.entity_mut(entity) {
            e.visible = definition.visible;
            e.set_definition(definition.clone());
        }
        scene.init_entity(entity, ctx)
    });

    match result {
        Ok(()) => {
            log::debug!("Spawned '{}'", definition.name);
            Ok(entity)
        }
        Err(err) => {
            scene.destroy_entity(entity, ctx);
            Err(err)
        }
    }
}

/// Replace the scene's contents with a level.
///
/// The mesh cache is emptied first. If any entity fails to spawn the scene
/// is cleared again so no partial level is left behind.
pub fn load_level<R, A, P>(
    scene: &mut Scene,
    ctx: &mut EngineContext<R, A, P>,
    level: &LevelDefinition,
) -> Result<(), SceneError>
where
    R: RenderBackend,
    A: AudioBackend,
    P: PhysicsBackend,
{
    let stopwatch = Stopwatch::start_new();

    scene.clear(ctx);
    ctx.resources.clear();
    scene.lights_mut().set_ambient(level.ambient);

    for definition in &level.entities {
        if let Err(err) = spawn_entity(scene, ctx, definition) {
            log::error!("Loading level '{}' failed at '{}': {err}", level.name, definition.name);
            scene.clear(ctx);
            return Err(err);
        }
    }

    log::info!(
        "Loaded level '{}' with {} entities in {:.3}s",
        level.name,
        scene.entity_count(),
        stopwatch.elapsed_secs()
    );
    ctx.resources.log_stats();
    Ok(())
}

/// Read a RON or TOML level file and load it
pub fn load_level_file<R, A, P>(
    scene: &mut Scene,
    ctx: &mut EngineContext<R, A, P>,
    path: impl AsRef<Path>,
) -> Result<(), SceneError>
where
    R: RenderBackend,
    A: AudioBackend,
    P: PhysicsBackend,
{
    let path = path.as_ref();
    let level = LevelDefinition::load_from_file(path)?;
    log::info!("Loading level {}", path.display());
    load_level(scene, ctx, &level)
}
