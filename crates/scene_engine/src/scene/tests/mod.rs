//! Scene-level behavior: propagation, the frame drive, rendering and levels

use approx::assert_relative_eq;

use crate::backend::{
    BodyDesc, BodyHandle, CollisionShape, HeadlessAudio, HeadlessPhysics, PhysicsBackend,
    RecordingRenderer,
};
use crate::core::{EngineConfig, EngineContext, SceneConfig};
use crate::ecs::{Camera, CollisionComponent, Component, LightSource, MeshRenderComponent};
use crate::foundation::math::{Mat4Ext, Vec3};
use crate::level::{
    load_level, load_level_file, spawn_entity, Archetype, CollisionDefinition, EntityDefinition,
    LevelDefinition,
};
use crate::scene::{AmbientLight, PointLight, Scene, SceneNode};
use crate::test_support;

fn crate_at(name: &str, position: Vec3) -> EntityDefinition {
    let mut definition = EntityDefinition::new(
        name,
        Archetype::StaticMesh {
            mesh: "meshes/crate.ron".to_string(),
            collision: CollisionDefinition::default(),
            casts_shadow: true,
        },
    );
    definition.position = position;
    definition
}

fn slider(name: &str) -> EntityDefinition {
    EntityDefinition::new(
        name,
        Archetype::SkeletalMesh {
            mesh: "meshes/slider.ron".to_string(),
            clip: 0,
            collision: CollisionDefinition {
                flags: 4,
                ..CollisionDefinition::default()
            },
            casts_shadow: true,
        },
    )
}

/// Physics that drops every body one unit per step
#[derive(Debug, Default)]
struct Gravity(HeadlessPhysics);

impl PhysicsBackend for Gravity {
    fn track_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        self.0.track_body(desc)
    }

    fn untrack_body(&mut self, body: BodyHandle) {
        self.0.untrack_body(body);
    }

    fn set_body_position(&mut self, body: BodyHandle, position: Vec3) {
        self.0.set_body_position(body, position);
    }

    fn body_position(&self, body: BodyHandle) -> Option<Vec3> {
        self.0.body_position(body)
    }

    fn is_colliding(&self, body: BodyHandle) -> bool {
        self.0.is_colliding(body)
    }

    fn step(&mut self, delta_ms: f32) {
        for body in self.0.tracked_bodies() {
            if let Some(position) = self.0.body_position(body) {
                self.0.set_body_position(body, position - Vec3::new(0.0, 1.0, 0.0));
            }
        }
        self.0.step(delta_ms);
    }

    fn tracked_bodies(&self) -> Vec<BodyHandle> {
        self.0.tracked_bodies()
    }
}

#[test]
fn test_moving_a_parent_moves_its_child() {
    let mut scene = Scene::new(&SceneConfig::default());
    let e = scene.spawn_entity("pair");
    let root = scene.attach_component(e, SceneNode::new("root")).unwrap();
    let child = scene.attach_component(e, SceneNode::new("child")).unwrap();

    scene.graph_mut().set_position(child, Vec3::new(1.0, 0.0, 0.0));
    scene.graph_mut().set_position(root, Vec3::new(5.0, 0.0, 0.0));

    assert_eq!(scene.graph().world_position(child), Some(Vec3::new(6.0, 0.0, 0.0)));
    assert_eq!(scene.graph().get(child).unwrap().previous_world_position(), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_skinned_entity_reaches_halfway_after_half_a_second() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    let dancer = spawn_entity(&mut scene, &mut ctx, &slider("dancer")).unwrap();

    scene.update(&mut ctx, 250.0);
    scene.update(&mut ctx, 250.0);
    scene.render(&mut ctx, false);

    let draws: Vec<_> = ctx.renderer.draws_in_pass(false).collect();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].owner, dancer);
    assert_eq!(draws[0].mesh_name, "meshes/slider.ron");
    assert_eq!(draws[0].bones.len(), 1);
    assert_relative_eq!(draws[0].bones[0].translation(), Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-4);
}

#[test]
fn test_destroyed_entity_leaves_the_mesh_list() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    let doomed = spawn_entity(&mut scene, &mut ctx, &crate_at("doomed", Vec3::zeros())).unwrap();
    let kept = spawn_entity(&mut scene, &mut ctx, &crate_at("kept", Vec3::new(3.0, 0.0, 0.0))).unwrap();
    assert_eq!(scene.registry().mesh_nodes().len(), 2);

    assert!(scene.destroy_entity(doomed, &mut ctx));
    assert_eq!(scene.registry().mesh_nodes().len(), 1);
    assert_eq!(scene.registry().collision_nodes().len(), 1);

    scene.update(&mut ctx, 16.0);
    scene.render(&mut ctx, false);
    let owners: Vec<_> = ctx.renderer.draws.iter().map(|d| d.owner).collect();
    assert_eq!(owners, vec![kept]);
}

#[test]
fn test_destroyed_child_nodes_leave_the_flat_lists() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    let cart = scene.spawn_entity("cart");
    let root = scene.attach_component(cart, SceneNode::new("cart")).unwrap();
    let wheel = scene
        .attach_component(
            cart,
            SceneNode::with_component("wheel", MeshRenderComponent::new_static("meshes/crate.ron").into()),
        )
        .unwrap();
    let bumper = scene
        .attach_component(
            cart,
            SceneNode::with_component("bumper", CollisionComponent::new(CollisionShape::Box).into()),
        )
        .unwrap();
    scene.init_entity(cart, &mut ctx).unwrap();
    assert_eq!(ctx.physics.body_count(), 1);

    assert!(!scene.destroy_node(root, &mut ctx));
    assert!(scene.destroy_node(wheel, &mut ctx));
    assert!(scene.destroy_node(bumper, &mut ctx));
    assert!(!scene.destroy_node(bumper, &mut ctx));

    assert!(scene.registry().mesh_nodes().is_empty());
    assert!(scene.registry().collision_nodes().is_empty());
    assert_eq!(ctx.physics.body_count(), 0);
    assert!(scene.graph().get(root).unwrap().children().is_empty());
    assert_eq!(scene.entity(cart).unwrap().root(), Some(root));

    scene.update(&mut ctx, 16.0);
    scene.render(&mut ctx, false);
    assert!(ctx.renderer.draws.is_empty());
}

#[test]
fn test_render_skips_invisible_entities_and_shadowless_meshes() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    let lit = spawn_entity(&mut scene, &mut ctx, &crate_at("lit", Vec3::zeros())).unwrap();

    let mut flat = crate_at("flat", Vec3::new(3.0, 0.0, 0.0));
    if let Archetype::StaticMesh { casts_shadow, .. } = &mut flat.archetype {
        *casts_shadow = false;
    }
    let flat = spawn_entity(&mut scene, &mut ctx, &flat).unwrap();

    let mut hidden = crate_at("hidden", Vec3::new(6.0, 0.0, 0.0));
    hidden.visible = false;
    spawn_entity(&mut scene, &mut ctx, &hidden).unwrap();

    scene.render(&mut ctx, true);
    scene.render(&mut ctx, false);

    let shadow: Vec<_> = ctx.renderer.draws_in_pass(true).map(|d| d.owner).collect();
    let color: Vec<_> = ctx.renderer.draws_in_pass(false).map(|d| d.owner).collect();
    assert_eq!(shadow, vec![lit]);
    assert_eq!(color, vec![lit, flat]);
}

#[test]
fn test_render_uses_the_player_camera_and_lights() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    let mut eye = EntityDefinition::new(
        "eye",
        Archetype::Camera {
            camera: Camera::default(),
            player: true,
        },
    );
    eye.position = Vec3::new(0.0, 2.0, 8.0);
    let eye = spawn_entity(&mut scene, &mut ctx, &eye).unwrap();
    spawn_entity(
        &mut scene,
        &mut ctx,
        &EntityDefinition::new("bulb", Archetype::Light(LightSource::Point(PointLight::default()))),
    )
    .unwrap();

    scene.render(&mut ctx, false);

    assert_eq!(scene.player(), Some(eye));
    let camera = scene.player_camera().unwrap();
    assert_eq!(camera.position, Vec3::new(0.0, 2.0, 8.0));
    assert_eq!(ctx.renderer.view, camera.view_matrix());
    assert_eq!(ctx.renderer.point_light_count, 1);
}

#[test]
fn test_colliding_node_returns_to_its_previous_position() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    let mover = spawn_entity(&mut scene, &mut ctx, &crate_at("mover", Vec3::zeros())).unwrap();
    let wall = spawn_entity(&mut scene, &mut ctx, &crate_at("wall", Vec3::new(2.0, 0.0, 0.0))).unwrap();
    let mover_root = scene.entity(mover).unwrap().root().unwrap();
    let wall_root = scene.entity(wall).unwrap().root().unwrap();

    scene.update(&mut ctx, 16.0);
    assert_eq!(scene.graph().world_position(mover_root), Some(Vec3::zeros()));

    scene.graph_mut().set_position(mover_root, Vec3::new(1.8, 0.0, 0.0));
    scene.update(&mut ctx, 16.0);

    assert_eq!(scene.graph().world_position(mover_root), Some(Vec3::zeros()));
    assert_eq!(scene.graph().world_position(wall_root), Some(Vec3::new(2.0, 0.0, 0.0)));
}

#[test]
fn test_forced_collision_rolls_back_the_whole_entity() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    let boxed = spawn_entity(&mut scene, &mut ctx, &crate_at("boxed", Vec3::zeros())).unwrap();
    let root = scene.entity(boxed).unwrap().root().unwrap();
    let body = scene
        .graph()
        .component(root)
        .and_then(Component::as_collision)
        .and_then(|c| c.body())
        .unwrap();
    let mesh = scene.registry().mesh_nodes()[0];

    ctx.physics.force_colliding(body, true);
    scene.graph_mut().add_position(root, Vec3::new(0.0, 0.0, 4.0));
    scene.update(&mut ctx, 16.0);

    assert_eq!(scene.graph().world_position(root), Some(Vec3::zeros()));
    assert_eq!(scene.graph().world_position(mesh), Some(Vec3::zeros()));
}

#[test]
fn test_collision_rolls_back_to_last_frame_not_to_an_old_move() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    let parked = spawn_entity(&mut scene, &mut ctx, &crate_at("parked", Vec3::zeros())).unwrap();
    let root = scene.entity(parked).unwrap().root().unwrap();
    let body = scene
        .graph()
        .component(root)
        .and_then(Component::as_collision)
        .and_then(|c| c.body())
        .unwrap();

    scene.graph_mut().set_position(root, Vec3::new(5.0, 0.0, 0.0));
    for _ in 0..5 {
        scene.update(&mut ctx, 16.0);
    }
    assert_eq!(scene.graph().world_position(root), Some(Vec3::new(5.0, 0.0, 0.0)));
    assert_eq!(scene.graph().velocity(root), Some(Vec3::zeros()));

    ctx.physics.force_colliding(body, true);
    scene.update(&mut ctx, 16.0);

    assert_eq!(scene.graph().world_position(root), Some(Vec3::new(5.0, 0.0, 0.0)));
}

#[test]
fn test_free_body_follows_physics() {
    let source = test_support::meshes();
    let mut ctx = EngineContext::new(
        EngineConfig::default(),
        RecordingRenderer::new(),
        HeadlessAudio::new(),
        Gravity::default(),
        Box::new(source),
    );
    let mut scene = Scene::new(&ctx.config.scene);
    let falling = spawn_entity(&mut scene, &mut ctx, &crate_at("falling", Vec3::new(0.0, 10.0, 0.0))).unwrap();
    let root = scene.entity(falling).unwrap().root().unwrap();

    scene.update(&mut ctx, 16.0);
    scene.update(&mut ctx, 16.0);

    assert_eq!(scene.graph().world_position(root), Some(Vec3::new(0.0, 8.0, 0.0)));
    assert_eq!(scene.graph().velocity(root), Some(Vec3::new(0.0, -1.0, 0.0)));
}

#[test]
fn test_update_advances_owned_components_and_steps_physics() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    let dancer = spawn_entity(&mut scene, &mut ctx, &slider("dancer")).unwrap();
    scene
        .add_component(dancer, MeshRenderComponent::new_skeletal("meshes/slider.ron", 0))
        .unwrap();
    scene.init_entity(dancer, &mut ctx).unwrap();

    scene.update(&mut ctx, 100.0);

    let owned = scene.entity(dancer).unwrap().components()[0].as_mesh().unwrap();
    assert_relative_eq!(owned.anim_time().unwrap(), 0.1, epsilon = 1e-6);
    assert_eq!(ctx.physics.steps(), 1);
}

#[test]
fn test_delete_by_name_removes_only_the_first_match() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    spawn_entity(&mut scene, &mut ctx, &crate_at("twin", Vec3::zeros())).unwrap();
    let second = spawn_entity(&mut scene, &mut ctx, &crate_at("twin", Vec3::new(4.0, 0.0, 0.0))).unwrap();

    assert!(scene.delete_entity_by_name("twin", &mut ctx));
    assert_eq!(scene.entity_by_name("twin"), Some(second));
    assert!(scene.delete_entity_by_name("twin", &mut ctx));
    assert!(!scene.delete_entity_by_name("twin", &mut ctx));
    assert_eq!(scene.entity_count(), 0);
}

fn yard() -> LevelDefinition {
    let mut sound = EntityDefinition::new(
        "radio",
        Archetype::Sound {
            source: crate::ecs::SoundSource {
                file: "sounds/song.ogg".to_string(),
                kind: crate::backend::SoundKind::Stream,
            },
            autoplay: Some(crate::backend::SoundParams::default()),
        },
    );
    sound.set_property("Radio", "Station", "101.1");

    LevelDefinition {
        name: "yard".to_string(),
        ambient: Some(AmbientLight::default()),
        entities: vec![
            crate_at("crate_a", Vec3::zeros()),
            crate_at("crate_b", Vec3::new(5.0, 0.0, 0.0)),
            slider("dancer"),
            sound,
            EntityDefinition::new("marker", Archetype::Empty),
        ],
    }
}

#[test]
fn test_level_load_builds_every_entity() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);

    load_level(&mut scene, &mut ctx, &yard()).unwrap();

    assert_eq!(scene.entity_count(), 5);
    assert_eq!(scene.registry().mesh_nodes().len(), 3);
    assert_eq!(scene.registry().collision_nodes().len(), 3);
    assert!(scene.lights().ambient().is_some());
    assert_eq!(ctx.resources.resources_loaded(), 2);
    // Only the second crate is served from the cache
    assert_eq!(ctx.resources.resources_reused(), 1);
    assert_eq!(ctx.audio.loaded_count(), 1);

    let radio = scene.entity_by_name("radio").unwrap();
    let definition = scene.entity(radio).unwrap().definition().unwrap();
    assert_relative_eq!(definition.get_float("Radio", "Station"), 101.1, epsilon = 1e-4);
}

#[test]
fn test_level_load_replaces_the_previous_level() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    load_level(&mut scene, &mut ctx, &yard()).unwrap();

    let small = LevelDefinition {
        name: "small".to_string(),
        ambient: None,
        entities: vec![crate_at("lonely", Vec3::zeros())],
    };
    load_level(&mut scene, &mut ctx, &small).unwrap();

    assert_eq!(scene.entity_count(), 1);
    assert_eq!(ctx.physics.body_count(), 1);
    assert_eq!(ctx.audio.loaded_count(), 0);
    assert!(scene.lights().ambient().is_none());
}

#[test]
fn test_failed_level_load_leaves_an_empty_scene() {
    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    let mut level = yard();
    level.entities.insert(
        2,
        EntityDefinition::new(
            "broken",
            Archetype::StaticMesh {
                mesh: "meshes/missing.ron".to_string(),
                collision: CollisionDefinition::default(),
                casts_shadow: true,
            },
        ),
    );

    assert!(load_level(&mut scene, &mut ctx, &level).is_err());

    assert_eq!(scene.entity_count(), 0);
    assert!(scene.graph().is_empty());
    assert!(scene.registry().mesh_nodes().is_empty());
    assert_eq!(ctx.physics.body_count(), 0);
    assert!(scene.lights().ambient().is_none());
}

#[test]
fn test_level_file_round_trip() {
    use crate::config::Config;

    let dir = std::env::temp_dir().join(format!("scene_engine_level_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("yard.ron");
    yard().save_to_file(&path).unwrap();

    let mut ctx = test_support::context();
    let mut scene = Scene::new(&ctx.config.scene);
    load_level_file(&mut scene, &mut ctx, &path).unwrap();
    assert_eq!(scene.entity_count(), 5);

    std::fs::remove_dir_all(&dir).unwrap();
}
