//! Entity and component behavior against a headless context

use approx::assert_relative_eq;

use crate::backend::{CollisionShape, SoundKind, SoundParams};
use crate::ecs::{
    AudioComponent, Camera, CameraComponent, CollisionComponent, Component, ComponentKind,
    LightComponent, LightSource, MeshRenderComponent, SoundSource,
};
use crate::foundation::math::{Mat4Ext, Vec3};
use crate::scene::{PointLight, Scene, SceneError, SceneNode, SpotLight};
use crate::test_support;

fn scene() -> Scene {
    Scene::new(&crate::core::SceneConfig::default())
}

fn beep() -> SoundSource {
    SoundSource {
        file: "sounds/beep.wav".to_string(),
        kind: SoundKind::Wave,
    }
}

#[test]
fn test_first_node_becomes_root_and_later_nodes_hang_below() {
    let mut scene = scene();
    let player = scene.spawn_entity("player");

    let root = scene.attach_component(player, SceneNode::new("body")).unwrap();
    let mesh = scene
        .attach_component(
            player,
            SceneNode::with_component("mesh", MeshRenderComponent::new_static("meshes/crate.ron").into()),
        )
        .unwrap();

    let entity = scene.entity(player).unwrap();
    assert_eq!(entity.root(), Some(root));
    assert_eq!(scene.graph().get(mesh).unwrap().parent(), Some(root));
    assert_eq!(scene.graph().get(mesh).unwrap().owner(), Some(player));
    assert_eq!(scene.registry().mesh_nodes(), &[mesh]);
    assert_eq!(entity.find_node(scene.graph(), ComponentKind::MeshRender), Some(mesh));
    assert_eq!(entity.nodes(scene.graph()), vec![root, mesh]);
}

#[test]
fn test_attaching_under_a_foreign_node_is_refused() {
    let mut scene = scene();
    let a = scene.spawn_entity("a");
    let b = scene.spawn_entity("b");
    let a_root = scene.attach_component(a, SceneNode::new("a_root")).unwrap();
    let nodes_before = scene.graph().len();

    let result = scene.attach_child_to_component(b, a_root, SceneNode::new("intruder"));

    assert!(matches!(result, Err(SceneError::ForeignParent { .. })));
    assert_eq!(scene.graph().len(), nodes_before);
}

#[test]
fn test_child_component_attaches_under_chosen_parent() {
    let mut scene = scene();
    let tank = scene.spawn_entity("tank");
    let hull = scene.attach_component(tank, SceneNode::new("hull")).unwrap();
    let turret = scene
        .attach_component(tank, SceneNode::new("turret").at(Vec3::new(0.0, 1.0, 0.0)))
        .unwrap();
    let barrel = scene
        .attach_child_to_component(tank, turret, SceneNode::new("barrel").at(Vec3::new(2.0, 0.0, 0.0)))
        .unwrap();

    assert_eq!(scene.graph().get(barrel).unwrap().parent(), Some(turret));
    assert_eq!(scene.graph().get(turret).unwrap().parent(), Some(hull));
    assert_relative_eq!(
        scene.graph().world_position(barrel).unwrap(),
        Vec3::new(2.0, 1.0, 0.0),
        epsilon = 1e-6
    );
}

#[test]
fn test_owned_audio_plays_at_the_origin() {
    let mut ctx = test_support::context();
    let mut scene = scene();
    let announcer = scene.spawn_entity("announcer");
    scene
        .add_component(announcer, AudioComponent::new(beep()).with_autoplay(SoundParams::default()))
        .unwrap();

    scene.init_entity(announcer, &mut ctx).unwrap();

    let sound = scene.entity(announcer).unwrap().components()[0]
        .as_audio()
        .and_then(AudioComponent::sound)
        .unwrap();
    let state = ctx.audio.sound(sound).unwrap();
    assert_eq!(state.plays, 1);
    assert_eq!(state.position, Vec3::zeros());
}

#[test]
fn test_fire_sound_uses_the_node_position() {
    let mut ctx = test_support::context();
    let mut scene = scene();
    let bell = scene.spawn_entity("bell");
    scene
        .attach_component(
            bell,
            SceneNode::with_component("bell", AudioComponent::new(beep()).into())
                .at(Vec3::new(4.0, 0.0, -1.0)),
        )
        .unwrap();
    scene.init_entity(bell, &mut ctx).unwrap();

    let params = SoundParams {
        volume: 0.5,
        ..SoundParams::default()
    };
    scene.fire_sound(bell, &params, &mut ctx).unwrap();

    let node = scene.entity(bell).unwrap().root().unwrap();
    let sound = scene.graph().component(node).and_then(Component::as_audio).and_then(AudioComponent::sound).unwrap();
    let state = ctx.audio.sound(sound).unwrap();
    assert_eq!(state.plays, 1);
    assert_eq!(state.position, Vec3::new(4.0, 0.0, -1.0));
    assert_eq!(state.last_params, Some(params));
}

#[test]
fn test_fire_sound_without_audio_is_an_error() {
    let mut ctx = test_support::context();
    let mut scene = scene();
    let mute = scene.spawn_entity("mute");
    scene.attach_component(mute, SceneNode::new("mute")).unwrap();

    let result = scene.fire_sound(mute, &SoundParams::default(), &mut ctx);
    assert!(matches!(result, Err(SceneError::NoSound(name)) if name == "mute"));
}

#[test]
fn test_emitter_follows_node_velocity() {
    let mut ctx = test_support::context();
    let mut scene = scene();
    let car = scene.spawn_entity("car");
    let node = scene
        .attach_component(car, SceneNode::with_component("horn", AudioComponent::new(beep()).into()))
        .unwrap();
    scene.init_entity(car, &mut ctx).unwrap();

    scene.graph_mut().add_position(node, Vec3::new(3.0, 0.0, 0.0));
    scene.update(&mut ctx, 16.0);

    let sound = scene.graph().component(node).and_then(Component::as_audio).and_then(AudioComponent::sound).unwrap();
    let state = ctx.audio.sound(sound).unwrap();
    assert_eq!(state.position, Vec3::new(3.0, 0.0, 0.0));
    assert_eq!(state.velocity, Vec3::new(3.0, 0.0, 0.0));
}

#[test]
fn test_failed_init_reports_the_entity() {
    let mut ctx = test_support::context();
    ctx.audio.mark_missing("sounds/beep.wav");
    let mut scene = scene();
    let bell = scene.spawn_entity("bell");
    scene
        .attach_component(bell, SceneNode::with_component("bell", AudioComponent::new(beep()).into()))
        .unwrap();

    let result = scene.init_entity(bell, &mut ctx);
    assert!(matches!(result, Err(SceneError::EntityInit { name, .. }) if name == "bell"));
}

#[test]
fn test_destroy_releases_every_backend_resource() {
    let mut ctx = test_support::context();
    let mut scene = scene();
    let lamp_post = scene.spawn_entity("lamp_post");
    scene
        .attach_component(
            lamp_post,
            SceneNode::with_component("post", CollisionComponent::new(CollisionShape::Box).into()),
        )
        .unwrap();
    scene
        .attach_component(
            lamp_post,
            SceneNode::with_component("lamp", LightComponent::new(LightSource::Point(PointLight::default())).into()),
        )
        .unwrap();
    scene
        .attach_component(lamp_post, SceneNode::with_component("hum", AudioComponent::new(beep()).into()))
        .unwrap();
    scene.add_component(lamp_post, AudioComponent::new(beep())).unwrap();
    scene.init_entity(lamp_post, &mut ctx).unwrap();

    assert_eq!(ctx.physics.body_count(), 1);
    assert_eq!(ctx.audio.loaded_count(), 2);
    assert_eq!(scene.lights().active_point_lights().count(), 1);
    assert_eq!(scene.registry().collision_nodes().len(), 1);

    assert!(scene.destroy_entity(lamp_post, &mut ctx));

    assert_eq!(ctx.physics.body_count(), 0);
    assert_eq!(ctx.audio.loaded_count(), 0);
    assert_eq!(scene.lights().active_point_lights().count(), 0);
    assert!(scene.registry().collision_nodes().is_empty());
    assert!(scene.graph().is_empty());
    assert!(scene.entity(lamp_post).is_none());
    assert!(!scene.destroy_entity(lamp_post, &mut ctx));
}

#[test]
fn test_light_follows_its_node() {
    let mut ctx = test_support::context();
    let mut scene = scene();
    let torch = scene.spawn_entity("torch");
    let node = scene
        .attach_component(
            torch,
            SceneNode::with_component("flame", LightComponent::new(LightSource::Point(PointLight::default())).into())
                .at(Vec3::new(0.0, 5.0, 0.0)),
        )
        .unwrap();
    scene.init_entity(torch, &mut ctx).unwrap();

    let slot = scene.graph().component(node).and_then(Component::as_light).and_then(LightComponent::slot).unwrap();
    assert_eq!(scene.lights().point(slot).unwrap().position, Vec3::new(0.0, 5.0, 0.0));

    scene.graph_mut().set_position(node, Vec3::new(1.0, 5.0, 0.0));
    scene.update(&mut ctx, 16.0);
    assert_eq!(scene.lights().point(slot).unwrap().position, Vec3::new(1.0, 5.0, 0.0));
}

#[test]
fn test_spot_light_aims_with_node_rotation() {
    let mut ctx = test_support::context();
    let mut scene = scene();
    let spot = SpotLight {
        direction: Vec3::new(1.0, 0.0, 0.0),
        ..SpotLight::default()
    };
    let beam = scene.spawn_entity("beam");
    let node = scene
        .attach_component(
            beam,
            SceneNode::with_component("beam", LightComponent::new(LightSource::Spot(spot)).into())
                .rotated(Vec3::new(0.0, 0.0, 90.0)),
        )
        .unwrap();
    scene.init_entity(beam, &mut ctx).unwrap();

    let slot = scene.graph().component(node).and_then(Component::as_light).and_then(LightComponent::slot).unwrap();
    assert_relative_eq!(
        scene.lights().spot(slot).unwrap().direction,
        Vec3::new(0.0, 1.0, 0.0),
        epsilon = 1e-5
    );
}

#[test]
fn test_parented_camera_follows_its_parent() {
    let mut ctx = test_support::context();
    let mut scene = scene();
    let player = scene.spawn_entity("player");
    let body = scene
        .attach_component(player, SceneNode::new("body").at(Vec3::new(1.0, 2.0, 3.0)))
        .unwrap();
    scene
        .attach_component(
            player,
            SceneNode::with_component("eyes", CameraComponent::new(Camera::default()).into())
                .at(Vec3::new(0.0, 1.0, 0.0)),
        )
        .unwrap();
    scene.init_entity(player, &mut ctx).unwrap();
    assert_eq!(scene.player_camera().unwrap().position, Vec3::new(1.0, 3.0, 3.0));

    scene.graph_mut().set_position(body, Vec3::new(5.0, 2.0, 3.0));
    scene.update(&mut ctx, 16.0);
    assert_eq!(scene.player_camera().unwrap().position, Vec3::new(5.0, 3.0, 3.0));
}

#[test]
fn test_root_camera_drives_its_node() {
    let mut ctx = test_support::context();
    let mut scene = scene();
    let flycam = scene.spawn_entity("flycam");
    let camera = Camera {
        position: Vec3::new(0.0, 10.0, 0.0),
        ..Camera::default()
    };
    let node = scene
        .attach_component(flycam, SceneNode::with_component("lens", CameraComponent::new(camera).into()))
        .unwrap();
    scene.init_entity(flycam, &mut ctx).unwrap();

    assert_eq!(scene.graph().world_position(node), Some(Vec3::new(0.0, 10.0, 0.0)));
}

#[test]
fn test_skinned_mesh_advances_its_clock_on_update() {
    let mut ctx = test_support::context();
    let mut scene = scene();
    let dancer = scene.spawn_entity("dancer");
    let node = scene
        .attach_component(
            dancer,
            SceneNode::with_component("skin", MeshRenderComponent::new_skeletal("meshes/slider.ron", 0).into()),
        )
        .unwrap();
    scene.init_entity(dancer, &mut ctx).unwrap();

    scene.update(&mut ctx, 500.0);

    let mesh = scene.graph().component(node).and_then(Component::as_mesh).unwrap();
    assert_relative_eq!(mesh.anim_time().unwrap(), 0.5, epsilon = 1e-6);
    let palette = mesh.bone_palette().unwrap();
    assert_eq!(palette.len(), 1);
    assert_relative_eq!(
        palette.as_slice()[0].translation(),
        Vec3::new(5.0, 0.0, 0.0),
        epsilon = 1e-4
    );
}

#[test]
fn test_missing_mesh_fails_init() {
    let mut ctx = test_support::context();
    let mut scene = scene();
    let ghost = scene.spawn_entity("ghost");
    scene
        .attach_component(
            ghost,
            SceneNode::with_component("skin", MeshRenderComponent::new_static("meshes/ghost.ron").into()),
        )
        .unwrap();

    assert!(scene.init_entity(ghost, &mut ctx).is_err());
}
