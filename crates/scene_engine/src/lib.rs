//! # Scene Engine
//!
//! Scene core for a small 3D game engine: a scene-node tree with transform
//! propagation, entities composed from a closed set of components, and a
//! skeletal animation evaluator that turns clips into bone palettes.
//!
//! ## Features
//!
//! - **Scene graph**: local position, Euler rotation and scale per node,
//!   world matrices recomputed down the subtree on every change
//! - **Entities**: one root node per entity plus components without a
//!   transform, with mesh, camera, audio, collision and light variants
//! - **Skeletal animation**: keyframe interpolation, looping, and palette
//!   evaluation against a bone hierarchy
//! - **Levels**: RON or TOML level files spawning entities by archetype
//! - **Backends**: rendering, audio and physics behind traits, with
//!   headless implementations for tools and tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::load_or_default("engine.toml")?;
//!     logging::init(&config.logging);
//!
//!     let mut ctx = EngineContext::headless(config, Box::new(RonMeshSource::new("data")));
//!     let mut scene = Scene::new(&ctx.config.scene);
//!     load_level_file(&mut scene, &mut ctx, "data/levels/demo.ron")?;
//!
//!     let mut timer = FrameTimer::new();
//!     for _ in 0..3 {
//!         scene.update(&mut ctx, timer.tick());
//!         scene.render(&mut ctx, false);
//!     }
//!     Ok(())
//! }
//! ```

pub mod animation;
pub mod assets;
pub mod backend;
pub mod config;
pub mod core;
pub mod ecs;
pub mod foundation;
pub mod level;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        animation::{AnimationClip, BonePalette, SkeletalMesh, Skeleton},
        assets::{InMemoryMeshSource, MeshDescription, MeshSource, ResourceManager, RonMeshSource},
        backend::{
            AudioBackend, HeadlessAudio, HeadlessPhysics, PhysicsBackend, RecordingRenderer,
            RenderBackend, SoundParams,
        },
        config::Config,
        core::{EngineConfig, EngineContext},
        ecs::{
            AudioComponent, Camera, CameraComponent, CollisionComponent, Component, Entity,
            LightComponent, MeshRenderComponent,
        },
        foundation::{
            collections::{EntityHandle, NodeHandle},
            logging,
            math::{Axis, Mat4, Quat, Transform, Vec3},
            time::{FrameTimer, Stopwatch},
        },
        level::{load_level, load_level_file, spawn_entity, EntityDefinition, LevelDefinition},
        scene::{Scene, SceneError, SceneGraph, SceneNode},
    };
}
