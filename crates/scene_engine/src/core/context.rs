//! Engine context
//!
//! Owns the configuration, the collaborator backends and the mesh cache for
//! one run. Scenes borrow it for every update and render call instead of
//! reaching for globals.

use super::config::EngineConfig;
use crate::assets::{MeshSource, ResourceManager};
use crate::backend::{
    AudioBackend, HeadlessAudio, HeadlessPhysics, PhysicsBackend, RecordingRenderer,
    RenderBackend,
};
use crate::ecs::ComponentServices;
use crate::scene::SceneLights;

/// Per-run engine state
pub struct EngineContext<R = RecordingRenderer, A = HeadlessAudio, P = HeadlessPhysics>
where
    R: RenderBackend,
    A: AudioBackend,
    P: PhysicsBackend,
{
    /// Engine configuration
    pub config: EngineConfig,
    /// Draws visible meshes
    pub renderer: R,
    /// Plays sounds
    pub audio: A,
    /// Tracks collision bodies
    pub physics: P,
    /// Shared mesh cache
    pub resources: ResourceManager,
}

impl<R, A, P> EngineContext<R, A, P>
where
    R: RenderBackend,
    A: AudioBackend,
    P: PhysicsBackend,
{
    /// Assemble a context from its parts
    pub fn new(config: EngineConfig, renderer: R, audio: A, physics: P, source: Box<dyn MeshSource>) -> Self {
        let resources = ResourceManager::new(source)
            .with_default_ticks_per_second(config.animation.default_ticks_per_second);
        Self {
            config,
            renderer,
            audio,
            physics,
            resources,
        }
    }

    /// Borrow what components need, together with a scene's lights
    pub fn services<'a>(&'a mut self, lights: &'a mut SceneLights) -> ComponentServices<'a> {
        ComponentServices {
            audio: &mut self.audio,
            physics: &mut self.physics,
            resources: &mut self.resources,
            lights,
            animation: &self.config.animation,
        }
    }
}

impl EngineContext {
    /// Context with recording renderer and in-memory audio and physics
    pub fn headless(config: EngineConfig, source: Box<dyn MeshSource>) -> Self {
        Self::new(
            config,
            RecordingRenderer::new(),
            HeadlessAudio::new(),
            HeadlessPhysics::new(),
            source,
        )
    }
}
