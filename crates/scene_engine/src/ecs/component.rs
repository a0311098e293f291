//! Components and their lifecycle
//!
//! A component is one variant of the closed [`Component`] sum type. Each
//! variant implements [`ComponentBehavior`]; the enum dispatches with an
//! exhaustive `match`, so adding a variant is a compile error until every
//! call site handles it.

use thiserror::Error;

use super::components::{
    AudioComponent, CameraComponent, CollisionComponent, LightComponent, MeshRenderComponent,
};
use crate::animation::AnimationError;
use crate::assets::{AssetError, ResourceManager};
use crate::backend::{AudioBackend, BackendError, PhysicsBackend};
use crate::core::config::AnimationConfig;
use crate::foundation::collections::{EntityHandle, NodeHandle};
use crate::foundation::math::{Mat4, Vec3};
use crate::scene::{SceneGraph, SceneLights};

/// Component errors
#[derive(Debug, Error)]
pub enum ComponentError {
    /// A mesh could not be loaded
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// A backend refused a request
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// A bone palette could not be evaluated
    #[error("Animation error: {0}")]
    Animation(#[from] AnimationError),
}

/// Collaborators a component may talk to
pub struct ComponentServices<'a> {
    /// Sound output
    pub audio: &'a mut dyn AudioBackend,
    /// Collision world
    pub physics: &'a mut dyn PhysicsBackend,
    /// Mesh cache
    pub resources: &'a mut ResourceManager,
    /// Light registry of the current scene
    pub lights: &'a mut SceneLights,
    /// Animation settings
    pub animation: &'a AnimationConfig,
}

/// Everything a component sees while it runs
pub struct ComponentContext<'c, 'a> {
    /// The graph the component lives in
    pub graph: &'c mut SceneGraph,
    /// Node carrying the component, `None` for non-transform components
    pub node: Option<NodeHandle>,
    /// Entity owning the component
    pub owner: Option<EntityHandle>,
    /// Collaborators
    pub services: &'c mut ComponentServices<'a>,
}

impl<'c, 'a> ComponentContext<'c, 'a> {
    /// Bundle the pieces
    pub fn new(
        graph: &'c mut SceneGraph,
        node: Option<NodeHandle>,
        owner: Option<EntityHandle>,
        services: &'c mut ComponentServices<'a>,
    ) -> Self {
        Self {
            graph,
            node,
            owner,
            services,
        }
    }

    /// World matrix of the carrying node
    pub fn world_matrix(&self) -> Option<Mat4> {
        self.graph.world_matrix(self.node?).copied()
    }

    /// World position of the carrying node
    pub fn world_position(&self) -> Option<Vec3> {
        self.graph.world_position(self.node?)
    }

    /// World-space velocity of the carrying node
    pub fn velocity(&self) -> Option<Vec3> {
        self.graph.velocity(self.node?)
    }

    /// Whether the carrying node has a parent
    pub fn is_parented(&self) -> bool {
        self.node
            .and_then(|n| self.graph.get(n))
            .is_some_and(|n| n.parent().is_some())
    }
}

/// Lifecycle shared by every component variant
pub trait ComponentBehavior {
    /// Acquire resources; runs once after the component is attached
    fn init(&mut self, _cx: &mut ComponentContext<'_, '_>) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Per-frame update, `delta_ms` in milliseconds
    fn update(&mut self, cx: &mut ComponentContext<'_, '_>, delta_ms: f32);

    /// Release resources; the carrying node may already be gone
    fn destroy(&mut self, _services: &mut ComponentServices<'_>) {}
}

/// Which variant a component is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Static or skeletal mesh
    MeshRender,
    /// View point
    Camera,
    /// Sound emitter
    Audio,
    /// Physics body
    Collision,
    /// Point or spot light
    Light,
}

/// A component attached to a node or held by an entity
#[derive(Debug)]
pub enum Component {
    /// Static or skeletal mesh
    MeshRender(MeshRenderComponent),
    /// View point
    Camera(CameraComponent),
    /// Sound emitter
    Audio(AudioComponent),
    /// Physics body
    Collision(CollisionComponent),
    /// Point or spot light
    Light(LightComponent),
}

impl Component {
    /// Variant tag
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::MeshRender(_) => ComponentKind::MeshRender,
            Self::Camera(_) => ComponentKind::Camera,
            Self::Audio(_) => ComponentKind::Audio,
            Self::Collision(_) => ComponentKind::Collision,
            Self::Light(_) => ComponentKind::Light,
        }
    }

    fn behavior_mut(&mut self) -> &mut dyn ComponentBehavior {
        match self {
            Self::MeshRender(c) => c,
            Self::Camera(c) => c,
            Self::Audio(c) => c,
            Self::Collision(c) => c,
            Self::Light(c) => c,
        }
    }

    /// Run the variant's init
    pub fn init(&mut self, cx: &mut ComponentContext<'_, '_>) -> Result<(), ComponentError> {
        self.behavior_mut().init(cx)
    }

    /// Run the variant's update
    pub fn update(&mut self, cx: &mut ComponentContext<'_, '_>, delta_ms: f32) {
        self.behavior_mut().update(cx, delta_ms);
    }

    /// Run the variant's destroy
    pub fn destroy(&mut self, services: &mut ComponentServices<'_>) {
        self.behavior_mut().destroy(services);
    }

    /// Mesh payload, if this is a mesh component
    pub fn as_mesh(&self) -> Option<&MeshRenderComponent> {
        match self {
            Self::MeshRender(c) => Some(c),
            _ => None,
        }
    }

    /// Mesh payload, mutably
    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshRenderComponent> {
        match self {
            Self::MeshRender(c) => Some(c),
            _ => None,
        }
    }

    /// Camera payload
    pub fn as_camera(&self) -> Option<&CameraComponent> {
        match self {
            Self::Camera(c) => Some(c),
            _ => None,
        }
    }

    /// Camera payload, mutably
    pub fn as_camera_mut(&mut self) -> Option<&mut CameraComponent> {
        match self {
            Self::Camera(c) => Some(c),
            _ => None,
        }
    }

    /// Audio payload
    pub fn as_audio(&self) -> Option<&AudioComponent> {
        match self {
            Self::Audio(c) => Some(c),
            _ => None,
        }
    }

    /// Audio payload, mutably
    pub fn as_audio_mut(&mut self) -> Option<&mut AudioComponent> {
        match self {
            Self::Audio(c) => Some(c),
            _ => None,
        }
    }

    /// Collision payload
    pub fn as_collision(&self) -> Option<&CollisionComponent> {
        match self {
            Self::Collision(c) => Some(c),
            _ => None,
        }
    }

    /// Light payload
    pub fn as_light(&self) -> Option<&LightComponent> {
        match self {
            Self::Light(c) => Some(c),
            _ => None,
        }
    }
}

impl From<MeshRenderComponent> for Component {
    fn from(c: MeshRenderComponent) -> Self {
        Self::MeshRender(c)
    }
}

impl From<CameraComponent> for Component {
    fn from(c: CameraComponent) -> Self {
        Self::Camera(c)
    }
}

impl From<AudioComponent> for Component {
    fn from(c: AudioComponent) -> Self {
        Self::Audio(c)
    }
}

impl From<CollisionComponent> for Component {
    fn from(c: CollisionComponent) -> Self {
        Self::Collision(c)
    }
}

impl From<LightComponent> for Component {
    fn from(c: LightComponent) -> Self {
        Self::Light(c)
    }
}
