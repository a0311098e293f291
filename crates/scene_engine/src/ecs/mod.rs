//! Entities and components
//!
//! Entities own scene nodes; components are a closed set of variants that are
//! either carried by a node or held by the entity directly.

pub mod component;
pub mod components;
pub mod entity;

pub use component::{
    Component, ComponentBehavior, ComponentContext, ComponentError, ComponentKind,
    ComponentServices,
};
pub use components::{
    AudioComponent, Camera, CameraComponent, CollisionComponent, LightComponent, LightSource,
    MeshPayload, MeshRenderComponent, SoundSource,
};
pub use entity::Entity;

#[cfg(test)]
mod tests;
