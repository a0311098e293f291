//! Scene management
//!
//! ```text
//! Scene
//!  ├── SceneGraph      nodes, transforms, attached components
//!  ├── Entities        root node + non-transform components each
//!  ├── SceneRegistry   flat mesh and collision lists
//!  └── SceneLights     point, spot and ambient lights
//! ```
//!
//! Per frame the scene updates every entity's node tree, then every
//! entity's non-transform components, then steps physics and syncs
//! collision nodes. Rendering walks the flat mesh list.

mod graph;
mod lights;
mod node;
mod registry;
mod scene_manager;

pub use graph::SceneGraph;
pub use lights::{AmbientLight, Attenuation, LightSlot, PointLight, SceneLights, SpotLight};
pub use node::SceneNode;
pub use registry::SceneRegistry;
pub use scene_manager::{Scene, SceneError};

#[cfg(test)]
mod tests;
