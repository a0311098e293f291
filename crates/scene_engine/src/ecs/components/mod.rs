//! Component variants

pub mod audio;
pub mod camera;
pub mod collision;
pub mod light;
pub mod mesh;

pub use audio::{AudioComponent, SoundSource};
pub use camera::{Camera, CameraComponent};
pub use collision::CollisionComponent;
pub use light::{LightComponent, LightSource};
pub use mesh::{MeshPayload, MeshRenderComponent, SkeletalPayload};
