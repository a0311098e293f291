//! # Backend Module
//!
//! Narrow collaborator interfaces the scene core talks to, plus headless
//! implementations used by the demo and the tests.
//!
//! ## Organization
//!
//! - **Render**: receives one draw call per visible mesh component
//! - **Audio**: loads, plays and positions sounds
//! - **Physics**: tracks collision bodies and reports contacts
//!
//! The core never owns a concrete backend type; everything goes through the
//! traits so a windowed renderer or a real physics library can be plugged in
//! without touching scene code.

pub mod audio;
pub mod physics;
pub mod render;

pub use audio::{AudioBackend, HeadlessAudio, SoundHandle, SoundKind, SoundParams};
pub use physics::{
    BodyDesc, BodyHandle, CollisionFlags, CollisionShape, HeadlessPhysics, PhysicsBackend,
};
pub use render::{MeshDrawCall, RecordedDraw, RecordingRenderer, RenderBackend};

use thiserror::Error;

/// Errors reported by collaborator backends
#[derive(Debug, Error)]
pub enum BackendError {
    /// A sound file could not be opened or decoded
    #[error("Failed to load sound '{path}': {reason}")]
    SoundLoad {
        /// Path that was requested
        path: String,
        /// Backend-specific reason
        reason: String,
    },

    /// A sound handle does not refer to a loaded sound
    #[error("Unknown sound handle: {0:?}")]
    UnknownSound(SoundHandle),
}
