//! Skeletal animation
//!
//! Bone palettes are recomputed from scratch on every request: sample each
//! channel at the current tick, walk the hierarchy from the root, and wrap
//! every bone's accumulated transform with its offset and the global inverse.

pub mod clip;
pub mod keyframe;
pub mod palette;
pub mod skeletal_mesh;
pub mod skeleton;

pub use clip::{AnimationClip, NodeChannel, DEFAULT_TICKS_PER_SECOND};
pub use keyframe::{QuatKey, VectorKey};
pub use palette::BonePalette;
pub use skeletal_mesh::SkeletalMesh;
pub use skeleton::{Bone, Skeleton, SkeletonNode};

use thiserror::Error;

/// Animation errors
#[derive(Debug, Error)]
pub enum AnimationError {
    /// The hierarchy has no root node
    #[error("Skeleton has no root node")]
    MissingRoot,

    /// Child indices are out of range or form a cycle
    #[error("Invalid bone hierarchy: {0}")]
    InvalidHierarchy(String),

    /// A requested clip does not exist
    #[error("Mesh '{mesh}' has no clip {index} ({available} available)")]
    MissingClip {
        /// Mesh name
        mesh: String,
        /// Requested clip index
        index: usize,
        /// Number of clips on the mesh
        available: usize,
    },

    /// A channel has empty or unordered tracks
    #[error("Invalid channel for node '{node}': {reason}")]
    InvalidChannel {
        /// Animated node name
        node: String,
        /// What is wrong
        reason: String,
    },

    /// A clip duration is negative or not finite
    #[error("Clip '{clip}' has invalid duration {duration}")]
    InvalidDuration {
        /// Clip name
        clip: String,
        /// Declared duration in ticks
        duration: f32,
    },
}
