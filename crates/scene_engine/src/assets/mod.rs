//! Asset management
//!
//! Mesh descriptions are read through a [`MeshSource`] and cached by the
//! [`ResourceManager`].

pub mod description;
pub mod mesh;
pub mod resource_manager;
pub mod source;

pub use description::{BoneDescription, ClipDescription, MeshDescription, NodeDescription};
pub use mesh::StaticMesh;
pub use resource_manager::ResourceManager;
pub use source::{InMemoryMeshSource, MeshSource, RonMeshSource};

use thiserror::Error;

use crate::animation::AnimationError;

/// Asset loading errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// The file could not be read
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Resolved path
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not a valid description
    #[error("Failed to parse '{path}': {reason}")]
    Parse {
        /// Resolved path
        path: String,
        /// Parser message
        reason: String,
    },

    /// No description is registered under this name
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// The description is of the other mesh kind
    #[error("Asset '{name}' is not a {expected} mesh")]
    WrongKind {
        /// Asset name
        name: String,
        /// Kind that was requested
        expected: &'static str,
    },

    /// The description is structurally unusable
    #[error("Invalid asset '{name}': {reason}")]
    Invalid {
        /// Asset name
        name: String,
        /// What is wrong
        reason: String,
    },

    /// Skeleton or clip validation failed
    #[error(transparent)]
    Animation(#[from] AnimationError),
}
