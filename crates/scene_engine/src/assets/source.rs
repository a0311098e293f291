//! Mesh sources
//!
//! A [`MeshSource`] turns a file name into a [`MeshDescription`]. The resource
//! manager owns one source and caches what it builds from it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::description::MeshDescription;
use super::AssetError;

/// Where mesh descriptions come from
pub trait MeshSource {
    /// Read the description stored under `file`
    fn load(&mut self, file: &str) -> Result<MeshDescription, AssetError>;
}

/// Reads RON mesh descriptions relative to a root directory
#[derive(Debug, Clone)]
pub struct RonMeshSource {
    root: PathBuf,
}

impl RonMeshSource {
    /// Resolve files against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MeshSource for RonMeshSource {
    fn load(&mut self, file: &str) -> Result<MeshDescription, AssetError> {
        let path = self.root.join(file);
        let contents = std::fs::read_to_string(&path).map_err(|source| AssetError::Io {
            path: path.display().to_string(),
            source,
        })?;

        ron::from_str(&contents).map_err(|e| AssetError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Descriptions registered in memory, for tools and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryMeshSource {
    meshes: HashMap<String, MeshDescription>,
}

impl InMemoryMeshSource {
    /// Empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a description under `file`
    pub fn insert(&mut self, file: impl Into<String>, description: MeshDescription) {
        self.meshes.insert(file.into(), description);
    }

    /// Builder form of [`InMemoryMeshSource::insert`]
    #[must_use]
    pub fn with(mut self, file: impl Into<String>, description: MeshDescription) -> Self {
        self.insert(file, description);
        self
    }
}

impl MeshSource for InMemoryMeshSource {
    fn load(&mut self, file: &str) -> Result<MeshDescription, AssetError> {
        self.meshes
            .get(file)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(file.to_string()))
    }
}
