//! Resource Manager - shared mesh cache
//!
//! Meshes are loaded once per file name and handed out as `Arc`s, so every
//! component using the same file shares one copy. A second request for a
//! cached file counts as a reuse.

use std::collections::HashMap;
use std::sync::Arc;

use super::mesh::StaticMesh;
use super::source::MeshSource;
use super::AssetError;
use crate::animation::{SkeletalMesh, DEFAULT_TICKS_PER_SECOND};

/// Resource Manager - caches meshes by file name
pub struct ResourceManager {
    source: Box<dyn MeshSource>,
    default_ticks_per_second: f32,
    static_meshes: HashMap<String, Arc<StaticMesh>>,
    skeletal_meshes: HashMap<String, Arc<SkeletalMesh>>,
    resources_reused: usize,
}

impl ResourceManager {
    /// Create a manager reading from `source`
    pub fn new(source: Box<dyn MeshSource>) -> Self {
        Self {
            source,
            default_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            static_meshes: HashMap::new(),
            skeletal_meshes: HashMap::new(),
            resources_reused: 0,
        }
    }

    /// Tick rate given to clips that declare none
    #[must_use]
    pub fn with_default_ticks_per_second(mut self, ticks_per_second: f32) -> Self {
        self.default_ticks_per_second = ticks_per_second;
        self
    }

    /// Get a rigid mesh, loading it on first use
    pub fn get_static_mesh(&mut self, file: &str) -> Result<Arc<StaticMesh>, AssetError> {
        if let Some(mesh) = self.static_meshes.get(file) {
            self.resources_reused += 1;
            return Ok(Arc::clone(mesh));
        }

        let mesh = Arc::new(self.source.load(file)?.into_static(file)?);
        log::debug!("Loaded static mesh '{file}'");
        self.static_meshes.insert(file.to_string(), Arc::clone(&mesh));
        Ok(mesh)
    }

    /// Get a skinned mesh, loading it on first use
    pub fn get_skeletal_mesh(&mut self, file: &str) -> Result<Arc<SkeletalMesh>, AssetError> {
        if let Some(mesh) = self.skeletal_meshes.get(file) {
            self.resources_reused += 1;
            return Ok(Arc::clone(mesh));
        }

        let mesh = Arc::new(
            self.source
                .load(file)?
                .into_skeletal(file, self.default_ticks_per_second)?,
        );
        log::debug!(
            "Loaded skeletal mesh '{file}' ({} bones, {} clips)",
            mesh.bone_count(),
            mesh.clips().len()
        );
        self.skeletal_meshes.insert(file.to_string(), Arc::clone(&mesh));
        Ok(mesh)
    }

    /// Number of distinct meshes loaded
    pub fn resources_loaded(&self) -> usize {
        self.static_meshes.len() + self.skeletal_meshes.len()
    }

    /// Number of requests served from the cache
    pub fn resources_reused(&self) -> usize {
        self.resources_reused
    }

    /// Log cache statistics
    pub fn log_stats(&self) {
        log::info!(
            "Resources loaded: {}, reused: {}",
            self.resources_loaded(),
            self.resources_reused
        );
    }

    /// Drop every cached mesh; components holding an `Arc` keep theirs alive
    pub fn clear(&mut self) {
        self.static_meshes.clear();
        self.skeletal_meshes.clear();
        self.resources_reused = 0;
    }
}
