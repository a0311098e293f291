//! Static (rigid) meshes

use crate::foundation::bounds::Aabb;

/// A loaded rigid mesh
///
/// Vertex data stays with the renderer; the core only needs the name the
/// renderer knows the mesh by and its bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMesh {
    name: String,
    bounds: Aabb,
}

impl StaticMesh {
    /// Create a mesh record
    pub fn new(name: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }

    /// Asset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local-space bounds
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }
}
