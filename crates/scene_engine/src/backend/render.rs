//! # Render Backend Abstraction
//!
//! The scene hands the renderer one [`MeshDrawCall`] per visible mesh
//! component. Draw calls borrow scene data for the duration of the call only;
//! the backend copies whatever it needs to keep.

use crate::foundation::collections::{EntityHandle, NodeHandle};
use crate::foundation::math::Mat4;
use crate::scene::SceneLights;

/// A single mesh submission
#[derive(Debug, Clone, Copy)]
pub struct MeshDrawCall<'a> {
    /// Node the mesh component is attached to
    pub node: NodeHandle,
    /// Entity owning the component
    pub owner: EntityHandle,
    /// Name of the mesh asset
    pub mesh_name: &'a str,
    /// World matrix of the node
    pub world: &'a Mat4,
    /// Bone palette for skinned meshes
    pub bones: Option<&'a [Mat4]>,
}

/// # Render Backend Trait
///
/// Implemented by whatever draws the frame. The scene calls
/// [`RenderBackend::set_view_projection`] and [`RenderBackend::set_lights`]
/// once per pass and then submits meshes in flat-list order.
pub trait RenderBackend {
    /// Camera matrices for the following submissions
    fn set_view_projection(&mut self, view: &Mat4, projection: &Mat4);

    /// Current light setup for the following submissions
    fn set_lights(&mut self, lights: &SceneLights);

    /// Draw one mesh; `shadow_pass` selects the depth-only path
    fn render_mesh(&mut self, shadow_pass: bool, draw: &MeshDrawCall<'_>);
}

/// Owned copy of a draw call, kept by [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    /// Node the mesh component is attached to
    pub node: NodeHandle,
    /// Entity owning the component
    pub owner: EntityHandle,
    /// Name of the mesh asset
    pub mesh_name: String,
    /// World matrix at submission time
    pub world: Mat4,
    /// Bone palette at submission time, empty for static meshes
    pub bones: Vec<Mat4>,
    /// Whether this was a shadow pass submission
    pub shadow_pass: bool,
}

/// Headless renderer that records every submission
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    /// Submissions since the last [`RecordingRenderer::clear`]
    pub draws: Vec<RecordedDraw>,
    /// Last view matrix received
    pub view: Mat4,
    /// Last projection matrix received
    pub projection: Mat4,
    /// Active point light count at the last `set_lights`
    pub point_light_count: usize,
    /// Active spot light count at the last `set_lights`
    pub spot_light_count: usize,
}

impl RecordingRenderer {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget recorded submissions
    pub fn clear(&mut self) {
        self.draws.clear();
    }

    /// Submissions made for one pass
    pub fn draws_in_pass(&self, shadow_pass: bool) -> impl Iterator<Item = &RecordedDraw> {
        self.draws.iter().filter(move |d| d.shadow_pass == shadow_pass)
    }
}

impl RenderBackend for RecordingRenderer {
    fn set_view_projection(&mut self, view: &Mat4, projection: &Mat4) {
        self.view = *view;
        self.projection = *projection;
    }

    fn set_lights(&mut self, lights: &SceneLights) {
        self.point_light_count = lights.active_point_lights().count();
        self.spot_light_count = lights.active_spot_lights().count();
    }

    fn render_mesh(&mut self, shadow_pass: bool, draw: &MeshDrawCall<'_>) {
        log::trace!("Recording draw of '{}' (shadow: {})", draw.mesh_name, shadow_pass);
        self.draws.push(RecordedDraw {
            node: draw.node,
            owner: draw.owner,
            mesh_name: draw.mesh_name.to_string(),
            world: *draw.world,
            bones: draw.bones.map(<[Mat4]>::to_vec).unwrap_or_default(),
            shadow_pass,
        });
    }
}
