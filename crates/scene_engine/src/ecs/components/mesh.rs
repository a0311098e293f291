//! Mesh render component
//!
//! Static meshes only need their asset; skeletal meshes also carry a clip
//! index, the animation clock and the bone palette evaluated on every update.

use std::sync::Arc;

use crate::animation::{AnimationError, BonePalette, SkeletalMesh};
use crate::assets::StaticMesh;
use crate::backend::{MeshDrawCall, RenderBackend};
use crate::ecs::component::{ComponentBehavior, ComponentContext, ComponentError};
use crate::foundation::collections::{EntityHandle, NodeHandle};
use crate::foundation::math::Mat4;

/// Skinned mesh state
#[derive(Debug, Clone, Default)]
pub struct SkeletalPayload {
    mesh: Option<Arc<SkeletalMesh>>,
    clip_index: usize,
    anim_time: f32,
    palette: BonePalette,
    playing: bool,
}

/// Static or skeletal mesh data
#[derive(Debug, Clone)]
pub enum MeshPayload {
    /// Rigid mesh
    Static(Option<Arc<StaticMesh>>),
    /// Skinned mesh
    Skeletal(SkeletalPayload),
}

/// Renders a mesh at its node's world transform
#[derive(Debug, Clone)]
pub struct MeshRenderComponent {
    file: String,
    casts_shadow: bool,
    payload: MeshPayload,
}

impl MeshRenderComponent {
    /// Rigid mesh loaded from `file` on init
    pub fn new_static(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            casts_shadow: true,
            payload: MeshPayload::Static(None),
        }
    }

    /// Skinned mesh loaded from `file` on init, playing `clip_index`
    pub fn new_skeletal(file: impl Into<String>, clip_index: usize) -> Self {
        Self {
            file: file.into(),
            casts_shadow: true,
            payload: MeshPayload::Skeletal(SkeletalPayload {
                clip_index,
                playing: true,
                ..SkeletalPayload::default()
            }),
        }
    }

    /// Rigid mesh that is already loaded
    pub fn from_static_mesh(mesh: Arc<StaticMesh>) -> Self {
        Self {
            file: mesh.name().to_string(),
            casts_shadow: true,
            payload: MeshPayload::Static(Some(mesh)),
        }
    }

    /// Skinned mesh that is already loaded, playing `clip_index`
    pub fn from_skeletal_mesh(mesh: Arc<SkeletalMesh>, clip_index: usize) -> Self {
        Self {
            file: mesh.name().to_string(),
            casts_shadow: true,
            payload: MeshPayload::Skeletal(SkeletalPayload {
                mesh: Some(mesh),
                clip_index,
                playing: true,
                ..SkeletalPayload::default()
            }),
        }
    }

    /// Whether the mesh is drawn in the shadow pass
    #[must_use]
    pub fn with_shadow(mut self, casts_shadow: bool) -> Self {
        self.casts_shadow = casts_shadow;
        self
    }

    /// Asset file
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Whether the mesh is drawn in the shadow pass
    pub fn casts_shadow(&self) -> bool {
        self.casts_shadow
    }

    /// Static or skeletal payload
    pub fn payload(&self) -> &MeshPayload {
        &self.payload
    }

    /// Whether this is a skinned mesh
    pub fn is_skeletal(&self) -> bool {
        matches!(self.payload, MeshPayload::Skeletal(_))
    }

    /// Whether the asset has been loaded
    pub fn is_loaded(&self) -> bool {
        match &self.payload {
            MeshPayload::Static(mesh) => mesh.is_some(),
            MeshPayload::Skeletal(skeletal) => skeletal.mesh.is_some(),
        }
    }

    /// Name the renderer knows the mesh by
    pub fn mesh_name(&self) -> Option<&str> {
        match &self.payload {
            MeshPayload::Static(mesh) => mesh.as_deref().map(StaticMesh::name),
            MeshPayload::Skeletal(skeletal) => skeletal.mesh.as_deref().map(SkeletalMesh::name),
        }
    }

    /// Current bone palette of a skinned mesh
    pub fn bone_palette(&self) -> Option<&BonePalette> {
        match &self.payload {
            MeshPayload::Skeletal(skeletal) => Some(&skeletal.palette),
            MeshPayload::Static(_) => None,
        }
    }

    /// Animation clock in seconds
    pub fn anim_time(&self) -> Option<f32> {
        match &self.payload {
            MeshPayload::Skeletal(skeletal) => Some(skeletal.anim_time),
            MeshPayload::Static(_) => None,
        }
    }

    /// Clip being played
    pub fn clip_index(&self) -> Option<usize> {
        match &self.payload {
            MeshPayload::Skeletal(skeletal) => Some(skeletal.clip_index),
            MeshPayload::Static(_) => None,
        }
    }

    /// Switch clips and restart the clock
    pub fn play_clip(&mut self, clip_index: usize) -> Result<(), AnimationError> {
        if let MeshPayload::Skeletal(skeletal) = &mut self.payload {
            skeletal.clip_index = clip_index;
            skeletal.anim_time = 0.0;
            skeletal.playing = true;
        }
        self.evaluate_pose()
    }

    /// Recompute the bone palette at the current clock
    pub fn evaluate_pose(&mut self) -> Result<(), AnimationError> {
        let MeshPayload::Skeletal(skeletal) = &mut self.payload else {
            return Ok(());
        };
        let Some(mesh) = skeletal.mesh.as_ref() else {
            return Ok(());
        };

        if mesh.clips().is_empty() {
            mesh.bind_pose(skeletal.palette.matrices_mut());
            return Ok(());
        }

        let result = mesh.bone_transform_for_clip(
            skeletal.clip_index,
            skeletal.anim_time,
            skeletal.palette.matrices_mut(),
        );
        if result.is_err() {
            skeletal.playing = false;
            mesh.bind_pose(skeletal.palette.matrices_mut());
        }
        result
    }

    /// Submit one draw call; shadow passes skip meshes that cast no shadow
    pub fn render(
        &self,
        renderer: &mut dyn RenderBackend,
        shadow_pass: bool,
        node: NodeHandle,
        owner: EntityHandle,
        world: &Mat4,
    ) {
        if shadow_pass && !self.casts_shadow {
            return;
        }
        let Some(mesh_name) = self.mesh_name() else {
            return;
        };

        renderer.render_mesh(
            shadow_pass,
            &MeshDrawCall {
                node,
                owner,
                mesh_name,
                world,
                bones: self.bone_palette().map(BonePalette::as_slice),
            },
        );
    }
}

impl ComponentBehavior for MeshRenderComponent {
    fn init(&mut self, cx: &mut ComponentContext<'_, '_>) -> Result<(), ComponentError> {
        // Meshes handed in already loaded are not fetched again
        match &mut self.payload {
            MeshPayload::Static(mesh) if mesh.is_none() => {
                *mesh = Some(cx.services.resources.get_static_mesh(&self.file)?);
            }
            MeshPayload::Skeletal(skeletal) if skeletal.mesh.is_none() => {
                skeletal.mesh = Some(cx.services.resources.get_skeletal_mesh(&self.file)?);
            }
            _ => {}
        }
        self.evaluate_pose()?;
        Ok(())
    }

    fn update(&mut self, cx: &mut ComponentContext<'_, '_>, delta_ms: f32) {
        let MeshPayload::Skeletal(skeletal) = &mut self.payload else {
            return;
        };
        if !skeletal.playing {
            return;
        }

        skeletal.anim_time += delta_ms * cx.services.animation.seconds_per_delta_unit;
        if let Err(e) = self.evaluate_pose() {
            log::error!("Stopping animation of '{}': {e}", self.file);
        }
    }
}
