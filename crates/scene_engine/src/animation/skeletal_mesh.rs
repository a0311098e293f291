//! Skinned meshes: a skeleton plus its clips

use super::clip::AnimationClip;
use super::skeleton::Skeleton;
use super::AnimationError;
use crate::foundation::bounds::Aabb;
use crate::foundation::math::Mat4;

/// A loaded skinned mesh
#[derive(Debug, Clone)]
pub struct SkeletalMesh {
    name: String,
    bounds: Aabb,
    skeleton: Skeleton,
    clips: Vec<AnimationClip>,
}

impl SkeletalMesh {
    /// Create a mesh from its parts
    pub fn new(
        name: impl Into<String>,
        bounds: Aabb,
        skeleton: Skeleton,
        clips: Vec<AnimationClip>,
    ) -> Self {
        Self {
            name: name.into(),
            bounds,
            skeleton,
            clips,
        }
    }

    /// Asset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local-space bounds at bind pose
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Bone hierarchy
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Number of bones
    pub fn bone_count(&self) -> usize {
        self.skeleton.bone_count()
    }

    /// Clips in import order
    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    /// Index of a clip by name
    pub fn clip_index(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.name() == name)
    }

    /// Evaluate the first clip at `time_seconds`
    pub fn bone_transform(&self, time_seconds: f32, out: &mut Vec<Mat4>) -> Result<(), AnimationError> {
        self.bone_transform_for_clip(0, time_seconds, out)
    }

    /// Evaluate any clip at `time_seconds`, looping over its duration
    pub fn bone_transform_for_clip(
        &self,
        clip_index: usize,
        time_seconds: f32,
        out: &mut Vec<Mat4>,
    ) -> Result<(), AnimationError> {
        let clip = self.clips.get(clip_index).ok_or_else(|| AnimationError::MissingClip {
            mesh: self.name.clone(),
            index: clip_index,
            available: self.clips.len(),
        })?;

        let tick = clip.tick_at(time_seconds);
        self.skeleton.evaluate(Some(clip), tick, out);
        Ok(())
    }

    /// Bind pose, ignoring every clip
    pub fn bind_pose(&self, out: &mut Vec<Mat4>) {
        self.skeleton.evaluate(None, 0.0, out);
    }
}
