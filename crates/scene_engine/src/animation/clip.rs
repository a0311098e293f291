//! Animation clips and per-node channels

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::keyframe::{self, QuatKey, VectorKey};
use super::AnimationError;
use crate::foundation::math::{Mat4, Mat4Ext, Quat, Vec3};

/// Tick rate assumed for clips that declare zero ticks per second
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Keyframe tracks driving one skeleton node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeChannel {
    /// Name of the skeleton node this channel animates
    pub node_name: String,
    /// Translation keys
    pub position_keys: Vec<VectorKey>,
    /// Rotation keys
    pub rotation_keys: Vec<QuatKey>,
    /// Scale keys
    pub scale_keys: Vec<VectorKey>,
}

impl NodeChannel {
    /// Interpolated translation at `tick`
    pub fn position_at(&self, tick: f32) -> Vec3 {
        keyframe::sample_vector(&self.position_keys, tick).unwrap_or_else(Vec3::zeros)
    }

    /// Interpolated rotation at `tick`
    pub fn rotation_at(&self, tick: f32) -> Quat {
        keyframe::sample_rotation(&self.rotation_keys, tick).unwrap_or_else(Quat::identity)
    }

    /// Interpolated scale at `tick`
    pub fn scale_at(&self, tick: f32) -> Vec3 {
        keyframe::sample_vector(&self.scale_keys, tick).unwrap_or_else(|| Vec3::repeat(1.0))
    }

    /// Local node transform at `tick`, composed as `T * R * S`
    pub fn local_transform(&self, tick: f32) -> Mat4 {
        Mat4::from_trs(&self.position_at(tick), &self.rotation_at(tick), &self.scale_at(tick))
    }

    fn validate(&self) -> Result<(), AnimationError> {
        let problem = if self.position_keys.is_empty()
            || self.rotation_keys.is_empty()
            || self.scale_keys.is_empty()
        {
            Some("every track needs at least one key")
        } else if !keyframe::is_strictly_increasing(&self.position_keys)
            || !keyframe::is_strictly_increasing(&self.rotation_keys)
            || !keyframe::is_strictly_increasing(&self.scale_keys)
        {
            Some("key times must strictly increase")
        } else {
            None
        };

        match problem {
            Some(reason) => Err(AnimationError::InvalidChannel {
                node: self.node_name.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// A named, looping animation
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    ticks_per_second: f32,
    duration: f32,
    channels: Vec<NodeChannel>,
    by_node: HashMap<String, usize>,
}

impl AnimationClip {
    /// Build a clip, validating every channel.
    ///
    /// When two channels target the same node the first one wins.
    pub fn new(
        name: impl Into<String>,
        ticks_per_second: f32,
        duration: f32,
        channels: Vec<NodeChannel>,
    ) -> Result<Self, AnimationError> {
        let name = name.into();
        if !duration.is_finite() || duration < 0.0 {
            return Err(AnimationError::InvalidDuration { clip: name, duration });
        }

        let mut by_node = HashMap::with_capacity(channels.len());
        for (index, channel) in channels.iter().enumerate() {
            channel.validate()?;
            by_node.entry(channel.node_name.clone()).or_insert(index);
        }

        Ok(Self {
            name,
            ticks_per_second,
            duration,
            channels,
            by_node,
        })
    }

    /// Clip name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared tick rate, possibly zero
    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Tick rate used for sampling
    pub fn effective_ticks_per_second(&self) -> f32 {
        if self.ticks_per_second == 0.0 {
            DEFAULT_TICKS_PER_SECOND
        } else {
            self.ticks_per_second
        }
    }

    /// Length in ticks
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Length in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.effective_ticks_per_second()
    }

    /// All channels
    pub fn channels(&self) -> &[NodeChannel] {
        &self.channels
    }

    /// Channel animating `node_name`, if any
    pub fn channel(&self, node_name: &str) -> Option<&NodeChannel> {
        self.by_node.get(node_name).map(|&i| &self.channels[i])
    }

    /// Convert wall time to a tick inside `[0, duration)`
    pub fn tick_at(&self, time_seconds: f32) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }

        let tick = (time_seconds * self.effective_ticks_per_second()).rem_euclid(self.duration);
        if tick.is_finite() && tick < self.duration {
            tick
        } else {
            0.0
        }
    }
}
