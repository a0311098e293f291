//! Keyframes and track interpolation
//!
//! A track is a slice of keys sorted by strictly increasing time. Sampling a
//! single-key track always yields that key; otherwise the two keys bracketing
//! the sample time are blended. Times outside the keyed range clamp to the
//! first or last key.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Quat, Vec3};

/// Position or scale key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorKey {
    /// Time in ticks
    pub time: f32,
    /// Value at that time
    pub value: Vec3,
}

impl VectorKey {
    /// Create a key
    pub fn new(time: f32, value: Vec3) -> Self {
        Self { time, value }
    }
}

/// Rotation key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatKey {
    /// Time in ticks
    pub time: f32,
    /// Unit rotation at that time
    pub value: Quat,
}

impl QuatKey {
    /// Create a key
    pub fn new(time: f32, value: Quat) -> Self {
        Self { time, value }
    }
}

/// Anything with a time stamp
pub trait Keyframe {
    /// Time in ticks
    fn time(&self) -> f32;
}

impl Keyframe for VectorKey {
    fn time(&self) -> f32 {
        self.time
    }
}

impl Keyframe for QuatKey {
    fn time(&self) -> f32 {
        self.time
    }
}

/// Index `i` of the key pair with `keys[i].time <= t < keys[i + 1].time`.
///
/// Requires at least two keys. A time past the last key resolves to the final
/// pair.
pub fn find_key_index<K: Keyframe>(keys: &[K], t: f32) -> usize {
    debug_assert!(keys.len() >= 2, "interpolation needs at least two keys");

    keys.windows(2)
        .position(|pair| t < pair[1].time())
        .unwrap_or_else(|| keys.len().saturating_sub(2))
}

/// Blend factor of `t` between two key times, clamped to `[0, 1]`
pub fn blend_factor(start: f32, end: f32, t: f32) -> f32 {
    let span = end - start;
    if span <= 0.0 {
        return 0.0;
    }
    ((t - start) / span).clamp(0.0, 1.0)
}

/// Sample a position or scale track.
///
/// Returns `None` for an empty track.
pub fn sample_vector(keys: &[VectorKey], t: f32) -> Option<Vec3> {
    match keys {
        [] => None,
        [only] => Some(only.value),
        _ => {
            let i = find_key_index(keys, t);
            let (a, b) = (&keys[i], &keys[i + 1]);
            let factor = blend_factor(a.time, b.time, t);
            Some(utils::lerp_vec3(&a.value, &b.value, factor))
        }
    }
}

/// Sample a rotation track with spherical interpolation.
///
/// Returns `None` for an empty track.
pub fn sample_rotation(keys: &[QuatKey], t: f32) -> Option<Quat> {
    match keys {
        [] => None,
        [only] => Some(only.value),
        _ => {
            let i = find_key_index(keys, t);
            let (a, b) = (&keys[i], &keys[i + 1]);
            let factor = blend_factor(a.time, b.time, t);
            Some(utils::slerp(&a.value, &b.value, factor))
        }
    }
}

/// Whether key times strictly increase
pub fn is_strictly_increasing<K: Keyframe>(keys: &[K]) -> bool {
    keys.windows(2).all(|pair| pair[0].time() < pair[1].time())
}
