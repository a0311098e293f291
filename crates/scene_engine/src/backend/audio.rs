//! Audio backend interface
//!
//! Sounds are either fully decoded waves or streamed from disk. The scene only
//! loads, fires and positions them; mixing belongs to the backend.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::BackendError;
use crate::foundation::math::Vec3;

/// Handle to a loaded sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u32);

/// How a sound source is loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKind {
    /// Decoded fully into memory, shared by file name
    #[default]
    Wave,
    /// Streamed from disk, one instance per component
    Stream,
}

/// Playback parameters for a fired sound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundParams {
    /// Positional (3D) playback
    pub positional: bool,
    /// Loop until released
    pub looping: bool,
    /// Stereo panning in `[-1, 1]`
    pub pan: f32,
    /// Volume multiplier
    pub volume: f32,
    /// Distance past which a positional sound is silent
    pub max_distance: f32,
}

impl Default for SoundParams {
    fn default() -> Self {
        Self {
            positional: true,
            looping: false,
            pan: 0.0,
            volume: 1.0,
            max_distance: 100.0,
        }
    }
}

/// Audio collaborator
pub trait AudioBackend {
    /// Load (or stream-open) a sound file
    fn load_sound(&mut self, kind: SoundKind, path: &str) -> Result<SoundHandle, BackendError>;

    /// Start playback at a world position
    fn play(
        &mut self,
        sound: SoundHandle,
        params: &SoundParams,
        position: Vec3,
    ) -> Result<(), BackendError>;

    /// Move a positional sound
    fn set_emitter(&mut self, sound: SoundHandle, position: Vec3, velocity: Vec3);

    /// Stop and free a sound
    fn release(&mut self, sound: SoundHandle);
}

/// State of one sound in [`HeadlessAudio`]
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessSound {
    /// Source kind
    pub kind: SoundKind,
    /// File it was loaded from
    pub path: String,
    /// Last emitter position
    pub position: Vec3,
    /// Last emitter velocity
    pub velocity: Vec3,
    /// Parameters of the most recent `play`
    pub last_params: Option<SoundParams>,
    /// Number of `play` calls
    pub plays: u32,
}

/// Audio backend that keeps sound state in memory without producing output
#[derive(Debug, Default)]
pub struct HeadlessAudio {
    next_handle: u32,
    sounds: HashMap<SoundHandle, HeadlessSound>,
    missing: HashSet<String>,
}

impl HeadlessAudio {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later load of `path` fail
    pub fn mark_missing(&mut self, path: impl Into<String>) {
        self.missing.insert(path.into());
    }

    /// Inspect a loaded sound
    pub fn sound(&self, handle: SoundHandle) -> Option<&HeadlessSound> {
        self.sounds.get(&handle)
    }

    /// Number of sounds currently loaded
    pub fn loaded_count(&self) -> usize {
        self.sounds.len()
    }
}

impl AudioBackend for HeadlessAudio {
    fn load_sound(&mut self, kind: SoundKind, path: &str) -> Result<SoundHandle, BackendError> {
        if self.missing.contains(path) {
            return Err(BackendError::SoundLoad {
                path: path.to_string(),
                reason: "file not found".to_string(),
            });
        }

        let handle = SoundHandle(self.next_handle);
        self.next_handle += 1;
        self.sounds.insert(
            handle,
            HeadlessSound {
                kind,
                path: path.to_string(),
                position: Vec3::zeros(),
                velocity: Vec3::zeros(),
                last_params: None,
                plays: 0,
            },
        );
        Ok(handle)
    }

    fn play(
        &mut self,
        sound: SoundHandle,
        params: &SoundParams,
        position: Vec3,
    ) -> Result<(), BackendError> {
        let state = self.sounds.get_mut(&sound).ok_or(BackendError::UnknownSound(sound))?;
        state.position = position;
        state.last_params = Some(*params);
        state.plays += 1;
        Ok(())
    }

    fn set_emitter(&mut self, sound: SoundHandle, position: Vec3, velocity: Vec3) {
        if let Some(state) = self.sounds.get_mut(&sound) {
            state.position = position;
            state.velocity = velocity;
        }
    }

    fn release(&mut self, sound: SoundHandle) {
        self.sounds.remove(&sound);
    }
}
