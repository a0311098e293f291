//! Audio component
//!
//! Loads its sound on init. When carried by a node the emitter follows the
//! node's world position and velocity every update; when held directly by
//! an entity it only plays as a flat sound.

use serde::{Deserialize, Serialize};

use crate::backend::{SoundHandle, SoundKind, SoundParams};
use crate::ecs::component::{ComponentBehavior, ComponentContext, ComponentError, ComponentServices};
use crate::foundation::math::Vec3;

/// Sound file and how to load it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSource {
    /// Sound file
    pub file: String,
    /// Wave or stream
    #[serde(default)]
    pub kind: SoundKind,
}

/// Sound emitter
#[derive(Debug, Clone)]
pub struct AudioComponent {
    source: SoundSource,
    autoplay: Option<SoundParams>,
    sound: Option<SoundHandle>,
}

impl AudioComponent {
    /// Emitter for `source`
    pub fn new(source: SoundSource) -> Self {
        Self {
            source,
            autoplay: None,
            sound: None,
        }
    }

    /// Fire the sound with `params` as soon as it is loaded
    #[must_use]
    pub fn with_autoplay(mut self, params: SoundParams) -> Self {
        self.autoplay = Some(params);
        self
    }

    /// Sound file and kind
    pub fn source(&self) -> &SoundSource {
        &self.source
    }

    /// Backend handle once loaded
    pub fn sound(&self) -> Option<SoundHandle> {
        self.sound
    }

    /// Start playback at the carrying node's world position
    pub fn fire_sound(
        &mut self,
        cx: &mut ComponentContext<'_, '_>,
        params: &SoundParams,
    ) -> Result<(), ComponentError> {
        let Some(sound) = self.sound else {
            log::warn!("Sound '{}' fired before it was loaded", self.source.file);
            return Ok(());
        };

        let position = cx.world_position().unwrap_or_else(Vec3::zeros);
        cx.services.audio.play(sound, params, position)?;
        Ok(())
    }
}

impl ComponentBehavior for AudioComponent {
    fn init(&mut self, cx: &mut ComponentContext<'_, '_>) -> Result<(), ComponentError> {
        self.sound = Some(cx.services.audio.load_sound(self.source.kind, &self.source.file)?);

        if let Some(params) = self.autoplay {
            self.fire_sound(cx, &params)?;
        }
        Ok(())
    }

    fn update(&mut self, cx: &mut ComponentContext<'_, '_>, _delta_ms: f32) {
        let Some(sound) = self.sound else {
            return;
        };

        if let (Some(position), Some(velocity)) = (cx.world_position(), cx.velocity()) {
            cx.services.audio.set_emitter(sound, position, velocity);
        }
    }

    fn destroy(&mut self, services: &mut ComponentServices<'_>) {
        if let Some(sound) = self.sound.take() {
            services.audio.release(sound);
        }
    }
}
