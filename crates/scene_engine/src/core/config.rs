//! # Engine Configuration
//!
//! Configuration types for the scene core. Every section has sensible
//! defaults so a missing config file never blocks startup.
//!
//! ## Configuration Categories
//!
//! - **Scene Config**: light limits and the startup level
//! - **Animation Config**: tick rate fallback and delta-time units
//! - **Logging Config**: default log filter when `RUST_LOG` is unset

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// Scene-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Point lights beyond this count trigger a warning
    pub max_point_lights: usize,
    /// Spot lights beyond this count trigger a warning
    pub max_spot_lights: usize,
    /// Level loaded at startup
    pub startup_level: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_point_lights: 8,
            max_spot_lights: 8,
            startup_level: "data/levels/test.ron".to_string(),
        }
    }
}

/// Skeletal animation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Tick rate used when a clip does not specify one
    pub default_ticks_per_second: f32,
    /// Factor converting a frame delta into seconds of animation time
    pub seconds_per_delta_unit: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_ticks_per_second: 25.0,
            // Frame deltas arrive in milliseconds
            seconds_per_delta_unit: 0.001,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
        }
    }
}

/// # Engine Configuration
///
/// Top-level configuration handed to the engine context and the scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scene settings
    pub scene: SceneConfig,
    /// Animation settings
    pub animation: AnimationConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config for EngineConfig {}
