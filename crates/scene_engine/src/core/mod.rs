//! # Core Engine Module
//!
//! Shared abstractions used by every subsystem of the scene core.
//!
//! ## Organization
//!
//! - **Config**: configuration for scene, animation and logging
//! - **Context**: the per-run engine context that owns the collaborator
//!   backends and is passed explicitly into update and render calls

pub mod config;
pub mod context;

pub use config::{AnimationConfig, Config, ConfigError, EngineConfig, LoggingConfig, SceneConfig};
pub use context::EngineContext;
