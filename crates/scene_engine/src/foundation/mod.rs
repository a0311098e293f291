//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Bounding boxes
//! - Handle types for the node and entity arenas
//! - Frame time management
//! - Logging utilities

pub mod math;
pub mod bounds;
pub mod collections;
pub mod time;
pub mod logging;
