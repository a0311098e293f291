//! Levels
//!
//! A level is a list of entity definitions. Loading one clears the scene and
//! the mesh cache, then spawns each definition in order.

mod definition;
mod spawn;

pub use definition::{Archetype, CollisionDefinition, EntityDefinition, LevelDefinition};
pub use spawn::{load_level, load_level_file, spawn_entity};
