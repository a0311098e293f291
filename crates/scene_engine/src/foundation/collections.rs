//! Specialized collection types
//!
//! Scene nodes and entities live in slot maps and refer to each other through
//! generational keys, so a destroyed node can never be reached through a
//! stale handle.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a node in the scene graph arena
    pub struct NodeHandle;

    /// Handle to an entity owned by a scene
    pub struct EntityHandle;
}

/// Handle-based map for scene nodes
pub type NodeMap<T> = SlotMap<NodeHandle, T>;

/// Handle-based map for entities
pub type EntityMap<T> = SlotMap<EntityHandle, T>;
