//! Collision component
//!
//! Owns one tracked physics body. Every update pushes the node's world
//! position into the body and refreshes the world-space bounds; the scene's
//! collision sync then decides where the node ends up.

use crate::backend::{BodyDesc, BodyHandle, CollisionFlags, CollisionShape};
use crate::ecs::component::{ComponentBehavior, ComponentContext, ComponentError, ComponentServices};
use crate::foundation::bounds::Aabb;
use crate::foundation::math::{Mat4Ext, Vec3};

/// Physics body attached to a node
#[derive(Debug, Clone)]
pub struct CollisionComponent {
    /// Body shape
    pub shape: CollisionShape,
    /// Radius for round shapes
    pub radius: f32,
    /// Height for capsules, cones and cylinders
    pub height: f32,
    /// Local-space bounds for box and mesh shapes
    pub bounds: Aabb,
    /// Object flags
    pub flags: CollisionFlags,
    world_bounds: Aabb,
    body: Option<BodyHandle>,
}

impl Default for CollisionComponent {
    fn default() -> Self {
        Self::new(CollisionShape::Box)
    }
}

impl CollisionComponent {
    /// Unit-sized body of the given shape
    pub fn new(shape: CollisionShape) -> Self {
        let bounds = Aabb::from_center_extents(Vec3::zeros(), Vec3::repeat(0.5));
        Self {
            shape,
            radius: 0.5,
            height: 1.0,
            bounds,
            flags: CollisionFlags::empty(),
            world_bounds: bounds,
            body: None,
        }
    }

    /// Use `bounds` for box and mesh shapes
    #[must_use]
    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = bounds;
        self.world_bounds = bounds;
        self
    }

    /// Set object flags
    #[must_use]
    pub fn with_flags(mut self, flags: CollisionFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set radius and height
    #[must_use]
    pub fn with_dimensions(mut self, radius: f32, height: f32) -> Self {
        self.radius = radius;
        self.height = height;
        self
    }

    /// Tracked body, once initialised
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// Bounds in world space as of the last update
    pub fn world_bounds(&self) -> &Aabb {
        &self.world_bounds
    }

    fn body_desc(&self, position: Vec3) -> BodyDesc {
        BodyDesc {
            shape: self.shape,
            flags: self.flags,
            radius: self.radius,
            height: self.height,
            bounds: self.bounds,
            position,
        }
    }
}

impl ComponentBehavior for CollisionComponent {
    fn init(&mut self, cx: &mut ComponentContext<'_, '_>) -> Result<(), ComponentError> {
        let position = cx.world_position().unwrap_or_else(Vec3::zeros);
        if let Some(old) = self.body.take() {
            cx.services.physics.untrack_body(old);
        }
        self.body = Some(cx.services.physics.track_body(&self.body_desc(position)));

        if let Some(world) = cx.world_matrix() {
            self.world_bounds = self.bounds.transform(&world);
        }
        Ok(())
    }

    fn update(&mut self, cx: &mut ComponentContext<'_, '_>, _delta_ms: f32) {
        let (Some(body), Some(world)) = (self.body, cx.world_matrix()) else {
            return;
        };

        cx.services.physics.set_body_position(body, world.translation());
        self.world_bounds = self.bounds.transform(&world);
    }

    fn destroy(&mut self, services: &mut ComponentServices<'_>) {
        if let Some(body) = self.body.take() {
            services.physics.untrack_body(body);
        }
    }
}
