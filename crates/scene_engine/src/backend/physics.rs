//! Physics backend interface
//!
//! The scene tracks one body per collision component. After every update the
//! backend is stepped and each tracked node is moved either back to where it
//! was (when colliding) or to where the backend put it.

use std::collections::{HashMap, HashSet};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::bounds::Aabb;
use crate::foundation::math::Vec3;

/// Handle to a tracked body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

/// Shape used to build a collision body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionShape {
    /// Capsule along the Y axis
    Capsule,
    /// Cone along the Y axis
    Cone,
    /// Cylinder along the Y axis
    Cylinder,
    /// Infinite plane facing +Y
    Plane,
    /// Box sized by the bounding box
    #[default]
    Box,
    /// Sphere sized by the radius
    Sphere,
    /// Triangle mesh of the rendered model
    Mesh,
}

bitflags! {
    /// Collision object flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionFlags: u32 {
        /// Never moves
        const STATIC_OBJECT = 1;
        /// Moved by gameplay code rather than simulation
        const KINEMATIC_OBJECT = 1 << 1;
        /// Reports overlaps but never counts as colliding
        const NO_CONTACT_RESPONSE = 1 << 2;
        /// Player or NPC controlled body
        const CHARACTER_OBJECT = 1 << 4;
    }
}

/// Description of a body to track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    /// Shape of the body
    pub shape: CollisionShape,
    /// Object flags
    pub flags: CollisionFlags,
    /// Radius for round shapes
    pub radius: f32,
    /// Height for capsules, cones and cylinders
    pub height: f32,
    /// Local-space bounds for box and mesh shapes
    pub bounds: Aabb,
    /// Initial world position
    pub position: Vec3,
}

/// Physics collaborator
pub trait PhysicsBackend {
    /// Start tracking a body
    fn track_body(&mut self, desc: &BodyDesc) -> BodyHandle;

    /// Stop tracking a body
    fn untrack_body(&mut self, body: BodyHandle);

    /// Teleport a body
    fn set_body_position(&mut self, body: BodyHandle, position: Vec3);

    /// Current body position, `None` for unknown handles
    fn body_position(&self, body: BodyHandle) -> Option<Vec3>;

    /// Whether the body had contacts during the last step
    fn is_colliding(&self, body: BodyHandle) -> bool;

    /// Advance the simulation
    fn step(&mut self, delta_ms: f32);

    /// Bodies in tracking order
    fn tracked_bodies(&self) -> Vec<BodyHandle>;
}

#[derive(Debug, Clone)]
struct HeadlessBody {
    desc: BodyDesc,
    position: Vec3,
}

impl HeadlessBody {
    fn world_bounds(&self) -> Aabb {
        let local = match self.desc.shape {
            CollisionShape::Box | CollisionShape::Mesh => self.desc.bounds,
            CollisionShape::Sphere => {
                Aabb::from_center_extents(Vec3::zeros(), Vec3::repeat(self.desc.radius))
            }
            CollisionShape::Capsule | CollisionShape::Cone | CollisionShape::Cylinder => {
                Aabb::from_center_extents(
                    Vec3::zeros(),
                    Vec3::new(self.desc.radius, self.desc.height * 0.5, self.desc.radius),
                )
            }
            CollisionShape::Plane => Aabb::new(
                Vec3::new(f32::MIN, f32::MIN, f32::MIN),
                Vec3::new(f32::MAX, 0.0, f32::MAX),
            ),
        };
        Aabb::new(local.min + self.position, local.max + self.position)
    }
}

/// Overlap-only physics used by the demo and the tests
///
/// Bodies never move on their own; a step recomputes which bodies overlap.
#[derive(Debug, Default)]
pub struct HeadlessPhysics {
    next_handle: u32,
    bodies: HashMap<BodyHandle, HeadlessBody>,
    colliding: HashSet<BodyHandle>,
    forced: HashSet<BodyHandle>,
    steps: u64,
}

impl HeadlessPhysics {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a body as colliding on every step regardless of overlaps
    pub fn force_colliding(&mut self, body: BodyHandle, colliding: bool) {
        if colliding {
            self.forced.insert(body);
        } else {
            self.forced.remove(&body);
        }
    }

    /// Move a body as if the simulation had moved it
    pub fn push_body(&mut self, body: BodyHandle, position: Vec3) {
        self.set_body_position(body, position);
    }

    /// Number of tracked bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of steps taken
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl PhysicsBackend for HeadlessPhysics {
    fn track_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, HeadlessBody { desc: *desc, position: desc.position });
        handle
    }

    fn untrack_body(&mut self, body: BodyHandle) {
        self.bodies.remove(&body);
        self.colliding.remove(&body);
        self.forced.remove(&body);
    }

    fn set_body_position(&mut self, body: BodyHandle, position: Vec3) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.position = position;
        }
    }

    fn body_position(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.position)
    }

    fn is_colliding(&self, body: BodyHandle) -> bool {
        self.colliding.contains(&body)
    }

    fn step(&mut self, _delta_ms: f32) {
        self.steps += 1;
        self.colliding.clear();

        let handles = self.tracked_bodies();
        for (i, a) in handles.iter().enumerate() {
            for b in &handles[i + 1..] {
                let (body_a, body_b) = (&self.bodies[a], &self.bodies[b]);
                let responds = !body_a.desc.flags.contains(CollisionFlags::NO_CONTACT_RESPONSE)
                    && !body_b.desc.flags.contains(CollisionFlags::NO_CONTACT_RESPONSE);
                if responds && body_a.world_bounds().intersects(&body_b.world_bounds()) {
                    self.colliding.insert(*a);
                    self.colliding.insert(*b);
                }
            }
        }

        let forced: Vec<BodyHandle> =
            self.forced.iter().filter(|h| self.bodies.contains_key(h)).copied().collect();
        self.colliding.extend(forced);
    }

    fn tracked_bodies(&self) -> Vec<BodyHandle> {
        let mut handles: Vec<BodyHandle> = self.bodies.keys().copied().collect();
        handles.sort_unstable();
        handles
    }
}
