//! Camera component
//!
//! A camera parented under another node follows that node: its position is
//! the node's world position and its look direction is the node's world
//! rotation applied to the direction it was created with. A camera on a root
//! node instead drives the node, so moving the camera moves the entity.

use serde::{Deserialize, Serialize};

use crate::ecs::component::{ComponentBehavior, ComponentContext, ComponentError};
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Position, look direction and lens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Eye position
    pub position: Vec3,
    /// Look direction
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    /// Width over height
    pub aspect: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            target: Vec3::new(-1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov_y: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// View matrix looking from `position` along `target`
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.target, self.up)
    }

    /// Perspective projection
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(utils::deg_to_rad(self.fov_y), self.aspect, self.near, self.far)
    }

    /// `projection * view`
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Move along the look direction
    pub fn move_forward(&mut self, distance: f32) {
        self.position += self.target * distance;
    }
}

/// Camera attached to a scene node
#[derive(Debug, Clone)]
pub struct CameraComponent {
    camera: Camera,
    local_target: Vec3,
}

impl CameraComponent {
    /// Wrap a camera
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            local_target: camera.target,
        }
    }

    /// Current camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Camera for direct control; only root cameras keep changes
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    fn sync(&mut self, cx: &mut ComponentContext<'_, '_>) {
        let Some(node) = cx.node else {
            return;
        };

        if cx.is_parented() {
            if let Some(world) = cx.world_matrix() {
                self.camera.position = world.translation();
                let direction = world.transform_vector(&self.local_target);
                if direction.norm_squared() > f32::EPSILON {
                    self.camera.target = direction.normalize();
                }
            }
        } else if cx.world_position() != Some(self.camera.position) {
            cx.graph.set_position(node, self.camera.position);
        }
    }
}

impl ComponentBehavior for CameraComponent {
    fn init(&mut self, cx: &mut ComponentContext<'_, '_>) -> Result<(), ComponentError> {
        self.sync(cx);
        Ok(())
    }

    fn update(&mut self, cx: &mut ComponentContext<'_, '_>, _delta_ms: f32) {
        self.sync(cx);
    }
}
