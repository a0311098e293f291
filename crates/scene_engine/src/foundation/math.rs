//! Math utilities and types
//!
//! Provides the fundamental math types used by the scene graph and the
//! skeletal animation evaluator. Scene nodes store Euler angles in degrees;
//! bones and cameras use quaternions.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Principal axis, used by the single-axis rotation helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

/// Transform representing position, rotation, and scale
///
/// Used for bind poses and keyframe-free node transforms. Composition order
/// is always translation, then rotation, then scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix (`T * R * S`)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_trs(&self.position, &self.rotation, &self.scale)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Quat, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Component-wise linear interpolation: `start + t * (end - start)`
    pub fn lerp_vec3(start: &Vec3, end: &Vec3, t: f32) -> Vec3 {
        start + (end - start) * t
    }

    /// Spherical interpolation along the shortest arc, renormalized.
    ///
    /// Falls back to normalized lerp when the two rotations are too close for
    /// slerp to be numerically stable.
    pub fn slerp(start: &Quat, end: &Quat, t: f32) -> Quat {
        let mut end_q = end.into_inner();
        if start.coords.dot(&end_q.coords) < 0.0 {
            end_q = -end_q;
        }
        let end = Quat::new_unchecked(end_q);

        match start.try_slerp(&end, t, 1.0e-6) {
            Some(q) => Quat::new_normalize(q.into_inner()),
            None => start.nlerp(&end, t),
        }
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis (radians)
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis (radians)
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis (radians)
    fn rotation_z(angle: f32) -> Mat4;

    /// Rotation from Euler angles in degrees, composed as `Rz * Ry * Rx`
    fn from_euler_degrees(degrees: &Vec3) -> Mat4;

    /// Translation, rotation and scale composed as `T * R * S`
    fn from_trs(translation: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4;

    /// Translation, Euler-degree rotation and scale composed as `T * R * S`
    fn from_euler_trs(translation: &Vec3, degrees: &Vec3, scale: &Vec3) -> Mat4;

    /// Translation column of an affine matrix
    fn translation(&self) -> Vec3;

    /// Create a perspective projection matrix (OpenGL clip space)
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn from_euler_degrees(degrees: &Vec3) -> Mat4 {
        let rx = Mat4::rotation_x(utils::deg_to_rad(degrees.x));
        let ry = Mat4::rotation_y(utils::deg_to_rad(degrees.y));
        let rz = Mat4::rotation_z(utils::deg_to_rad(degrees.z));
        rz * ry * rx
    }

    fn from_trs(translation: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
        Mat4::new_translation(translation)
            * rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(scale)
    }

    fn from_euler_trs(translation: &Vec3, degrees: &Vec3, scale: &Vec3) -> Mat4 {
        Mat4::new_translation(translation)
            * Mat4::from_euler_degrees(degrees)
            * Mat4::new_nonuniform_scaling(scale)
    }

    fn translation(&self) -> Vec3 {
        Vec3::new(self[(0, 3)], self[(1, 3)], self[(2, 3)])
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        nalgebra::Perspective3::new(aspect, fov_y, near, far).to_homogeneous()
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }
}
