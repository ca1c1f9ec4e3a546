//! Math utilities and types
//!
//! Provides the vector, rotation and pose types shared by the zone and
//! physics modules.

pub use nalgebra::{
    Vector3,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
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

    /// Builder pattern: Set rotation from Euler angles in degrees (roll, pitch, yaw)
    pub fn with_euler_degrees(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Quat::from_euler_angles(
            utils::deg_to_rad(x),
            utils::deg_to_rad(y),
            utils::deg_to_rad(z),
        );
        self
    }

    /// Builder pattern: Set uniform scale
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Combine this transform with another (`self` is the parent)
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale.component_mul(&other.position)),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }

    /// Get the inverse transform
    ///
    /// Exact for uniform scale, which is all the hierarchy relies on.
    pub fn inverse(&self) -> Transform {
        let inv_scale = Vec3::new(1.0 / self.scale.x, 1.0 / self.scale.y, 1.0 / self.scale.z);
        let inv_rotation = self.rotation.inverse();
        let inv_position = inv_rotation * (-self.position.component_mul(&inv_scale));

        Transform {
            position: inv_position,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }

    /// Interpolate toward `other`
    ///
    /// Position and scale are lerped, rotation takes the shortest arc. `t` is
    /// clamped to `[0, 1]`.
    pub fn interpolate(&self, other: &Transform, t: f32) -> Transform {
        let t = t.clamp(0.0, 1.0);
        let rotation = self
            .rotation
            .try_slerp(&other.rotation, t, 1.0e-6)
            .unwrap_or_else(|| self.rotation.nlerp(&other.rotation, t));

        Transform {
            position: self.position.lerp(&other.position, t),
            rotation,
            scale: self.scale.lerp(&other.scale, t),
        }
    }

    /// Euler angles of the rotation in degrees (roll, pitch, yaw)
    pub fn euler_degrees(&self) -> [f32; 3] {
        utils::euler_degrees(&self.rotation)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::*;

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

    /// Wrap an angle in degrees into `(-180, 180]`
    pub fn normalize_angle_degrees(angle: f32) -> f32 {
        let wrapped = angle % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped <= -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Signed shortest difference `to - from` in degrees
    pub fn delta_angle_degrees(from: f32, to: f32) -> f32 {
        normalize_angle_degrees(to - from)
    }

    /// Euler angles of a rotation in degrees (roll, pitch, yaw)
    pub fn euler_degrees(rotation: &Quat) -> [f32; 3] {
        let (roll, pitch, yaw) = rotation.euler_angles();
        [rad_to_deg(roll), rad_to_deg(pitch), rad_to_deg(yaw)]
    }
}
