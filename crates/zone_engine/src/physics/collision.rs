//! Collision shapes

use crate::foundation::math::{Transform, Vec3};

/// A bounding sphere for overlap detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Get the penetration depth if intersecting (0.0 if not intersecting)
    pub fn penetration_depth(&self, other: &BoundingSphere) -> f32 {
        let distance = (self.center - other.center).magnitude();
        let radius_sum = self.radius + other.radius;
        if distance < radius_sum {
            radius_sum - distance
        } else {
            0.0
        }
    }

    /// Move a local-space sphere into the space described by `pose`
    ///
    /// The radius grows with the largest scale axis so the result always
    /// encloses the scaled shape.
    pub fn transformed(&self, pose: &Transform) -> BoundingSphere {
        let max_scale = pose.scale.x.abs().max(pose.scale.y.abs()).max(pose.scale.z.abs());
        BoundingSphere {
            center: pose.position + pose.rotation * pose.scale.component_mul(&self.center),
            radius: self.radius * max_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_touching_spheres_intersect() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let b = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let c = BoundingSphere::new(Vec3::new(2.5, 0.0, 0.0), 1.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_relative_eq!(a.penetration_depth(&c), 0.0);
    }

    #[test]
    fn test_transformed_applies_offset_rotation_and_scale() {
        let local = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 0.5);
        let pose = Transform::from_position(Vec3::new(0.0, 2.0, 0.0))
            .with_euler_degrees(0.0, 0.0, 90.0)
            .with_uniform_scale(2.0);

        let world = local.transformed(&pose);

        assert_relative_eq!(world.center, Vec3::new(0.0, 4.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(world.radius, 1.0);
    }
}
