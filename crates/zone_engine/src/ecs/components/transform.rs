//! Parent-relative transform component
//!
//! The world only stores local poses. World-space poses are derived by the
//! [`World`](crate::ecs::World) composing them up the hierarchy, which keeps
//! reparenting (zones do it on every reparent attachment) a single write.

use crate::foundation::math::{Transform, Vec3, Quat};

/// Pose of an entity relative to its parent (or the world for roots)
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// Position in parent space
    pub position: Vec3,

    /// Rotation in parent space
    pub rotation: Quat,

    /// Scale in parent space
    pub scale: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::from_local_pose(&Transform::identity())
    }
}

impl TransformComponent {
    /// Wrap a parent-relative pose
    pub fn from_local_pose(pose: &Transform) -> Self {
        Self {
            position: pose.position,
            rotation: pose.rotation,
            scale: pose.scale,
        }
    }

    /// Parent-relative pose
    pub fn local_pose(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    /// Pose in the space above `parent_pose`
    pub fn under(&self, parent_pose: &Transform) -> Transform {
        parent_pose.combine(&self.local_pose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_identity() {
        let component = TransformComponent::default();

        assert_eq!(component.local_pose(), Transform::identity());
    }

    #[test]
    fn test_under_parent_applies_parent_pose() {
        let parent = Transform::from_position(Vec3::new(0.0, 2.0, 0.0)).with_uniform_scale(2.0);
        let child = TransformComponent::from_local_pose(&Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));

        let pose = child.under(&parent);

        assert_relative_eq!(pose.position, Vec3::new(2.0, 2.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(pose.scale, Vec3::new(2.0, 2.0, 2.0), epsilon = 1e-5);
    }
}
