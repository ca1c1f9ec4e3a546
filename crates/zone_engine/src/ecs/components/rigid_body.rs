//! Rigid body component

use crate::physics::PhysicsFlags;

/// Physics body simulation flags for an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyComponent {
    /// Gravity / kinematic flags
    pub flags: PhysicsFlags,

    /// Body mass in kilograms
    pub mass: f32,
}

impl RigidBodyComponent {
    /// Create a dynamic body affected by gravity
    pub fn dynamic(mass: f32) -> Self {
        Self {
            flags: PhysicsFlags::DYNAMIC,
            mass,
        }
    }

    /// Create a kinematic body (moved by code, not by the solver)
    pub fn kinematic() -> Self {
        Self {
            flags: PhysicsFlags::LOCKED,
            mass: 0.0,
        }
    }

    /// Builder pattern: Set flags
    pub fn with_flags(mut self, flags: PhysicsFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl Default for RigidBodyComponent {
    fn default() -> Self {
        Self::dynamic(1.0)
    }
}
