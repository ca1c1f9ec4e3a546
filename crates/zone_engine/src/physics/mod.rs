//! Physics module for trigger overlap detection
//!
//! Zones do not simulate physics; they consume enter/exit notifications from
//! an [`OverlapSource`] and flip a few body flags. This module provides the
//! shared types plus a sphere-based overlap detector for the built-in world.

pub mod collision;
pub mod collision_layers;
pub mod collision_system;
pub mod joint;

use serde::{Serialize, Deserialize};

pub use collision::BoundingSphere;
pub use collision_layers::CollisionLayers;
pub use collision_system::{OverlapDetector, OverlapEvent, OverlapPair, OverlapSource, ColliderSnapshot};
pub use joint::{JointComponent, JointHandle};

/// Simulation flags of a physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicsFlags {
    /// Body is pulled by gravity
    pub use_gravity: bool,

    /// Body is moved by code instead of the solver
    pub is_kinematic: bool,
}

impl PhysicsFlags {
    /// Fully simulated body
    pub const DYNAMIC: Self = Self {
        use_gravity: true,
        is_kinematic: false,
    };

    /// Body held in place by whoever moves it
    pub const LOCKED: Self = Self {
        use_gravity: false,
        is_kinematic: true,
    };

    /// Create flags from explicit values
    pub fn new(use_gravity: bool, is_kinematic: bool) -> Self {
        Self { use_gravity, is_kinematic }
    }
}

impl Default for PhysicsFlags {
    fn default() -> Self {
        Self::DYNAMIC
    }
}
