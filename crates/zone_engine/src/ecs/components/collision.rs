//! Collision detection components for ECS
//!
//! Based on Game Engine Architecture 3rd Edition:
//! - Section 13.3: Collision Detection System
//! - Section 16.2: Component-based architecture

use crate::foundation::math::Vec3;
use crate::physics::collision::BoundingSphere;
use crate::physics::CollisionLayers;

/// Component that marks an entity as having an overlap volume
///
/// Trigger colliders belong to zones; the others are the volumes objects
/// present to those zones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderComponent {
    /// Sphere in the entity's local space
    pub shape: BoundingSphere,

    /// Collision layer bitmask (what layer is this entity on?)
    /// See GEA 13.3.8: Collision filtering via layers
    pub layer: CollisionLayers,

    /// Collision mask (what layers can this entity collide with?)
    pub mask: CollisionLayers,

    /// Is this a trigger volume (generates events but no physical response)?
    pub is_trigger: bool,
}

impl ColliderComponent {
    /// Create a sphere collider centred on the entity
    pub fn sphere(radius: f32) -> Self {
        Self::new(BoundingSphere::new(Vec3::zeros(), radius))
    }

    /// Create a collider with default settings
    pub fn new(shape: BoundingSphere) -> Self {
        Self {
            shape,
            layer: CollisionLayers::ALL,
            mask: CollisionLayers::ALL,
            is_trigger: false,
        }
    }

    /// Create a collider with specific layer and mask
    pub fn with_layers(mut self, layer: CollisionLayers, mask: CollisionLayers) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    /// Offset the sphere centre in local space
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.shape.center = offset;
        self
    }

    /// Mark this as a trigger volume
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}
