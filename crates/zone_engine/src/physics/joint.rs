//! Physical joints between bodies

use crate::ecs::Entity;

slotmap::new_key_type! {
    /// Handle to a joint owned by the world
    pub struct JointHandle;
}

/// A breakable fixed joint connecting two bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointComponent {
    /// Body the joint is attached to
    pub body: Entity,

    /// Body on the other end
    pub connected_body: Entity,

    /// Load above which the joint snaps (`f32::INFINITY` = unbreakable)
    pub break_force: f32,
}

impl JointComponent {
    /// Create a joint between two bodies
    pub fn new(body: Entity, connected_body: Entity, break_force: f32) -> Self {
        Self {
            body,
            connected_body,
            break_force,
        }
    }

    /// Whether the joint connects exactly this pair (in either order)
    pub fn connects(&self, a: Entity, b: Entity) -> bool {
        (self.body == a && self.connected_body == b) || (self.body == b && self.connected_body == a)
    }

    /// Whether the joint involves the given body
    pub fn involves(&self, entity: Entity) -> bool {
        self.body == entity || self.connected_body == entity
    }

    /// Whether applying `load` breaks the joint
    pub fn breaks_under(&self, load: f32) -> bool {
        self.break_force.is_finite() && load > self.break_force
    }
}
