//! Interactable component for grabbable objects
//!
//! Marks an entity as a logical pickable object. Colliders on the entity or
//! any of its descendants resolve to the nearest interactable ancestor.

use crate::ecs::Entity;

/// Component marking an entity as a grabbable object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractableComponent {
    /// Whether the object may currently be grabbed
    pub interactable: bool,

    /// Whether something is currently holding the object
    pub held: bool,
}

impl InteractableComponent {
    /// Create a new interactable that is free to grab
    pub fn new() -> Self {
        Self {
            interactable: true,
            held: false,
        }
    }

    /// Set the interactable state
    pub fn with_interactable(mut self, interactable: bool) -> Self {
        self.interactable = interactable;
        self
    }
}

impl Default for InteractableComponent {
    fn default() -> Self {
        Self::new()
    }
}

/// Hold lifecycle notification queued by the world for zone systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldNotification {
    /// Something started holding the object
    Began(Entity),
    /// The object was let go
    Ended(Entity),
    /// The object was reset to a spawn pose
    Reset(Entity),
}
