//! Collision layer system for filtering overlap detection
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.8:
//! "Most games need to filter collisions... This is typically done via
//! collision layers or groups."

use bitflags::bitflags;

bitflags! {
    /// Collision layer bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Player body / hands
        const PLAYER = 1 << 0;
        /// Static environment geometry
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes (no physical response)
        const TRIGGER = 1 << 4;
        /// Debris and small physics objects
        const DEBRIS = 1 << 5;
        /// Pickups and grabbable props
        const PICKUP = 1 << 7;
        /// Tools that fit into sockets
        const TOOL = 1 << 8;
        /// Keys, cartridges and other puzzle pieces
        const PUZZLE_PIECE = 1 << 9;

        /// All collision layers
        const ALL = u32::MAX;
    }
}

impl CollisionLayers {
    /// No collision layer
    pub const NONE: Self = Self::empty();

    /// Check if two colliders should interact based on their layers and masks
    ///
    /// Both sides must accept each other: A's mask must include B's layer
    /// and B's mask must include A's layer.
    ///
    /// # Example
    /// ```
    /// use zone_engine::physics::CollisionLayers;
    ///
    /// assert!(CollisionLayers::should_collide(
    ///     CollisionLayers::TRIGGER, CollisionLayers::PICKUP,
    ///     CollisionLayers::PICKUP, CollisionLayers::ALL,
    /// ));
    /// assert!(!CollisionLayers::should_collide(
    ///     CollisionLayers::TRIGGER, CollisionLayers::TOOL,
    ///     CollisionLayers::PICKUP, CollisionLayers::ALL,
    /// ));
    /// ```
    pub fn should_collide(
        layer_a: CollisionLayers,
        mask_a: CollisionLayers,
        layer_b: CollisionLayers,
        mask_b: CollisionLayers,
    ) -> bool {
        mask_a.intersects(layer_b) && mask_b.intersects(layer_a)
    }

    /// Build from raw bits, keeping unknown bits
    pub fn from_raw(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_filtering_is_symmetric() {
        let trigger = (CollisionLayers::TRIGGER, CollisionLayers::PICKUP | CollisionLayers::TOOL);
        let tool = (CollisionLayers::TOOL, CollisionLayers::ALL);
        let debris = (CollisionLayers::DEBRIS, CollisionLayers::ALL);

        assert!(CollisionLayers::should_collide(trigger.0, trigger.1, tool.0, tool.1));
        assert!(CollisionLayers::should_collide(tool.0, tool.1, trigger.0, trigger.1));
        assert!(!CollisionLayers::should_collide(trigger.0, trigger.1, debris.0, debris.1));
    }

    #[test]
    fn test_none_never_collides() {
        assert!(!CollisionLayers::should_collide(
            CollisionLayers::NONE,
            CollisionLayers::ALL,
            CollisionLayers::ALL,
            CollisionLayers::ALL,
        ));
    }

    #[test]
    fn test_raw_bits_round_trip() {
        let layers = CollisionLayers::from_raw(CollisionLayers::PICKUP.bits() | (1 << 20));
        assert!(layers.contains(CollisionLayers::PICKUP));
        assert_eq!(layers.bits() & (1 << 20), 1 << 20);
    }
}
