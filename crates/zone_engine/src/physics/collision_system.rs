//! Trigger overlap detection
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 13: the detector
//! keeps the overlapping pairs of the previous step and diffs them against
//! the current step, which turns a per-step overlap test into begin/end
//! notifications (GEA 13.3.10 "Collision event callbacks").
//!
//! Only trigger-versus-volume pairs are reported; volume-versus-volume
//! contact is the physics engine's business, not the zones'.

use crate::ecs::{Entity, World};
use crate::physics::collision::BoundingSphere;
use crate::physics::collision_layers::CollisionLayers;
use std::collections::HashSet;

/// A trigger volume overlapping an object volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlapPair {
    /// Entity owning the trigger collider
    pub trigger: Entity,
    /// Entity owning the overlapping (non-trigger) collider
    pub volume: Entity,
}

impl OverlapPair {
    /// Create a new overlap pair
    pub fn new(trigger: Entity, volume: Entity) -> Self {
        Self { trigger, volume }
    }
}

/// Begin/end notification for one overlap pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapEvent {
    /// The volume started overlapping the trigger
    Enter(OverlapPair),
    /// The volume stopped overlapping the trigger
    Exit(OverlapPair),
}

impl OverlapEvent {
    /// The pair the event refers to
    pub fn pair(&self) -> OverlapPair {
        match *self {
            Self::Enter(pair) | Self::Exit(pair) => pair,
        }
    }
}

/// World-space collider data captured for one detection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderSnapshot {
    /// Entity owning the collider
    pub entity: Entity,
    /// Sphere in world space
    pub sphere: BoundingSphere,
    /// Layer the collider is on
    pub layer: CollisionLayers,
    /// Layers the collider accepts
    pub mask: CollisionLayers,
    /// Whether this is a trigger volume
    pub is_trigger: bool,
}

/// Anything that can report trigger overlap begin/end for a world
pub trait OverlapSource {
    /// Run one detection pass and return the notifications it produced
    fn detect(&mut self, world: &World) -> Vec<OverlapEvent>;

    /// Forget all overlap state (next pass reports every overlap as new)
    fn clear(&mut self);
}

/// Brute-force sphere overlap detector for the built-in world
///
/// Fine for the handful of triggers an interaction scene carries; swap in an
/// engine-backed [`OverlapSource`] for anything bigger.
#[derive(Debug, Default)]
pub struct OverlapDetector {
    /// Overlapping pairs from the current pass
    current_pairs: HashSet<OverlapPair>,

    /// Overlapping pairs from the previous pass
    previous_pairs: HashSet<OverlapPair>,
}

impl OverlapDetector {
    /// Create an empty detector
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs overlapping as of the last pass
    pub fn current_pairs(&self) -> &HashSet<OverlapPair> {
        &self.current_pairs
    }

    /// Whether a pair overlapped in the last pass
    pub fn is_overlapping(&self, trigger: Entity, volume: Entity) -> bool {
        self.current_pairs.contains(&OverlapPair::new(trigger, volume))
    }

    fn collect_pairs(&mut self, colliders: &[ColliderSnapshot]) {
        for trigger in colliders.iter().filter(|c| c.is_trigger) {
            for volume in colliders.iter().filter(|c| !c.is_trigger) {
                if volume.entity == trigger.entity {
                    continue;
                }

                // Apply layer filtering (GEA 13.3.8)
                if !CollisionLayers::should_collide(trigger.layer, trigger.mask, volume.layer, volume.mask) {
                    continue;
                }

                if trigger.sphere.intersects(&volume.sphere) {
                    self.current_pairs.insert(OverlapPair::new(trigger.entity, volume.entity));
                }
            }
        }
    }
}

impl OverlapSource for OverlapDetector {
    fn detect(&mut self, world: &World) -> Vec<OverlapEvent> {
        // Move current pairs to previous
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();

        self.collect_pairs(&world.collider_snapshots());

        let mut exited: Vec<OverlapPair> = self.previous_pairs.difference(&self.current_pairs).copied().collect();
        let mut entered: Vec<OverlapPair> = self.current_pairs.difference(&self.previous_pairs).copied().collect();
        exited.sort();
        entered.sort();

        exited
            .into_iter()
            .map(OverlapEvent::Exit)
            .chain(entered.into_iter().map(OverlapEvent::Enter))
            .collect()
    }

    fn clear(&mut self) {
        self.current_pairs.clear();
        self.previous_pairs.clear();
    }
}
