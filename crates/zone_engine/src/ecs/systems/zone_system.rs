//! ECS zone system
//!
//! Based on Game Engine Architecture 3rd Edition:
//! - Section 13.3: Collision Detection System
//! - Section 16.6: Updating Game Objects in Real Time
//!
//! Glues the zones to the built-in [`World`]: each fixed step it forwards
//! hold notifications, runs overlap detection, routes enter/exit to the zone
//! owning the trigger and ticks every zone. Events are delivered once per
//! frame in [`late_update`](ZoneSystem::late_update).

use crate::ecs::components::HoldNotification;
use crate::ecs::{Entity, World, WorldError};
use crate::events::ZoneEvent;
use crate::foundation::math::Transform;
use crate::physics::{JointHandle, OverlapDetector, OverlapEvent, OverlapSource};
use crate::zones::DetectionZone;
use std::collections::BTreeMap;

/// Owns the zones of a world and drives them
///
/// This system:
/// - Routes overlap enter/exit events to the zone owning the trigger
/// - Forwards hold begin/end/reset notifications to every zone
/// - Ticks zones on the fixed step and collects their events per frame
pub struct ZoneSystem {
    source: Box<dyn OverlapSource>,
    zones: BTreeMap<Entity, DetectionZone>,
}

impl ZoneSystem {
    /// Create a zone system using the built-in sphere overlap detector
    pub fn new() -> Self {
        Self::with_source(Box::new(OverlapDetector::new()))
    }

    /// Create a zone system fed by a custom overlap source
    pub fn with_source(source: Box<dyn OverlapSource>) -> Self {
        Self {
            source,
            zones: BTreeMap::new(),
        }
    }

    /// Register a zone, keyed by its trigger entity
    ///
    /// Replaces (and returns) a zone previously registered for the same entity.
    pub fn add_zone(&mut self, zone: DetectionZone) -> Option<DetectionZone> {
        let entity = zone.entity();
        log::info!("Registered zone {:?}", entity);
        self.zones.insert(entity, zone)
    }

    /// Unregister a zone
    pub fn remove_zone(&mut self, entity: Entity) -> Option<DetectionZone> {
        self.zones.remove(&entity)
    }

    /// Zone registered for a trigger entity
    pub fn zone(&self, entity: Entity) -> Option<&DetectionZone> {
        self.zones.get(&entity)
    }

    /// Mutable zone registered for a trigger entity
    pub fn zone_mut(&mut self, entity: Entity) -> Option<&mut DetectionZone> {
        self.zones.get_mut(&entity)
    }

    /// All registered zones
    pub fn zones(&self) -> impl Iterator<Item = &DetectionZone> {
        self.zones.values()
    }

    /// Run one fixed simulation step
    ///
    /// GEA 16.6: "Game object updates are typically performed once per frame"
    pub fn fixed_update(&mut self, world: &mut World, dt: f32) {
        // Step 1: Deliver hold lifecycle changes from the last step
        self.flush_hold_notifications(world);

        // Step 2: Detect overlaps and route them to zones
        for event in self.source.detect(world) {
            let pair = event.pair();
            let Some(zone) = self.zones.get_mut(&pair.trigger) else {
                continue;
            };
            match event {
                OverlapEvent::Enter(_) => zone.on_volume_enter(pair.volume),
                OverlapEvent::Exit(_) => zone.on_volume_exit(pair.volume),
            }
        }

        // Step 3: Tick zones
        for zone in self.zones.values_mut() {
            zone.fixed_update(world, dt);
        }
    }

    fn flush_hold_notifications(&mut self, world: &mut World) {
        for notification in world.drain_hold_notifications() {
            for zone in self.zones.values_mut() {
                match notification {
                    HoldNotification::Began(object) => zone.on_hold_began(world, object),
                    HoldNotification::Ended(object) => zone.on_hold_ended(world, object),
                    HoldNotification::Reset(object) => zone.on_reset(world, object),
                }
            }
        }
    }

    /// Dispatch the events every zone raised since the last call
    pub fn late_update(&mut self) -> Vec<ZoneEvent> {
        self.zones
            .values_mut()
            .flat_map(DetectionZone::dispatch_events)
            .collect()
    }

    /// Grab an object and let the zones know right away
    pub fn grab(&mut self, world: &mut World, object: Entity) -> Result<bool, WorldError> {
        let grabbed = world.begin_hold(object)?;
        if grabbed {
            self.flush_hold_notifications(world);
        }
        Ok(grabbed)
    }

    /// Let go of an object and let the zones know right away
    pub fn release_hold(&mut self, world: &mut World, object: Entity) -> bool {
        let released = world.end_hold(object);
        if released {
            self.flush_hold_notifications(world);
        }
        released
    }

    /// Reset an object to a root pose and let the zones know right away
    pub fn reset_object(&mut self, world: &mut World, object: Entity, pose: &Transform) -> Result<(), WorldError> {
        world.reset_entity(object, pose)?;
        self.flush_hold_notifications(world);
        Ok(())
    }

    /// Load a joint; if it breaks, the zone holding the object releases it
    ///
    /// Returns true when the joint broke.
    pub fn apply_joint_load(&mut self, world: &mut World, joint: JointHandle, load: f32) -> bool {
        let Some(broken) = world.apply_joint_load(joint, load) else {
            return false;
        };
        for zone in self.zones.values_mut() {
            for object in [broken.body, broken.connected_body] {
                if zone.state(object).and_then(|s| s.attachment.as_ref()).and_then(|a| a.joint) == Some(joint) {
                    zone.on_joint_broken(world, object);
                }
            }
        }
        true
    }

    /// Forget all overlap state (objects re-enter on the next step)
    pub fn clear_overlaps(&mut self) {
        self.source.clear();
    }
}

impl Default for ZoneSystem {
    fn default() -> Self {
        Self::new()
    }
}
