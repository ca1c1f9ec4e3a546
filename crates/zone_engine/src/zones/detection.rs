//! Detection zones
//!
//! A [`DetectionZone`] turns raw trigger overlaps into debounced,
//! edge-triggered events. Each tracked object runs through
//! `Outside -> Accumulating -> Confirmed -> Outside`:
//!
//! - the first of its volumes to enter creates its state with a zero timer,
//! - every tick the timer grows while the object is eligible and pauses (or
//!   resets) while it is not,
//! - reaching the confirmation threshold while eligible raises `Detected`
//!   once per episode,
//! - the last volume leaving raises `Removed` if `Detected` fired.
//!
//! Zones with an [`AttachmentBehavior`] additionally take confirmed objects
//! over and snap them to an anchor; a [`PoseMatchGate`] makes eligibility
//! depend on the object sitting in a reference pose.
//!
//! Overlap notifications are buffered and applied at the start of the next
//! [`fixed_update`](DetectionZone::fixed_update), so their arrival order
//! within a tick does not matter.

use crate::ecs::Entity;
use crate::events::{EventSystem, ZoneEvent, ZoneEventHandler, ZoneEventType};
use crate::physics::CollisionLayers;
use crate::zones::attachment::{apply_restore, AttachmentBehavior, AttachmentStrategy, ReleaseOutcome, ReleaseReason};
use crate::zones::host::{Highlighter, ZoneHost};
use crate::zones::pose_match::PoseMatchGate;
use crate::zones::state::{DetectionPhase, PendingRestore, ZoneDetectionState};
use crate::zones::tracker::{AddOutcome, OverlapTracker, RemoveOutcome, VolumeResolver};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// What happens to the confirmation timer while an object is ineligible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimerPolicy {
    /// Keep the accumulated time
    #[default]
    Pause,
    /// Start over from zero
    Reset,
}

/// Which objects may accumulate confirmation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityPolicy {
    /// Objects that are being held still count
    pub detect_held: bool,
    /// Timer behaviour while ineligible
    pub timer_policy: TimerPolicy,
}

/// Detection configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Seconds an object must stay eligible before `Detected`
    pub confirmation_threshold: f32,
    /// Eligibility rules
    pub eligibility: EligibilityPolicy,
    /// Collision layers (raw bits) whose volumes the zone accepts
    pub accepted_layers: u32,
    /// Keep the highlight on regardless of contents
    pub highlight_always_active: bool,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            confirmation_threshold: 0.1,
            eligibility: EligibilityPolicy::default(),
            accepted_layers: CollisionLayers::ALL.bits(),
            highlight_always_active: false,
        }
    }
}

impl DetectionSettings {
    /// Builder pattern: Set confirmation threshold in seconds
    pub fn with_threshold(mut self, seconds: f32) -> Self {
        self.confirmation_threshold = seconds;
        self
    }

    /// Builder pattern: Set eligibility policy
    pub fn with_eligibility(mut self, eligibility: EligibilityPolicy) -> Self {
        self.eligibility = eligibility;
        self
    }

    /// Builder pattern: Only accept volumes on these layers
    pub fn with_accepted_layers(mut self, layers: CollisionLayers) -> Self {
        self.accepted_layers = layers.bits();
        self
    }

    /// Builder pattern: Keep the highlight on
    pub fn with_highlight_always_active(mut self, always: bool) -> Self {
        self.highlight_always_active = always;
        self
    }

    /// Accepted layers as flags
    pub fn accepted_layers(&self) -> CollisionLayers {
        CollisionLayers::from_raw(self.accepted_layers)
    }
}

/// Result of [`DetectionZone::force_attach`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceAttachOutcome {
    /// The zone cannot attach this object
    NotDetectable,
    /// The object was already snapped in this zone
    AlreadySnapped,
    /// The object was already on its way (finished now when instant)
    WasMoving,
    /// A new attachment started (and completed when instant)
    NewlySnapped,
}

/// Host view that hides volumes on layers the zone does not accept
struct LayerFilter<'a, H: ?Sized> {
    host: &'a H,
    accepted: CollisionLayers,
}

impl<H: ZoneHost + ?Sized> VolumeResolver<Entity, Entity> for LayerFilter<'_, H> {
    fn resolve_owner(&self, volume: Entity) -> Option<Entity> {
        if self.host.volume_layers(volume).intersects(self.accepted) {
            self.host.resolve_owner(volume)
        } else {
            None
        }
    }

    fn is_object_valid(&self, object: Entity) -> bool {
        self.host.is_object_valid(object)
    }

    fn is_volume_valid(&self, volume: Entity) -> bool {
        self.host.is_volume_valid(volume)
    }
}

/// Trigger zone with debounced detection and optional attachment
pub struct DetectionZone {
    entity: Entity,
    settings: DetectionSettings,
    attachment: Option<AttachmentBehavior>,
    pose_gate: Option<PoseMatchGate>,
    tracker: OverlapTracker<Entity, Entity>,
    states: BTreeMap<Entity, ZoneDetectionState>,
    /// Net enter (+) / exit (-) count per volume since the last tick
    pending_overlaps: BTreeMap<Entity, i32>,
    pending_restore: HashMap<Entity, PendingRestore>,
    events: EventSystem,
    highlighter: Option<Box<dyn Highlighter>>,
    highlight_active: bool,
    sim_time: f64,
}

impl DetectionZone {
    /// Create a detection-only zone on `entity`
    pub fn new(entity: Entity, settings: DetectionSettings) -> Self {
        if settings.confirmation_threshold < 0.0 {
            log::warn!(
                "Zone {:?} has negative confirmation threshold {}, using 0",
                entity,
                settings.confirmation_threshold
            );
        }
        Self {
            entity,
            settings,
            attachment: None,
            pose_gate: None,
            tracker: OverlapTracker::new(),
            states: BTreeMap::new(),
            pending_overlaps: BTreeMap::new(),
            pending_restore: HashMap::new(),
            events: EventSystem::new(),
            highlighter: None,
            highlight_active: false,
            sim_time: 0.0,
        }
    }

    /// Builder pattern: Attach confirmed objects
    pub fn with_attachment(mut self, attachment: AttachmentBehavior) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Builder pattern: Require a pose match for eligibility
    pub fn with_pose_gate(mut self, gate: PoseMatchGate) -> Self {
        self.pose_gate = Some(gate);
        self
    }

    /// Builder pattern: Drive a highlight
    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self.highlight_active = false;
        self.refresh_highlight();
        self
    }

    /// Entity owning the trigger
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Detection settings
    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    /// Attachment behaviour, if the zone attaches
    pub fn attachment(&self) -> Option<&AttachmentBehavior> {
        self.attachment.as_ref()
    }

    /// Pose gate, if any
    pub fn pose_gate(&self) -> Option<&PoseMatchGate> {
        self.pose_gate.as_ref()
    }

    fn threshold(&self) -> f32 {
        self.settings.confirmation_threshold.max(0.0)
    }

    // ---------------------------------------------------------------------
    // Overlap notifications
    // ---------------------------------------------------------------------

    /// A volume started overlapping the trigger
    pub fn on_volume_enter(&mut self, volume: Entity) {
        *self.pending_overlaps.entry(volume).or_insert(0) += 1;
    }

    /// A volume stopped overlapping the trigger
    pub fn on_volume_exit(&mut self, volume: Entity) {
        *self.pending_overlaps.entry(volume).or_insert(0) -= 1;
    }

    /// Apply buffered notifications, enters before exits
    ///
    /// Returns the objects whose last volume left.
    fn apply_pending_overlaps<H: ZoneHost + ?Sized>(&mut self, host: &H) -> Vec<Entity> {
        let pending = std::mem::take(&mut self.pending_overlaps);
        let filter = LayerFilter {
            host,
            accepted: self.settings.accepted_layers(),
        };

        for (&volume, _) in pending.iter().filter(|(_, net)| **net > 0) {
            match self.tracker.try_add(volume, &filter) {
                AddOutcome::NewObject(object) => {
                    log::debug!("Zone {:?}: {:?} entered", self.entity, object);
                    if self.states.insert(object, ZoneDetectionState::new(object)).is_some() {
                        log::error!("Zone {:?} had a state for untracked {:?}", self.entity, object);
                    }
                }
                AddOutcome::ExistingObjectNewVolume(_) | AddOutcome::NotRelevant => {}
            }
        }

        let mut exited = Vec::new();
        for (&volume, _) in pending.iter().filter(|(_, net)| **net < 0) {
            match self.tracker.try_remove(volume) {
                RemoveOutcome::FullyRemoved(object) => exited.push(object),
                RemoveOutcome::StillPresent(_) | RemoveOutcome::NotFound => {}
            }
        }
        exited
    }

    // ---------------------------------------------------------------------
    // Tick
    // ---------------------------------------------------------------------

    /// Advance the zone by one fixed step
    pub fn fixed_update<H: ZoneHost + ?Sized>(&mut self, host: &mut H, dt: f32) {
        self.sim_time += f64::from(dt);
        self.events.update_time(self.sim_time);

        let mut exited = self.apply_pending_overlaps(host);

        // Only attached objects may stay tracked without volumes inside
        let states = &self.states;
        let filter = LayerFilter {
            host: &*host,
            accepted: self.settings.accepted_layers(),
        };
        let summary = self.tracker.validate_with(&filter, true, |object| {
            states.get(&object).map_or(false, ZoneDetectionState::is_attached)
        });
        exited.extend(summary.removed_objects);

        for object in exited {
            self.handle_exit(host, object);
        }

        let objects: Vec<Entity> = self.states.keys().copied().collect();
        for object in objects {
            if let Some(mut state) = self.states.remove(&object) {
                self.tick_object(host, &mut state, dt);
                self.states.insert(object, state);
            }
        }

        self.refresh_highlight();
    }

    fn tick_object<H: ZoneHost + ?Sized>(&mut self, host: &mut H, state: &mut ZoneDetectionState, dt: f32) {
        let held = host.is_held(state.object);

        if state.is_attached() && held {
            log::debug!("Zone {:?}: {:?} grabbed while attached", self.entity, state.object);
            self.release_state(host, state, ReleaseReason::Regrabbed);
        }

        if !state.is_attached() {
            self.update_pose_match(host, state);
        }

        let eligible = self.is_eligible_state(held, state);
        let threshold = self.threshold();
        if eligible {
            state.advance(dt, threshold);
        } else if self.resets_timer_on_ineligible() {
            state.reset_timer();
        }

        let was_moving = state.is_moving();
        if eligible && !state.event_fired && state.threshold_reached(threshold) {
            state.event_fired = true;
            self.events.emit(ZoneEventType::Detected, self.entity, state.object);
            if self.begin_attachment(host, state) {
                self.complete_if_instant(host, state, false);
            }
        } else if was_moving {
            if let Some(behavior) = self.attachment {
                if behavior.advance_snap(host, self.entity, state, dt) {
                    self.events.emit(ZoneEventType::Snapped, self.entity, state.object);
                }
            }
        }
    }

    /// Start attaching a confirmed object
    ///
    /// Failures are configuration errors: logged, and the object stays free.
    fn begin_attachment<H: ZoneHost + ?Sized>(&mut self, host: &mut H, state: &mut ZoneDetectionState) -> bool {
        let Some(behavior) = self.attachment else {
            return false;
        };

        let pending = self.pending_restore.remove(&state.object);
        match behavior.begin_attach(host, self.entity, state, pending.as_ref()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Zone {:?} cannot attach {:?}: {}", self.entity, state.object, e);
                if let Some(restore) = pending {
                    self.pending_restore.insert(state.object, restore);
                }
                false
            }
        }
    }

    /// Finish the snap right away when asked to or when there is no movement
    fn complete_if_instant<H: ZoneHost + ?Sized>(&mut self, host: &mut H, state: &mut ZoneDetectionState, instant: bool) {
        let Some(behavior) = self.attachment else {
            return;
        };
        if (instant || behavior.is_instant()) && behavior.finish_snap(host, self.entity, state) {
            self.events.emit(ZoneEventType::Snapped, self.entity, state.object);
        }
    }

    fn update_pose_match<H: ZoneHost + ?Sized>(&mut self, host: &H, state: &mut ZoneDetectionState) {
        let Some(gate) = self.pose_gate else {
            return;
        };

        let matched = match (host.pose(state.object), host.pose(gate.reference)) {
            (Some(pose), Some(reference)) => gate.matches(&pose, &reference),
            _ => false,
        };

        if matched != state.pose_matched {
            state.pose_matched = matched;
            let event_type = if matched {
                ZoneEventType::PlacementMatched
            } else {
                ZoneEventType::PlacementUnmatched
            };
            self.events.emit(event_type, self.entity, state.object);
        }
    }

    fn handle_exit<H: ZoneHost + ?Sized>(&mut self, host: &mut H, object: Entity) {
        self.tracker.remove_object(object);
        let Some(mut state) = self.states.remove(&object) else {
            return;
        };

        log::debug!("Zone {:?}: {:?} left", self.entity, object);
        self.release_state(host, &mut state, ReleaseReason::Exited);
        if state.pose_matched {
            self.events.emit(ZoneEventType::PlacementUnmatched, self.entity, object);
        }
    }

    /// End the object's attachment (if any) and its detection episode
    fn release_state<H: ZoneHost + ?Sized>(
        &mut self,
        host: &mut H,
        state: &mut ZoneDetectionState,
        reason: ReleaseReason,
    ) {
        let object = state.object;

        if let Some(attachment) = state.attachment.take() {
            let was_snapped = attachment.snap_complete;
            match self.attachment {
                Some(behavior) => {
                    if let ReleaseOutcome::Deferred(restore) =
                        behavior.release(host, self.entity, object, attachment, reason)
                    {
                        self.defer_restore(object, restore);
                    }
                }
                None => log::error!("Zone {:?} held an attachment without attachment behaviour", self.entity),
            }
            if was_snapped {
                self.events.emit(ZoneEventType::Unsnapped, self.entity, object);
            }
        }

        if state.event_fired {
            state.event_fired = false;
            self.events.emit(ZoneEventType::Removed, self.entity, object);
        }
        state.reset_timer();
    }

    fn defer_restore(&mut self, object: Entity, restore: PendingRestore) {
        match self.pending_restore.entry(object) {
            Entry::Occupied(_) => {
                log::error!(
                    "Zone {:?} already waits to restore {:?}; keeping the earlier snapshot",
                    self.entity,
                    object
                );
            }
            Entry::Vacant(entry) => {
                entry.insert(restore);
            }
        }
    }

    fn refresh_highlight(&mut self) {
        let desired = self.settings.highlight_always_active
            || self.states.values().any(|s| s.event_fired || s.pose_matched);
        if desired == self.highlight_active {
            return;
        }
        self.highlight_active = desired;
        if let Some(highlighter) = self.highlighter.as_mut() {
            highlighter.set_active(desired);
        }
    }

    // ---------------------------------------------------------------------
    // Object lifecycle hooks
    // ---------------------------------------------------------------------

    /// Something started holding `object`
    ///
    /// A reparented object gets its parent back right away so the hand can
    /// take it; the rest of the release happens on the next tick.
    pub fn on_hold_began<H: ZoneHost + ?Sized>(&mut self, host: &mut H, object: Entity) {
        let Some(behavior) = self.attachment else {
            return;
        };
        let Some(attachment) = self.states.get_mut(&object).and_then(|s| s.attachment.as_mut()) else {
            return;
        };
        if attachment.parent_restored
            || behavior.settings.strategy != AttachmentStrategy::Reparent
        {
            return;
        }

        if let Err(e) = host.set_parent(object, attachment.prior.parent) {
            log::warn!("Zone {:?} failed to hand {:?} back: {}", self.entity, object, e);
        }
        attachment.parent_restored = true;
    }

    /// Holding `object` ended; applies a deferred restore
    pub fn on_hold_ended<H: ZoneHost + ?Sized>(&mut self, host: &mut H, object: Entity) {
        if let Some(restore) = self.pending_restore.remove(&object) {
            log::debug!("Zone {:?} applying deferred restore to {:?}", self.entity, object);
            apply_restore(host, object, restore);
        }
    }

    /// `object` was reset elsewhere; forget the episode without restoring
    pub fn on_reset<H: ZoneHost + ?Sized>(&mut self, host: &mut H, object: Entity) {
        self.pending_restore.remove(&object);
        if let Some(mut state) = self.states.remove(&object) {
            self.release_state(host, &mut state, ReleaseReason::Reset);
            if state.pose_matched {
                state.pose_matched = false;
                self.events.emit(ZoneEventType::PlacementUnmatched, self.entity, object);
            }
            self.states.insert(object, state);
            self.refresh_highlight();
        }
    }

    /// The joint holding `object` broke
    pub fn on_joint_broken<H: ZoneHost + ?Sized>(&mut self, host: &mut H, object: Entity) {
        let Some(mut state) = self.states.remove(&object) else {
            return;
        };
        if let Some(attachment) = state.attachment.as_ref() {
            if attachment.joint.is_some() {
                log::info!("Zone {:?}: joint holding {:?} broke", self.entity, object);
                self.release_state(host, &mut state, ReleaseReason::JointBroken);
            }
        }
        self.states.insert(object, state);
        self.refresh_highlight();
    }

    // ---------------------------------------------------------------------
    // Programmatic control
    // ---------------------------------------------------------------------

    /// Attach `object` without waiting for it to be detected
    ///
    /// The object need not be inside the trigger. With `instant` it lands on
    /// the anchor in this call; otherwise it moves there over the following
    /// ticks.
    pub fn force_attach<H: ZoneHost + ?Sized>(&mut self, host: &mut H, object: Entity, instant: bool) -> ForceAttachOutcome {
        let Some(behavior) = self.attachment else {
            log::warn!("Zone {:?} cannot force-attach {:?}: no attachment behaviour", self.entity, object);
            return ForceAttachOutcome::NotDetectable;
        };
        if !host.is_object_valid(object) {
            return ForceAttachOutcome::NotDetectable;
        }

        if let Some(state) = self.states.get_mut(&object) {
            if state.is_snapped() {
                return ForceAttachOutcome::AlreadySnapped;
            }
            if state.is_moving() {
                if instant && behavior.finish_snap(host, self.entity, state) {
                    self.events.emit(ZoneEventType::Snapped, self.entity, object);
                }
                return ForceAttachOutcome::WasMoving;
            }
        }

        let newly_tracked = self.tracker.track(object);
        let mut state = self
            .states
            .remove(&object)
            .unwrap_or_else(|| ZoneDetectionState::new(object));

        if !self.begin_attachment(host, &mut state) {
            if newly_tracked {
                self.tracker.remove_object(object);
            } else {
                self.states.insert(object, state);
            }
            return ForceAttachOutcome::NotDetectable;
        }

        log::info!("Zone {:?} force-attaching {:?}", self.entity, object);
        state.elapsed = self.threshold();
        if !state.event_fired {
            state.event_fired = true;
            self.events.emit(ZoneEventType::Detected, self.entity, object);
        }
        self.complete_if_instant(host, &mut state, instant);
        self.states.insert(object, state);
        self.refresh_highlight();
        ForceAttachOutcome::NewlySnapped
    }

    /// Release `object` programmatically
    ///
    /// Returns false when there was nothing to release.
    pub fn force_release<H: ZoneHost + ?Sized>(&mut self, host: &mut H, object: Entity) -> bool {
        let Some(mut state) = self.states.remove(&object) else {
            return false;
        };
        let released = state.is_attached() || state.event_fired;
        if released {
            self.release_state(host, &mut state, ReleaseReason::Forced);
        }
        self.states.insert(object, state);
        self.refresh_highlight();
        released
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// Register a handler for one event type
    pub fn register_handler(&mut self, event_type: ZoneEventType, handler: Box<dyn ZoneEventHandler>) {
        self.events.register_handler(event_type, handler);
    }

    /// Events raised since the last dispatch
    pub fn pending_events(&self) -> &[ZoneEvent] {
        self.events.pending()
    }

    /// Deliver queued events to handlers and return them
    pub fn dispatch_events(&mut self) -> Vec<ZoneEvent> {
        self.events.dispatch()
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Detection phase of an object
    pub fn phase(&self, object: Entity) -> DetectionPhase {
        self.states
            .get(&object)
            .map_or(DetectionPhase::Outside, ZoneDetectionState::phase)
    }

    /// State of a tracked object
    pub fn state(&self, object: Entity) -> Option<&ZoneDetectionState> {
        self.states.get(&object)
    }

    /// Whether the object is tracked
    pub fn contains(&self, object: Entity) -> bool {
        self.tracker.contains(object)
    }

    /// Number of the object's volumes inside the trigger
    pub fn collider_count(&self, object: Entity) -> usize {
        self.tracker.collider_count(object)
    }

    /// Tracked objects in identity order
    pub fn tracked_objects(&self) -> Vec<Entity> {
        self.tracker.get_all()
    }

    /// Whether the object is attached and sitting on the anchor
    pub fn is_snapped(&self, object: Entity) -> bool {
        self.states.get(&object).is_some_and(ZoneDetectionState::is_snapped)
    }

    /// Whether a restore is waiting for the object's hold to end
    pub fn has_pending_restore(&self, object: Entity) -> bool {
        self.pending_restore.contains_key(&object)
    }

    /// Whether `object` may accumulate confirmation time right now
    pub fn is_eligible<H: ZoneHost + ?Sized>(&self, host: &H, object: Entity) -> bool {
        self.states
            .get(&object)
            .is_some_and(|state| self.is_eligible_state(host.is_held(object), state))
    }

    fn is_eligible_state(&self, held: bool, state: &ZoneDetectionState) -> bool {
        let hold_ok = self.settings.eligibility.detect_held || !held;
        let pose_ok = self.pose_gate.is_none() || state.pose_matched;
        hold_ok && pose_ok
    }

    /// Whether losing eligibility restarts the timer instead of pausing it
    pub fn resets_timer_on_ineligible(&self) -> bool {
        self.settings.eligibility.timer_policy == TimerPolicy::Reset || self.pose_gate.is_some()
    }

    /// Whether the highlight is currently on
    pub fn highlight_active(&self) -> bool {
        self.highlight_active
    }

    /// Simulation time accumulated by [`fixed_update`](Self::fixed_update)
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}

impl fmt::Debug for DetectionZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionZone")
            .field("entity", &self.entity)
            .field("settings", &self.settings)
            .field("attachment", &self.attachment)
            .field("pose_gate", &self.pose_gate)
            .field("tracked", &self.tracker.len())
            .field("highlight_active", &self.highlight_active)
            .finish()
    }
}
