//! Per-object zone state
//!
//! One [`ZoneDetectionState`] lives in a zone for every object it tracks. It
//! carries the confirmation timer, the single-fire flag and, while the zone
//! owns the object, the [`AttachmentState`] needed to hand it back.

use crate::ecs::Entity;
use crate::foundation::math::Transform;
use crate::physics::{JointHandle, PhysicsFlags};

/// Tolerance used when comparing the timer against its threshold
///
/// Summing fixed steps in `f32` drifts a few ulps below the exact total
/// (four steps of 0.05 s can land just under 0.2 s). A timer within 10 µs of
/// its threshold therefore counts as reached; anything further below does
/// not fire. 10 µs is three orders of magnitude under a 90 Hz step.
pub const TIMER_EPSILON: f32 = 1.0e-5;

/// Where an object is in a zone's detection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionPhase {
    /// Not tracked by the zone
    Outside,
    /// Inside, confirmation timer running or paused
    Accumulating,
    /// Detected event fired for the current episode
    Confirmed,
}

/// Object properties captured when an attachment begins
#[derive(Debug, Clone, PartialEq)]
pub struct PriorProperties {
    /// Interactable flag before the zone took over
    pub was_interactable: bool,
    /// Physics flags before locking (`None` without a body)
    pub physics: Option<PhysicsFlags>,
    /// Parent before reparenting
    pub parent: Option<Entity>,
    /// World pose before the snap started
    pub pose: Transform,
}

/// Restoration postponed until an external hold ends
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRestore {
    /// Interactable flag to restore
    pub was_interactable: bool,
    /// Physics flags to restore
    pub physics: Option<PhysicsFlags>,
    /// World pose to put the object back at, when pose restore is enabled
    pub pose: Option<Transform>,
}

/// State of an active attachment
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentState {
    /// What to restore on release
    pub prior: PriorProperties,
    /// Pose the snap movement starts from
    pub start_pose: Transform,
    /// Seconds since the snap started
    pub snap_elapsed: f32,
    /// Object has reached the anchor
    pub snap_complete: bool,
    /// Joint created by the joint strategy
    pub joint: Option<JointHandle>,
    /// Parent already handed back (re-grab during the attachment)
    pub parent_restored: bool,
}

impl AttachmentState {
    /// Fresh attachment state starting at `start_pose`
    pub fn new(prior: PriorProperties, start_pose: Transform) -> Self {
        Self {
            prior,
            start_pose,
            snap_elapsed: 0.0,
            snap_complete: false,
            joint: None,
            parent_restored: false,
        }
    }

    /// Still travelling toward the anchor
    pub fn is_moving(&self) -> bool {
        !self.snap_complete
    }
}

/// Detection state of one object inside one zone
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDetectionState {
    /// The tracked object
    pub object: Entity,
    /// Confirmation time accumulated, in `[0, threshold]`
    pub elapsed: f32,
    /// Detected already fired for this episode
    pub event_fired: bool,
    /// Last pose match result (always false without a gate)
    pub pose_matched: bool,
    /// Present while the zone owns the object
    pub attachment: Option<AttachmentState>,
}

impl ZoneDetectionState {
    /// State for an object that just entered
    pub fn new(object: Entity) -> Self {
        Self {
            object,
            elapsed: 0.0,
            event_fired: false,
            pose_matched: false,
            attachment: None,
        }
    }

    /// Accumulate eligible time, clamped to `threshold`
    pub fn advance(&mut self, dt: f32, threshold: f32) {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(threshold.max(0.0));
    }

    /// Restart the confirmation timer
    pub fn reset_timer(&mut self) {
        self.elapsed = 0.0;
    }

    /// Whether the timer has reached `threshold`
    pub fn threshold_reached(&self, threshold: f32) -> bool {
        self.elapsed + TIMER_EPSILON >= threshold
    }

    /// Whether the zone currently owns the object
    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// Whether the object is attached and still moving
    pub fn is_moving(&self) -> bool {
        self.attachment.as_ref().is_some_and(AttachmentState::is_moving)
    }

    /// Whether the object is attached and at its anchor
    pub fn is_snapped(&self) -> bool {
        self.attachment.as_ref().is_some_and(|a| a.snap_complete)
    }

    /// Phase in the detection cycle
    pub fn phase(&self) -> DetectionPhase {
        if self.event_fired {
            DetectionPhase::Confirmed
        } else {
            DetectionPhase::Accumulating
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn state() -> ZoneDetectionState {
        let mut map: SlotMap<Entity, ()> = SlotMap::with_key();
        ZoneDetectionState::new(map.insert(()))
    }

    #[test]
    fn test_timer_clamps_to_threshold() {
        let mut state = state();

        for _ in 0..10 {
            state.advance(0.05, 0.2);
        }

        assert_relative_eq!(state.elapsed, 0.2);
        assert!(state.threshold_reached(0.2));
    }

    #[test]
    fn test_float_accumulation_reaches_threshold() {
        let mut state = state();

        for _ in 0..3 {
            state.advance(0.1, 0.3);
        }

        assert!(state.threshold_reached(0.3));
    }

    #[test]
    fn test_threshold_tolerance_is_bounded() {
        let mut state = state();

        state.elapsed = 0.2 - 1.0e-3;
        assert!(!state.threshold_reached(0.2));

        state.elapsed = 0.2 - 2.0 * TIMER_EPSILON;
        assert!(!state.threshold_reached(0.2));

        state.elapsed = 0.2 - 0.5 * TIMER_EPSILON;
        assert!(state.threshold_reached(0.2));
    }

    #[test]
    fn test_zero_threshold_is_reached_immediately() {
        let mut state = state();

        state.advance(0.016, 0.0);

        assert_relative_eq!(state.elapsed, 0.0);
        assert!(state.threshold_reached(0.0));
    }

    #[test]
    fn test_phase_follows_event_flag() {
        let mut state = state();
        assert_eq!(state.phase(), DetectionPhase::Accumulating);

        state.event_fired = true;
        assert_eq!(state.phase(), DetectionPhase::Confirmed);
        assert!(!state.is_attached());
        assert!(!state.is_moving());
    }
}
