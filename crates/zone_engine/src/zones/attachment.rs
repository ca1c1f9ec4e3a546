//! Snap attachment behaviour
//!
//! Once a zone confirms an object, an [`AttachmentBehavior`] takes the object
//! over: it ends the external hold, locks the body, remembers everything it
//! changed and moves the object onto the anchor. On release the remembered
//! properties are handed back, or parked until the current hold ends.
//!
//! Lifecycle (per object):
//! 1. `begin_attach`  - claim, snapshot, end hold, lock, optionally reparent
//! 2. `advance_snap`  - eased movement toward the anchor, once per tick
//! 3. `finish_snap`   - exact anchor pose, interactable flag, joint
//! 4. `release`       - undo the above

use crate::ecs::{Entity, WorldError};
use crate::physics::{JointHandle, PhysicsFlags};
use crate::zones::error::ZoneError;
use crate::zones::host::ZoneHost;
use crate::zones::movement::MovementProfile;
use crate::zones::state::{AttachmentState, PendingRestore, PriorProperties, ZoneDetectionState};
use serde::{Deserialize, Serialize};

/// How an attached object is held at the anchor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AttachmentStrategy {
    /// Parent the object under the anchor and keep its body locked
    #[default]
    Reparent,
    /// Connect the object to the zone body with a breakable joint and let
    /// physics keep it there
    PhysicalJoint {
        /// Load at which the joint breaks (`inf` = unbreakable)
        break_force: f32,
    },
}

/// Attachment configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentSettings {
    /// Reparent or joint
    pub strategy: AttachmentStrategy,
    /// Eased movement to the anchor (`None` = jump straight there)
    pub movement: Option<MovementProfile>,
    /// Forbid grabbing the object once it has snapped
    pub lock_on_snap: bool,
    /// Put the object back where it was attached from on release
    pub restore_pose_on_release: bool,
}

impl Default for AttachmentSettings {
    fn default() -> Self {
        Self {
            strategy: AttachmentStrategy::Reparent,
            movement: Some(MovementProfile::default()),
            lock_on_snap: false,
            restore_pose_on_release: false,
        }
    }
}

impl AttachmentSettings {
    /// Builder pattern: Set strategy
    pub fn with_strategy(mut self, strategy: AttachmentStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builder pattern: Set movement (`None` snaps instantly)
    pub fn with_movement(mut self, movement: Option<MovementProfile>) -> Self {
        self.movement = movement;
        self
    }

    /// Builder pattern: Lock the object once snapped
    pub fn with_lock_on_snap(mut self, lock: bool) -> Self {
        self.lock_on_snap = lock;
        self
    }

    /// Builder pattern: Restore the pre-attach pose on release
    pub fn with_pose_restore(mut self, restore: bool) -> Self {
        self.restore_pose_on_release = restore;
        self
    }
}

/// Why an attachment ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// Something grabbed the object while attached
    Regrabbed,
    /// The object left the zone (or stopped existing)
    Exited,
    /// Released programmatically
    Forced,
    /// The object was reset elsewhere; nothing is restored
    Reset,
    /// The joint holding the object broke
    JointBroken,
}

/// What happened to the remembered properties on release
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    /// Properties written back to the object
    Restored,
    /// Object is held; restore once the hold ends
    Deferred(PendingRestore),
    /// Nothing restored (reset or destroyed object)
    Skipped,
}

/// Attachment capability of a zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachmentBehavior {
    /// Configuration
    pub settings: AttachmentSettings,
    /// Entity whose pose attached objects snap to
    pub anchor: Entity,
    /// Body the joint strategy connects to
    pub joint_body: Entity,
}

impl AttachmentBehavior {
    /// Attach to `anchor`, which also serves as the joint body
    pub fn new(anchor: Entity, settings: AttachmentSettings) -> Self {
        Self {
            settings,
            anchor,
            joint_body: anchor,
        }
    }

    /// Builder pattern: Use a different body for joints
    pub fn with_joint_body(mut self, body: Entity) -> Self {
        self.joint_body = body;
        self
    }

    /// Whether snapping happens within the attach tick
    pub fn is_instant(&self) -> bool {
        self.settings.movement.map_or(true, |m| m.duration <= 0.0)
    }

    /// Take the object over
    ///
    /// `pending` is a restore still waiting from an earlier attachment; its
    /// values become the prior properties so the original state survives.
    pub fn begin_attach<H>(
        &self,
        host: &mut H,
        zone: Entity,
        state: &mut ZoneDetectionState,
        pending: Option<&PendingRestore>,
    ) -> Result<(), ZoneError>
    where
        H: ZoneHost + ?Sized,
    {
        let object = state.object;
        if state.is_attached() {
            return Ok(());
        }

        let start_pose = host.pose(object).ok_or(ZoneError::UnknownObject(object))?;
        if host.pose(self.anchor).is_none() {
            return Err(ZoneError::MissingAnchor(self.anchor));
        }
        if matches!(self.settings.strategy, AttachmentStrategy::PhysicalJoint { .. })
            && (host.physics_flags(object).is_none() || host.physics_flags(self.joint_body).is_none())
        {
            return Err(ZoneError::MissingPhysicsBody {
                object,
                body: self.joint_body,
            });
        }
        if !host.claim_attachment(object, zone) {
            return Err(ZoneError::AttachmentClaimed {
                object,
                owner: host.attachment_owner(object),
            });
        }

        let prior = PriorProperties {
            was_interactable: pending.map_or_else(|| host.is_interactable(object), |p| p.was_interactable),
            physics: pending.map_or_else(|| host.physics_flags(object), |p| p.physics),
            parent: host.parent(object),
            pose: pending
                .and_then(|p| p.pose.clone())
                .unwrap_or_else(|| start_pose.clone()),
        };

        host.end_hold(object);
        if prior.physics.is_some() {
            if let Err(e) = host.set_physics_flags(object, PhysicsFlags::LOCKED) {
                log::warn!("Failed to lock {:?} for attachment: {}", object, e);
            }
        }
        if self.settings.strategy == AttachmentStrategy::Reparent {
            if let Err(e) = host.set_parent(object, Some(self.anchor)) {
                log::warn!("Failed to parent {:?} under anchor {:?}: {}", object, self.anchor, e);
            }
        }

        log::debug!("Zone {:?} attaching {:?} ({:?})", zone, object, self.settings.strategy);
        state.attachment = Some(AttachmentState::new(prior, start_pose));
        Ok(())
    }

    /// Move an attaching object one tick further
    ///
    /// Returns true when this call completed the snap.
    pub fn advance_snap<H>(&self, host: &mut H, zone: Entity, state: &mut ZoneDetectionState, dt: f32) -> bool
    where
        H: ZoneHost + ?Sized,
    {
        let Some(movement) = self.settings.movement else {
            return self.finish_snap(host, zone, state);
        };
        let object = state.object;
        let Some(attachment) = state.attachment.as_mut() else {
            return false;
        };
        if attachment.snap_complete {
            return false;
        }

        attachment.snap_elapsed += dt.max(0.0);
        if attachment.snap_elapsed >= movement.duration {
            return self.finish_snap(host, zone, state);
        }

        match host.pose(self.anchor) {
            Some(target) => {
                let pose = movement.interpolate(
                    &attachment.start_pose,
                    &target,
                    movement.progress(attachment.snap_elapsed),
                );
                host.set_pose(object, &pose);
                false
            }
            None => {
                log::warn!("Anchor {:?} vanished while {:?} was moving", self.anchor, object);
                self.finish_snap(host, zone, state)
            }
        }
    }

    /// Put the object exactly on the anchor and finalise the attachment
    ///
    /// Idempotent: returns true only for the call that completed the snap.
    pub fn finish_snap<H>(&self, host: &mut H, zone: Entity, state: &mut ZoneDetectionState) -> bool
    where
        H: ZoneHost + ?Sized,
    {
        let object = state.object;
        let Some(attachment) = state.attachment.as_mut() else {
            return false;
        };
        if attachment.snap_complete {
            return false;
        }

        match host.pose(self.anchor) {
            Some(mut target) => {
                let keep_scale = !self.settings.movement.is_some_and(|m| m.interpolate_scale);
                if keep_scale {
                    target.scale = attachment.start_pose.scale;
                }
                host.set_pose(object, &target);
            }
            None => log::warn!("Anchor {:?} missing, {:?} snapped in place", self.anchor, object),
        }

        attachment.snap_complete = true;
        let interactable = !self.settings.lock_on_snap && attachment.prior.was_interactable;
        host.set_interactable(object, interactable);

        if let AttachmentStrategy::PhysicalJoint { .. } = self.settings.strategy {
            match self.attach_joint(host, zone, object, attachment) {
                Ok(_) => {
                    if let Err(e) = host.set_physics_flags(object, PhysicsFlags::DYNAMIC) {
                        log::warn!("Failed to release {:?} to the joint: {}", object, e);
                    }
                }
                Err(e) => log::warn!("Zone {:?} could not joint {:?}: {}", zone, object, e),
            }
        }

        log::debug!("Zone {:?} snapped {:?}", zone, object);
        true
    }

    /// Create the joint for a joint-strategy attachment
    ///
    /// Only one joint may exist per object and zone; asking for a second one
    /// is an error and leaves the first in place.
    pub fn attach_joint<H>(
        &self,
        host: &mut H,
        zone: Entity,
        object: Entity,
        attachment: &mut AttachmentState,
    ) -> Result<JointHandle, ZoneError>
    where
        H: ZoneHost + ?Sized,
    {
        let AttachmentStrategy::PhysicalJoint { break_force } = self.settings.strategy else {
            return Err(ZoneError::NotAttachable(zone));
        };
        if attachment.joint.is_some() {
            return Err(ZoneError::JointAlreadyExists { object, zone });
        }

        let joint = host
            .create_joint(object, self.joint_body, break_force)
            .map_err(|e| match e {
                WorldError::JointAlreadyExists { .. } => ZoneError::JointAlreadyExists { object, zone },
                other => ZoneError::World(other),
            })?;
        attachment.joint = Some(joint);
        Ok(joint)
    }

    /// Hand an object back
    ///
    /// The caller has already taken `attachment` out of the object's state.
    pub fn release<H>(
        &self,
        host: &mut H,
        zone: Entity,
        object: Entity,
        attachment: AttachmentState,
        reason: ReleaseReason,
    ) -> ReleaseOutcome
    where
        H: ZoneHost + ?Sized,
    {
        if let Some(joint) = attachment.joint {
            if reason != ReleaseReason::JointBroken {
                host.destroy_joint(joint);
            }
        }
        host.release_attachment_claim(object, zone);

        let exists = host.pose(object).is_some();
        if !exists || reason == ReleaseReason::Reset {
            log::debug!("Zone {:?} dropped {:?} without restoring ({:?})", zone, object, reason);
            return ReleaseOutcome::Skipped;
        }

        if self.settings.strategy == AttachmentStrategy::Reparent && !attachment.parent_restored {
            if let Err(e) = host.set_parent(object, attachment.prior.parent) {
                log::warn!("Failed to restore parent of {:?}: {}", object, e);
            }
        }

        let restore = PendingRestore {
            was_interactable: attachment.prior.was_interactable,
            physics: attachment.prior.physics,
            pose: self.settings.restore_pose_on_release.then_some(attachment.prior.pose),
        };
        if host.is_held(object) {
            log::debug!("Zone {:?} deferring restore of held {:?}", zone, object);
            return ReleaseOutcome::Deferred(restore);
        }

        apply_restore(host, object, restore);
        log::debug!("Zone {:?} released {:?} ({:?})", zone, object, reason);
        ReleaseOutcome::Restored
    }
}

/// Write remembered properties back to an object
pub fn apply_restore<H>(host: &mut H, object: Entity, restore: PendingRestore)
where
    H: ZoneHost + ?Sized,
{
    if let Some(pose) = &restore.pose {
        host.set_pose(object, pose);
    }
    host.set_interactable(object, restore.was_interactable);
    if let Some(flags) = restore.physics {
        if let Err(e) = host.set_physics_flags(object, flags) {
            log::warn!("Failed to restore physics of {:?}: {}", object, e);
        }
    }
}
