//! Interaction zones
//!
//! Trigger volumes that notice pickable objects, confirm them after a delay,
//! and optionally take them over:
//!
//! - [`OverlapTracker`]: per-volume notifications folded into per-object records
//! - [`DetectionZone`]: confirmation timers and edge-triggered events
//! - [`AttachmentBehavior`]: snap, hold and release of confirmed objects
//! - [`PoseMatchGate`]: eligibility that depends on placement accuracy

pub mod attachment;
pub mod debug;
pub mod detection;
pub mod error;
pub mod host;
pub mod movement;
pub mod pose_match;
pub mod state;
pub mod tracker;

#[cfg(test)]
mod tests;

pub use attachment::{AttachmentBehavior, AttachmentSettings, AttachmentStrategy, ReleaseOutcome, ReleaseReason};
pub use detection::{DetectionSettings, DetectionZone, EligibilityPolicy, ForceAttachOutcome, TimerPolicy};
pub use error::ZoneError;
pub use host::{Highlighter, ZoneHost};
pub use movement::{EasingCurve, MovementProfile};
pub use pose_match::{PoseComparison, PoseMatchGate, PoseMatchSettings};
pub use state::{AttachmentState, DetectionPhase, PendingRestore, PriorProperties, ZoneDetectionState};
pub use tracker::{AddOutcome, OverlapRecord, OverlapTracker, RemoveOutcome, TrackedIdentity, ValidationSummary, VolumeResolver};
