//! Human-readable zone state dumps

use crate::ecs::Entity;
use crate::zones::detection::DetectionZone;
use std::fmt::Write;

impl DetectionZone {
    /// One-line description of an object's state in this zone
    ///
    /// Meant for logs and debug overlays; the format is not stable.
    pub fn describe_state(&self, object: Entity) -> String {
        let Some(state) = self.state(object) else {
            return format!("{:?}: outside", object);
        };

        let mut out = format!(
            "{:?}: {:?} colliders={} elapsed={:.3}/{:.3}s fired={}",
            object,
            state.phase(),
            self.collider_count(object),
            state.elapsed,
            self.settings().confirmation_threshold,
            state.event_fired,
        );
        if self.pose_gate().is_some() {
            let _ = write!(out, " pose_matched={}", state.pose_matched);
        }
        if let Some(attachment) = &state.attachment {
            let _ = write!(
                out,
                " attached(snap={} elapsed={:.3}s joint={} parent_restored={})",
                if attachment.snap_complete { "complete" } else { "moving" },
                attachment.snap_elapsed,
                attachment.joint.is_some(),
                attachment.parent_restored,
            );
        }
        if self.has_pending_restore(object) {
            out.push_str(" restore=deferred");
        }
        out
    }

    /// Describe every tracked object, one per line
    pub fn describe_all(&self) -> String {
        self.tracked_objects()
            .into_iter()
            .map(|object| self.describe_state(object))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
