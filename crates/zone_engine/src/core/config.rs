//! # Zone Configuration
//!
//! Serializable description of a zone: detection rules plus the optional
//! attachment and pose-match behaviour. Scenes keep these in TOML or RON
//! files next to their assets.
//!
//! ```toml
//! name = "key-slot"
//!
//! [detection]
//! confirmation_threshold = 0.2
//!
//! [attachment]
//! lock_on_snap = true
//!
//! [attachment.movement]
//! duration = 0.3
//! easing = "SmoothStep"
//! ```

use serde::{Serialize, Deserialize};

use crate::ecs::Entity;
use crate::zones::{
    AttachmentBehavior, AttachmentSettings, AttachmentStrategy, DetectionSettings, DetectionZone, PoseMatchGate,
    PoseMatchSettings,
};

pub use crate::config::{Config, ConfigError};

/// # Zone Settings
///
/// Everything needed to build a [`DetectionZone`] except the entities it
/// binds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSettings {
    /// Name used in logs
    pub name: String,
    /// Detection rules
    pub detection: DetectionSettings,
    /// Attach confirmed objects
    pub attachment: Option<AttachmentSettings>,
    /// Require a pose match
    pub pose_match: Option<PoseMatchSettings>,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            name: "zone".to_string(),
            detection: DetectionSettings::default(),
            attachment: None,
            pose_match: None,
        }
    }
}

impl ZoneSettings {
    /// Create settings for a detection-only zone
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder pattern: Set detection rules
    pub fn with_detection(mut self, detection: DetectionSettings) -> Self {
        self.detection = detection;
        self
    }

    /// Builder pattern: Attach confirmed objects
    pub fn with_attachment(mut self, attachment: AttachmentSettings) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Builder pattern: Require a pose match
    pub fn with_pose_match(mut self, pose_match: PoseMatchSettings) -> Self {
        self.pose_match = Some(pose_match);
        self
    }

    /// Build a zone on `zone`
    ///
    /// Attached objects snap to `anchor` (and joints connect to it). A pose
    /// gate needs a `pose_reference`; without one the gate is left out and a
    /// warning logged.
    pub fn build_zone(&self, zone: Entity, anchor: Entity, pose_reference: Option<Entity>) -> DetectionZone {
        let mut built = DetectionZone::new(zone, self.detection);
        if let Some(attachment) = self.attachment {
            built = built.with_attachment(AttachmentBehavior::new(anchor, attachment));
        }
        match (self.pose_match, pose_reference) {
            (Some(pose_match), Some(reference)) => {
                built = built.with_pose_gate(PoseMatchGate::new(reference, pose_match));
            }
            (Some(_), None) => {
                log::warn!("Zone '{}' wants a pose match but has no reference entity", self.name);
            }
            (None, _) => {}
        }
        built
    }
}

impl Config for ZoneSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.detection.confirmation_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "detection.confirmation_threshold",
                reason: format!("must be a non-negative number of seconds, got {}", threshold),
            });
        }

        if let Some(attachment) = &self.attachment {
            if let Some(movement) = &attachment.movement {
                if !movement.duration.is_finite() || movement.duration < 0.0 {
                    return Err(ConfigError::Invalid {
                        field: "attachment.movement.duration",
                        reason: format!("must be a non-negative number of seconds, got {}", movement.duration),
                    });
                }
            }
            if let AttachmentStrategy::PhysicalJoint { break_force } = attachment.strategy {
                if break_force.is_nan() || break_force <= 0.0 {
                    return Err(ConfigError::Invalid {
                        field: "attachment.strategy.break_force",
                        reason: format!("must be positive, got {}", break_force),
                    });
                }
            }
        }

        if let Some(pose_match) = &self.pose_match {
            if pose_match.distance_tolerance < 0.0 || pose_match.distance_tolerance.is_nan() {
                return Err(ConfigError::Invalid {
                    field: "pose_match.distance_tolerance",
                    reason: format!("must be non-negative, got {}", pose_match.distance_tolerance),
                });
            }
            if pose_match.angle_tolerance_degrees.iter().any(|t| *t < 0.0 || t.is_nan()) {
                return Err(ConfigError::Invalid {
                    field: "pose_match.angle_tolerance_degrees",
                    reason: format!("must be non-negative, got {:?}", pose_match.angle_tolerance_degrees),
                });
            }
        }

        Ok(())
    }
}
