//! Pose matching gate
//!
//! Compares an object's pose against a reference entity's pose with a
//! position tolerance and per-axis Euler angle tolerances. The result gates
//! zone eligibility and raises its own placement events on edges.

use crate::ecs::Entity;
use crate::foundation::math::{utils, Transform};
use serde::{Deserialize, Serialize};

/// Tolerances for a pose match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseMatchSettings {
    /// Compare positions
    pub match_position: bool,
    /// Maximum distance from the reference position
    pub distance_tolerance: f32,
    /// Compare orientations
    pub match_rotation: bool,
    /// Maximum angle difference per Euler axis (roll, pitch, yaw) in degrees
    pub angle_tolerance_degrees: [f32; 3],
}

impl Default for PoseMatchSettings {
    fn default() -> Self {
        Self {
            match_position: true,
            distance_tolerance: 0.05,
            match_rotation: true,
            angle_tolerance_degrees: [10.0; 3],
        }
    }
}

/// Outcome of comparing a pose against a reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseComparison {
    /// Distance between the positions
    pub distance: f32,
    /// Signed angle differences per Euler axis, in `(-180, 180]`
    pub angle_deltas: [f32; 3],
    /// Position within tolerance (or not compared)
    pub position_ok: bool,
    /// Each axis within tolerance (or not compared)
    pub axis_ok: [bool; 3],
}

impl PoseComparison {
    /// Whether every enabled check passed
    pub fn matches(&self) -> bool {
        self.position_ok && self.axis_ok.iter().all(|ok| *ok)
    }
}

/// Eligibility gate requiring an object to sit in a reference pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseMatchGate {
    /// Tolerances
    pub settings: PoseMatchSettings,
    /// Entity whose world pose is the target
    pub reference: Entity,
}

impl PoseMatchGate {
    /// Create a gate matching against `reference`
    pub fn new(reference: Entity, settings: PoseMatchSettings) -> Self {
        Self { settings, reference }
    }

    /// Compare a pose against the reference pose
    pub fn evaluate(&self, pose: &Transform, reference: &Transform) -> PoseComparison {
        let distance = (pose.position - reference.position).magnitude();
        let position_ok = !self.settings.match_position || distance <= self.settings.distance_tolerance;

        let current = pose.euler_degrees();
        let target = reference.euler_degrees();
        let mut angle_deltas = [0.0; 3];
        let mut axis_ok = [true; 3];
        for axis in 0..3 {
            angle_deltas[axis] = utils::delta_angle_degrees(target[axis], current[axis]);
            if self.settings.match_rotation {
                axis_ok[axis] = angle_deltas[axis].abs() <= self.settings.angle_tolerance_degrees[axis];
            }
        }

        PoseComparison {
            distance,
            angle_deltas,
            position_ok,
            axis_ok,
        }
    }

    /// Shorthand for `evaluate(..).matches()`
    pub fn matches(&self, pose: &Transform, reference: &Transform) -> bool {
        self.evaluate(pose, reference).matches()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn gate(settings: PoseMatchSettings) -> PoseMatchGate {
        let mut map: SlotMap<Entity, ()> = SlotMap::with_key();
        PoseMatchGate::new(map.insert(()), settings)
    }

    #[test]
    fn test_position_tolerance_boundary() {
        let gate = gate(PoseMatchSettings {
            match_rotation: false,
            distance_tolerance: 0.1,
            ..Default::default()
        });
        let reference = Transform::identity();

        assert!(gate.matches(&Transform::from_position(Vec3::new(0.1, 0.0, 0.0)), &reference));
        assert!(!gate.matches(&Transform::from_position(Vec3::new(0.0, 0.11, 0.0)), &reference));
    }

    #[test]
    fn test_angles_wrap_around() {
        let gate = gate(PoseMatchSettings {
            match_position: false,
            angle_tolerance_degrees: [5.0, 5.0, 5.0],
            ..Default::default()
        });
        let reference = Transform::identity().with_euler_degrees(0.0, 0.0, 178.0);
        let pose = Transform::identity().with_euler_degrees(0.0, 0.0, -178.0);

        let comparison = gate.evaluate(&pose, &reference);

        assert_relative_eq!(comparison.angle_deltas[2], 4.0, epsilon = 1e-2);
        assert!(comparison.matches());
    }

    #[test]
    fn test_each_axis_checked_separately() {
        let gate = gate(PoseMatchSettings {
            match_position: false,
            angle_tolerance_degrees: [45.0, 45.0, 5.0],
            ..Default::default()
        });
        let reference = Transform::identity();
        let pose = Transform::identity().with_euler_degrees(0.0, 0.0, 20.0);

        let comparison = gate.evaluate(&pose, &reference);

        assert_eq!(comparison.axis_ok, [true, true, false]);
        assert!(!comparison.matches());
    }

    #[test]
    fn test_disabled_checks_always_pass() {
        let gate = gate(PoseMatchSettings {
            match_position: false,
            match_rotation: false,
            ..Default::default()
        });
        let far = Transform::from_position(Vec3::new(100.0, 0.0, 0.0)).with_euler_degrees(90.0, 0.0, 0.0);

        assert!(gate.matches(&far, &Transform::identity()));
    }
}
