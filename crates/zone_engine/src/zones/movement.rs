//! Snap movement profiles and easing curves

use crate::foundation::math::Transform;
use serde::{Deserialize, Serialize};

/// Easing applied to snap progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EasingCurve {
    /// Constant speed
    #[default]
    Linear,
    /// Hermite smoothstep (slow start and end)
    SmoothStep,
    /// Quadratic ease in
    EaseIn,
    /// Quadratic ease out
    EaseOut,
    /// Cubic ease in and out
    EaseInOut,
}

impl EasingCurve {
    /// Map linear progress in `[0, 1]` to eased progress in `[0, 1]`
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let f = -2.0 * t + 2.0;
                    1.0 - f * f * f / 2.0
                }
            }
        }
    }
}

/// How an attached object travels to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementProfile {
    /// Seconds from attach to snap
    pub duration: f32,
    /// Easing applied to progress
    pub easing: EasingCurve,
    /// Also animate scale toward the anchor's
    pub interpolate_scale: bool,
}

impl MovementProfile {
    /// Create a linear profile of the given duration
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            easing: EasingCurve::Linear,
            interpolate_scale: false,
        }
    }

    /// Builder pattern: Set easing
    pub fn with_easing(mut self, easing: EasingCurve) -> Self {
        self.easing = easing;
        self
    }

    /// Builder pattern: Animate scale as well
    pub fn with_scale(mut self, interpolate_scale: bool) -> Self {
        self.interpolate_scale = interpolate_scale;
        self
    }

    /// Linear progress after `elapsed` seconds
    pub fn progress(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Pose at linear `progress` on the way from `start` to `target`
    ///
    /// Scale stays at the start value unless the profile animates it.
    pub fn interpolate(&self, start: &Transform, target: &Transform, progress: f32) -> Transform {
        let mut pose = start.interpolate(target, self.easing.apply(progress));
        if !self.interpolate_scale {
            pose.scale = start.scale;
        }
        pose
    }
}

impl Default for MovementProfile {
    fn default() -> Self {
        Self::new(0.25)
    }
}
