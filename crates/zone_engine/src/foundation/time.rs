//! Time management utilities
//!
//! Zones advance on a fixed simulation step; frames arrive with whatever
//! delta the host produces. [`FixedTimestep`] bridges the two.

/// Accumulator turning variable frame deltas into fixed simulation steps
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
    max_steps_per_frame: u32,
    total_steps: u64,
}

impl FixedTimestep {
    /// Default cap on steps per frame (avoids the spiral of death)
    pub const DEFAULT_MAX_STEPS: u32 = 8;

    /// Create a fixed timestep with the given step length in seconds
    pub fn new(step: f32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            accumulator: 0.0,
            max_steps_per_frame: Self::DEFAULT_MAX_STEPS,
            total_steps: 0,
        }
    }

    /// Builder pattern: Set the maximum number of steps run per frame
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps_per_frame = max_steps.max(1);
        self
    }

    /// Length of one step in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feed a frame delta and return how many fixed steps to run
    ///
    /// Time beyond the per-frame cap is dropped rather than carried over.
    pub fn accumulate(&mut self, frame_delta: f32) -> u32 {
        self.accumulator += frame_delta.max(0.0);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps_per_frame {
            self.accumulator -= self.step;
            steps += 1;
        }

        if steps == self.max_steps_per_frame && self.accumulator >= self.step {
            log::warn!(
                "Fixed timestep fell behind, dropping {:.3}s of simulation time",
                self.accumulator
            );
            self.accumulator %= self.step;
        }

        self.total_steps += u64::from(steps);
        steps
    }

    /// Fraction of a step left in the accumulator (for render interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Total number of steps produced so far
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
