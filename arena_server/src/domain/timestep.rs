// Clamped variable timestep for the physics loop.

use crate::domain::tuning::TimestepTuning;
use std::time::Duration;

/// One physics step's worth of time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep {
    /// Clamped elapsed seconds.
    pub dt: f32,
    /// `dt` relative to the target step; scales every per-tick velocity/position change.
    pub multiplier: f32,
}

impl TimeStep {
    /// Clamps a measured wall-clock gap into a usable step.
    pub fn from_elapsed(elapsed: Duration, cfg: &TimestepTuning) -> Self {
        let clamped = elapsed.clamp(cfg.min, cfg.max);
        let dt = clamped.as_secs_f32();
        Self {
            dt,
            multiplier: dt / cfg.target.as_secs_f32(),
        }
    }

    /// A step of exactly the target length.
    pub fn nominal(cfg: &TimestepTuning) -> Self {
        Self::from_elapsed(cfg.target, cfg)
    }
}
