use std::time::Duration;

/// Bounds for the variable physics step.
#[derive(Debug, Clone, Copy)]
pub struct TimestepTuning {
    /// Step length all per-tick constants are expressed against.
    pub target: Duration,

    /// Lower clamp on the measured step.
    pub min: Duration,

    /// Upper clamp on the measured step, so a stall cannot blow up integration.
    pub max: Duration,
}

impl Default for TimestepTuning {
    fn default() -> Self {
        Self {
            target: Duration::from_millis(16),
            min: Duration::from_millis(1),
            max: Duration::from_millis(64),
        }
    }
}
