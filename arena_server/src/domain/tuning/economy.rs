/// Growth and leveling thresholds.

#[derive(Debug, Clone, Copy)]
pub struct EconomyTuning {
    /// A player whose radius exceeds this transitions on the next economy pass.
    pub level_up_radius: f32,

    /// Highest level that still grants a real upgrade.
    pub max_level: u32,

    /// Minimum level at which a player can deploy a turret.
    pub turret_level: u32,

    /// Chunks ejected on a regular level-up.
    pub level_up_chunks: usize,

    /// Bullets fired when a capped player overflows.
    pub overflow_bullets: usize,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            level_up_radius: 60.0,
            max_level: 3,
            turret_level: 2,
            level_up_chunks: 6,
            overflow_bullets: 8,
        }
    }
}
