/// Gameplay tuning for owner-bound turrets.

#[derive(Debug, Clone, Copy)]
pub struct TurretTuning {
    /// Turret radius as a share of the excess radius that spawned it.
    pub radius_ratio: f32,

    /// Seconds between turret shots.
    pub fire_cooldown: f32,

    /// Knockback velocity retained per tick.
    pub friction: f32,

    pub density: f32,
}

impl Default for TurretTuning {
    fn default() -> Self {
        Self {
            radius_ratio: 1.0,
            fire_cooldown: 0.6,
            friction: 0.9,
            density: 1.0,
        }
    }
}
