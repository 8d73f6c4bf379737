/// Gameplay tuning for bullets.

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Muzzle speed, added to the shooter's velocity.
    pub speed: f32,

    /// Lifetime in seconds before the bullet is despawned.
    pub life_time: f32,

    /// World-space collision radius; also the damage a hit deals.
    pub radius: f32,

    /// Restitution used when a shield deflects the bullet.
    pub restitution: f32,

    pub density: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 10.0,
            life_time: 1.0,
            radius: 5.0,
            restitution: 1.0,
            density: 1.0,
        }
    }
}
