// Gameplay tuning, grouped per entity kind.
//
// Speeds and accelerations are in pixels per target tick; the physics step
// scales them by the tick multiplier. Lifetimes and cooldowns are in seconds.

pub mod chunk;
pub mod economy;
pub mod player;
pub mod projectile;
pub mod timestep;
pub mod turret;

pub use chunk::{ChunkTuning, ClaimPolicy};
pub use economy::EconomyTuning;
pub use player::PlayerTuning;
pub use projectile::ProjectileTuning;
pub use timestep::TimestepTuning;
pub use turret::TurretTuning;

/// Every gameplay knob the world needs, fixed at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub chunk: ChunkTuning,
    pub turret: TurretTuning,
    pub economy: EconomyTuning,
    pub timestep: TimestepTuning,
}

impl Tuning {
    /// How far a bullet travels before it expires.
    pub fn bullet_range(&self) -> f32 {
        self.projectile.speed * self.projectile.life_time / self.timestep.target.as_secs_f32()
    }
}
