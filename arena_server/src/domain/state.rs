// Domain-level simulation entities and input/snapshot types.

use crate::domain::tuning::PlayerTuning;
use crate::domain::vector::Vec2;

pub fn mass(radius: f32, density: f32) -> f32 {
    radius * radius * std::f32::consts::PI * density
}

/// Latest control intent received for a player; consumed by the next physics step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerIntent {
    pub aim: Vec2,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

impl Default for PlayerIntent {
    fn default() -> Self {
        Self {
            aim: Vec2::X,
            left: false,
            right: false,
            up: false,
            down: false,
            fire: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: u64,
    pub name: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,

    // Progression.
    pub level: u32,
    pub kills: u32,
    /// Facing of the shield arc; `None` at levels without a shield.
    pub shield: Option<f32>,
    pub turret_capable: bool,

    // Body coefficients.
    pub restitution: f32,
    pub density: f32,

    // Input-driven state (not all of it is serialized to clients).
    pub intent: PlayerIntent,
    pub fire_cooldown: f32,

    pub deleted: bool,
}

impl Player {
    pub fn new(id: u64, name: String, pos: Vec2, tuning: &PlayerTuning) -> Self {
        Self {
            id,
            name,
            pos,
            vel: Vec2::ZERO,
            radius: tuning.base_radius,
            level: 0,
            kills: 0,
            shield: None,
            turret_capable: false,
            restitution: tuning.restitution,
            density: tuning.density,
            intent: PlayerIntent::default(),
            fire_cooldown: 0.0,
            deleted: false,
        }
    }

    /// Puts an eliminated player back into play with initial progression.
    pub fn respawn_at(&mut self, pos: Vec2, tuning: &PlayerTuning) {
        let name = std::mem::take(&mut self.name);
        *self = Self::new(self.id, name, pos, tuning);
    }

    pub fn mass(&self) -> f32 {
        mass(self.radius, self.density)
    }

    pub fn is_live(&self) -> bool {
        !self.deleted
    }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: u64,
    pub owner_id: u64,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Seconds left before the bullet expires.
    pub life: f32,
    pub deleted: bool,
}

/// Ownership window on a chunk; see `ClaimPolicy` for who it favours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkClaim {
    pub owner_id: u64,
    /// Seconds left in the owner's window; counts down with each physics step.
    pub remaining: f32,
}

impl ChunkClaim {
    pub fn new(owner_id: u64, window: f32) -> Self {
        Self {
            owner_id,
            remaining: window,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: u64,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub claim: Option<ChunkClaim>,
    pub deleted: bool,
}

impl Chunk {
    /// The claim, if its window is still open.
    pub fn active_claim(&self) -> Option<ChunkClaim> {
        self.claim.filter(|c| c.remaining > 0.0)
    }
}

#[derive(Debug, Clone)]
pub struct Turret {
    pub id: u64,
    pub owner_id: u64,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub aim: Vec2,
    pub fire_cooldown: f32,
    pub density: f32,
    pub deleted: bool,
}

impl Turret {
    pub fn mass(&self) -> f32 {
        mass(self.radius, self.density)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: u64,
    pub name: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub aim: Vec2,
    pub radius: f32,
    pub level: u32,
    pub kills: u32,
    pub shield: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulletSnapshot {
    pub id: u64,
    pub owner_id: u64,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSnapshot {
    pub id: u64,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurretSnapshot {
    pub id: u64,
    pub owner_id: u64,
    pub pos: Vec2,
    pub vel: Vec2,
    pub aim: Vec2,
    pub radius: f32,
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            pos: p.pos,
            vel: p.vel,
            aim: p.intent.aim,
            radius: p.radius,
            level: p.level,
            kills: p.kills,
            shield: p.shield,
        }
    }
}

impl From<&Bullet> for BulletSnapshot {
    fn from(b: &Bullet) -> Self {
        Self {
            id: b.id,
            owner_id: b.owner_id,
            pos: b.pos,
            vel: b.vel,
            radius: b.radius,
        }
    }
}

impl From<&Chunk> for ChunkSnapshot {
    fn from(c: &Chunk) -> Self {
        Self {
            id: c.id,
            pos: c.pos,
            vel: c.vel,
            radius: c.radius,
        }
    }
}

impl From<&Turret> for TurretSnapshot {
    fn from(t: &Turret) -> Self {
        Self {
            id: t.id,
            owner_id: t.owner_id,
            pos: t.pos,
            vel: t.vel,
            aim: t.aim,
            radius: t.radius,
        }
    }
}
