// Outbound world events and who should receive them.

use crate::domain::state::{BulletSnapshot, ChunkSnapshot, PlayerSnapshot, TurretSnapshot};
use crate::domain::vector::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    PlayerSpawned(PlayerSnapshot),
    /// Tells one connection which player it controls.
    Identity(u64),
    PlayerMoved(PlayerSnapshot),
    PlayerDeleted(u64),

    BulletSpawned(BulletSnapshot),
    BulletMoved(BulletSnapshot),
    BulletDeleted(u64),

    ChunkSpawned(ChunkSnapshot),
    ChunkMoved(ChunkSnapshot),
    ChunkDeleted(u64),

    TurretSpawned(TurretSnapshot),
    TurretMoved(TurretSnapshot),
    TurretDeleted(u64),

    MapResized(Vec2),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    All,
    Only(u64),
    AllExcept(u64),
}

impl Audience {
    pub fn includes(&self, player_id: u64) -> bool {
        match *self {
            Audience::All => true,
            Audience::Only(id) => id == player_id,
            Audience::AllExcept(id) => id != player_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub audience: Audience,
    pub event: WorldEvent,
}

impl Envelope {
    pub fn all(event: WorldEvent) -> Self {
        Self {
            audience: Audience::All,
            event,
        }
    }

    pub fn only(player_id: u64, event: WorldEvent) -> Self {
        Self {
            audience: Audience::Only(player_id),
            event,
        }
    }

    pub fn all_except(player_id: u64, event: WorldEvent) -> Self {
        Self {
            audience: Audience::AllExcept(player_id),
            event,
        }
    }
}
