// Entity registry: the only owner of live entity records.

use crate::domain::state::{Bullet, Chunk, ChunkClaim, Player, Turret};
use crate::domain::vector::Vec2;
use std::collections::BTreeMap;

/// Typed handle for an entity created during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Bullet(u64),
    Chunk(u64),
    Turret(u64),
}

/// Entities removed by a sweep, by kind.
#[derive(Debug, Default)]
pub struct Swept {
    pub players: Vec<Player>,
    pub bullets: Vec<u64>,
    pub chunks: Vec<u64>,
    pub turrets: Vec<u64>,
}

// BTreeMap keeps iteration in id order, so a tick is deterministic for a given input.
#[derive(Debug, Default)]
pub struct Registry {
    next_id: u64,
    pub players: BTreeMap<u64, Player>,
    pub bullets: BTreeMap<u64, Bullet>,
    pub chunks: BTreeMap<u64, Chunk>,
    pub turrets: BTreeMap<u64, Turret>,
    spawned: Vec<EntityRef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next process-unique id. Ids are shared across entity kinds and never reused.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn insert_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    /// Looks up a player that is still in play; deleted players count as gone.
    pub fn live_player(&self, id: u64) -> Option<&Player> {
        self.players.get(&id).filter(|p| p.is_live())
    }

    pub fn live_player_mut(&mut self, id: u64) -> Option<&mut Player> {
        self.players.get_mut(&id).filter(|p| p.is_live())
    }

    pub fn is_live_player(&self, id: u64) -> bool {
        self.live_player(id).is_some()
    }

    pub fn has_live_turret(&self, owner_id: u64) -> bool {
        self.turrets
            .values()
            .any(|t| !t.deleted && t.owner_id == owner_id)
    }

    pub fn spawn_bullet(
        &mut self,
        owner_id: u64,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        life: f32,
    ) -> u64 {
        let id = self.allocate_id();
        self.bullets.insert(
            id,
            Bullet {
                id,
                owner_id,
                pos,
                vel,
                radius,
                life,
                deleted: false,
            },
        );
        self.spawned.push(EntityRef::Bullet(id));
        id
    }

    pub fn spawn_chunk(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        claim: Option<ChunkClaim>,
    ) -> u64 {
        let id = self.allocate_id();
        self.chunks.insert(
            id,
            Chunk {
                id,
                pos,
                vel,
                radius,
                claim,
                deleted: false,
            },
        );
        self.spawned.push(EntityRef::Chunk(id));
        id
    }

    pub fn spawn_turret(
        &mut self,
        owner_id: u64,
        pos: Vec2,
        radius: f32,
        aim: Vec2,
        density: f32,
    ) -> u64 {
        let id = self.allocate_id();
        self.turrets.insert(
            id,
            Turret {
                id,
                owner_id,
                pos,
                vel: Vec2::ZERO,
                radius,
                aim,
                fire_cooldown: 0.0,
                density,
                deleted: false,
            },
        );
        self.spawned.push(EntityRef::Turret(id));
        id
    }

    /// Entities created since the last call, in creation order.
    pub fn take_spawned(&mut self) -> Vec<EntityRef> {
        std::mem::take(&mut self.spawned)
    }

    /// Deletes turrets whose owner is gone, then removes every deleted entity.
    pub fn sweep(&mut self) -> Swept {
        let orphaned: Vec<u64> = self
            .turrets
            .values()
            .filter(|t| !t.deleted && !self.is_live_player(t.owner_id))
            .map(|t| t.id)
            .collect();
        for id in orphaned {
            if let Some(t) = self.turrets.get_mut(&id) {
                t.deleted = true;
            }
        }

        let mut swept = Swept::default();
        let dead_players: Vec<u64> = self
            .players
            .values()
            .filter(|p| p.deleted)
            .map(|p| p.id)
            .collect();
        for id in dead_players {
            if let Some(p) = self.players.remove(&id) {
                swept.players.push(p);
            }
        }
        swept.bullets = drain_deleted(&mut self.bullets, |b| b.deleted);
        swept.chunks = drain_deleted(&mut self.chunks, |c| c.deleted);
        swept.turrets = drain_deleted(&mut self.turrets, |t| t.deleted);
        swept
    }
}

fn drain_deleted<T>(map: &mut BTreeMap<u64, T>, is_deleted: impl Fn(&T) -> bool) -> Vec<u64> {
    let ids: Vec<u64> = map
        .iter()
        .filter(|(_, v)| is_deleted(v))
        .map(|(id, _)| *id)
        .collect();
    for id in &ids {
        map.remove(id);
    }
    ids
}
