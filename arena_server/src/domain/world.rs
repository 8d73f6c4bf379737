// The authoritative world: registry, map and the outbound event queue.

use crate::domain::events::{Envelope, WorldEvent};
use crate::domain::registry::{EntityRef, Registry};
use crate::domain::state::{
    BulletSnapshot, ChunkSnapshot, Player, PlayerIntent, PlayerSnapshot, TurretSnapshot,
};
use crate::domain::systems::{attraction, combat, economy, physics, turret_ai};
use crate::domain::timestep::TimeStep;
use crate::domain::tuning::Tuning;
use crate::domain::vector::{self, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Arena extent for a given number of connected players.
pub fn map_size_for(players: usize) -> Vec2 {
    if players == 0 {
        return Vec2::ONE;
    }
    let width = 960.0 * 1.5 * players as f32;
    Vec2::new(width, width / 1920.0 * 1080.0)
}

pub struct World {
    tuning: Tuning,
    allow_upgrayde: bool,
    registry: Registry,
    // Eliminated players whose connection is still open, waiting for a respawn request.
    graveyard: BTreeMap<u64, Player>,
    map_size: Vec2,
    rng: StdRng,
    outbox: Vec<Envelope>,
}

impl World {
    pub fn new(tuning: Tuning, allow_upgrayde: bool) -> Self {
        Self::with_rng(tuning, allow_upgrayde, StdRng::from_entropy())
    }

    /// Deterministic spawn positions, for tests.
    pub fn with_seed(tuning: Tuning, allow_upgrayde: bool, seed: u64) -> Self {
        Self::with_rng(tuning, allow_upgrayde, StdRng::seed_from_u64(seed))
    }

    fn with_rng(tuning: Tuning, allow_upgrayde: bool, rng: StdRng) -> Self {
        Self {
            tuning,
            allow_upgrayde,
            registry: Registry::new(),
            graveyard: BTreeMap::new(),
            map_size: map_size_for(0),
            rng,
            outbox: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn map_size(&self) -> Vec2 {
        self.map_size
    }

    pub fn connected_count(&self) -> usize {
        self.registry.players.len() + self.graveyard.len()
    }

    pub fn is_eliminated(&self, player_id: u64) -> bool {
        self.graveyard.contains_key(&player_id)
    }

    /// Events produced since the last drain, in the order clients must see them.
    pub fn drain_events(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.outbox)
    }

    /// Adds a player for a new connection and queues its initial sync.
    pub fn connect(&mut self, name: String) -> u64 {
        let id = self.registry.allocate_id();
        self.map_size = map_size_for(self.connected_count() + 1);
        let pos = self.random_position();
        let player = Player::new(id, name, pos, &self.tuning.player);
        let snapshot = PlayerSnapshot::from(&player);
        self.registry.insert_player(player);

        // Everyone already in the arena (and the newcomer itself) for the new client.
        for p in self.registry.players.values().filter(|p| p.is_live()) {
            self.outbox
                .push(Envelope::only(id, WorldEvent::PlayerSpawned(p.into())));
        }
        self.outbox
            .push(Envelope::all_except(id, WorldEvent::PlayerSpawned(snapshot)));
        self.outbox.push(Envelope::only(id, WorldEvent::Identity(id)));

        // Snapshot of everything else alive, before any move event can reference it.
        for b in self.registry.bullets.values().filter(|b| !b.deleted) {
            self.outbox
                .push(Envelope::only(id, WorldEvent::BulletSpawned(b.into())));
        }
        for c in self.registry.chunks.values().filter(|c| !c.deleted) {
            self.outbox
                .push(Envelope::only(id, WorldEvent::ChunkSpawned(c.into())));
        }
        for t in self.registry.turrets.values().filter(|t| !t.deleted) {
            self.outbox
                .push(Envelope::only(id, WorldEvent::TurretSpawned(t.into())));
        }
        self.outbox
            .push(Envelope::all(WorldEvent::MapResized(self.map_size)));

        info!(player_id = id, players = self.connected_count(), "player connected");
        id
    }

    /// Removes a player immediately, live or eliminated, along with its turrets.
    pub fn disconnect(&mut self, player_id: u64) {
        let was_live = self
            .registry
            .players
            .remove(&player_id)
            .is_some_and(|p| p.is_live());
        let was_dead = self.graveyard.remove(&player_id).is_some();
        if !was_live && !was_dead {
            debug!(player_id, "disconnect for unknown player");
            return;
        }

        if was_live {
            self.outbox
                .push(Envelope::all(WorldEvent::PlayerDeleted(player_id)));
        }
        self.finish_tick();

        let players = self.connected_count();
        self.map_size = map_size_for(players);
        if players > 0 {
            self.outbox
                .push(Envelope::all(WorldEvent::MapResized(self.map_size)));
        }
        info!(player_id, players, "player disconnected");
    }

    /// Replaces the control intent of a live player. A zero aim keeps the previous aim.
    pub fn apply_intent(&mut self, player_id: u64, mut intent: PlayerIntent) -> bool {
        let Some(p) = self.registry.live_player_mut(player_id) else {
            return false;
        };
        intent.aim = vector::normalize_or(intent.aim, p.intent.aim);
        p.intent = intent;
        true
    }

    /// Brings an eliminated player back with initial progression.
    pub fn respawn(&mut self, player_id: u64) -> bool {
        let Some(mut player) = self.graveyard.remove(&player_id) else {
            debug!(player_id, "respawn ignored; player is not eliminated");
            return false;
        };
        let pos = self.random_position();
        player.respawn_at(pos, &self.tuning.player);
        self.outbox
            .push(Envelope::all(WorldEvent::PlayerSpawned((&player).into())));
        self.registry.insert_player(player);
        info!(player_id, "player respawned");
        true
    }

    /// Debug command: inflates a player past the level-up threshold. No-op unless enabled.
    pub fn upgrayde(&mut self, player_id: u64) -> bool {
        if !self.allow_upgrayde {
            return false;
        }
        let target = self.tuning.economy.level_up_radius + self.tuning.player.base_radius;
        let Some(p) = self.registry.live_player_mut(player_id) else {
            return false;
        };
        p.radius = p.radius.max(target);
        info!(player_id, "upgrayde applied");
        true
    }

    /// One simulation tick. Systems run in a fixed order so that everything a kill causes
    /// is settled before the tick's events go out.
    pub fn step(&mut self, step: TimeStep) {
        physics::integrate(&mut self.registry, &self.tuning, self.map_size, step);
        combat::resolve(&mut self.registry, &self.tuning, step);
        economy::settle(&mut self.registry, &self.tuning);
        attraction::attract(&mut self.registry, &self.tuning);
        turret_ai::operate(&mut self.registry, &self.tuning, step);
        self.finish_tick();
    }

    /// Full-state position sync for every live entity.
    pub fn broadcast_state(&mut self) {
        let reg = &self.registry;
        let players = reg.players.values().filter(|p| p.is_live());
        self.outbox.extend(
            players.map(|p| Envelope::all(WorldEvent::PlayerMoved(PlayerSnapshot::from(p)))),
        );
        let bullets = reg.bullets.values().filter(|b| !b.deleted);
        self.outbox.extend(
            bullets.map(|b| Envelope::all(WorldEvent::BulletMoved(BulletSnapshot::from(b)))),
        );
        let chunks = reg.chunks.values().filter(|c| !c.deleted);
        self.outbox.extend(
            chunks.map(|c| Envelope::all(WorldEvent::ChunkMoved(ChunkSnapshot::from(c)))),
        );
        let turrets = reg.turrets.values().filter(|t| !t.deleted);
        self.outbox.extend(
            turrets.map(|t| Envelope::all(WorldEvent::TurretMoved(TurretSnapshot::from(t)))),
        );
    }

    // Announces this tick's creations, then sweeps the dead. An entity created and destroyed
    // within the same tick was never announced, so it gets neither event.
    fn finish_tick(&mut self) {
        let spawned = self.registry.take_spawned();
        let swept = self.registry.sweep();

        let born: HashSet<EntityRef> = spawned.iter().copied().collect();
        for entity in spawned {
            let event = match entity {
                EntityRef::Bullet(id) => self
                    .registry
                    .bullets
                    .get(&id)
                    .map(|b| WorldEvent::BulletSpawned(b.into())),
                EntityRef::Chunk(id) => self
                    .registry
                    .chunks
                    .get(&id)
                    .map(|c| WorldEvent::ChunkSpawned(c.into())),
                EntityRef::Turret(id) => self
                    .registry
                    .turrets
                    .get(&id)
                    .map(|t| WorldEvent::TurretSpawned(t.into())),
            };
            if let Some(event) = event {
                self.outbox.push(Envelope::all(event));
            }
        }

        for player in swept.players {
            self.outbox
                .push(Envelope::all(WorldEvent::PlayerDeleted(player.id)));
            self.graveyard.insert(player.id, player);
        }
        for id in swept.bullets {
            if !born.contains(&EntityRef::Bullet(id)) {
                self.outbox.push(Envelope::all(WorldEvent::BulletDeleted(id)));
            }
        }
        for id in swept.chunks {
            if !born.contains(&EntityRef::Chunk(id)) {
                self.outbox.push(Envelope::all(WorldEvent::ChunkDeleted(id)));
            }
        }
        for id in swept.turrets {
            if !born.contains(&EntityRef::Turret(id)) {
                self.outbox.push(Envelope::all(WorldEvent::TurretDeleted(id)));
            }
        }
    }

    fn random_position(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.r#gen::<f32>() * self.map_size.x,
            self.rng.r#gen::<f32>() * self.map_size.y,
        )
    }
}
