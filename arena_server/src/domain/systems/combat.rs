use crate::domain::registry::Registry;
use crate::domain::state::{mass, Bullet, ChunkClaim, Player};
use crate::domain::timestep::TimeStep;
use crate::domain::tuning::Tuning;
use crate::domain::vector::{self, Vec2};
use tracing::{debug, info};

/// Circular rigid body as seen by the collision solver.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub restitution: f32,
}

impl From<&Player> for Body {
    fn from(p: &Player) -> Self {
        Self {
            pos: p.pos,
            vel: p.vel,
            radius: p.radius,
            mass: p.mass(),
            restitution: p.restitution,
        }
    }
}

/// Impulse to add to `b` (and subtract from `a`) for two touching bodies.
///
/// Returns `None` when the bodies are already moving apart. Resting overlaps still get a
/// push proportional to penetration, so they separate instead of sticking.
pub fn elastic_impulse(a: &Body, b: &Body, separation_bias: f32) -> Option<Vec2> {
    let delta = b.pos - a.pos;
    let normal = vector::normalize_or(delta, Vec2::X);
    let approach = (b.vel - a.vel).dot(normal);
    if approach > 0.0 {
        return None;
    }

    let penetration = (a.radius + b.radius - delta.length()).max(0.0);
    let restitution = a.restitution.min(b.restitution);
    let inv_mass = 1.0 / a.mass + 1.0 / b.mass;
    let j = ((1.0 + restitution) * -approach + separation_bias * penetration) / inv_mass;
    (j > 0.0).then_some(normal * j)
}

/// Fires, then resolves bullet hits and body contacts for this tick.
pub fn resolve(registry: &mut Registry, tuning: &Tuning, step: TimeStep) {
    fire_players(registry, tuning, step);
    bullets_vs_players(registry, tuning);
    bullets_vs_turrets(registry, tuning);
    players_vs_players(registry, tuning);
}

/// Takes `amount` of radius from a live player and eliminates it if it drops below the
/// minimum viable size. Every radius loss goes through here.
///
/// Returns true when the player was eliminated.
pub fn damage_player(
    registry: &mut Registry,
    tuning: &Tuning,
    victim_id: u64,
    amount: f32,
    killer_id: Option<u64>,
) -> bool {
    let Some(victim) = registry.live_player_mut(victim_id) else {
        return false;
    };
    victim.radius -= amount;
    if victim.radius >= tuning.player.min_radius {
        return false;
    }

    victim.deleted = true;
    let (residual, pos, vel) = (victim.radius, victim.pos, victim.vel);
    if residual > 0.0 {
        registry.spawn_chunk(pos, vel, residual, None);
    }

    let credited = killer_id.filter(|k| *k != victim_id);
    if let Some(killer) = credited.and_then(|k| registry.live_player_mut(k)) {
        killer.kills += 1;
    }
    info!(victim_id, killer_id = ?credited, residual, "player eliminated");
    true
}

fn fire_players(registry: &mut Registry, tuning: &Tuning, step: TimeStep) {
    let bt = &tuning.projectile;
    let ids: Vec<u64> = registry.players.keys().copied().collect();
    for id in ids {
        let Some(p) = registry.live_player_mut(id) else {
            continue;
        };
        p.fire_cooldown = (p.fire_cooldown - step.dt).max(0.0);
        if !p.intent.fire || p.fire_cooldown > 0.0 {
            continue;
        }
        p.fire_cooldown = tuning.player.fire_cooldown;

        let aim = p.intent.aim;
        // Spawn at the edge of the body so the shooter is not inside its own bullet.
        let pos = p.pos + aim * (p.radius + bt.radius);
        let vel = aim * bt.speed + p.vel;
        registry.spawn_bullet(id, pos, vel, bt.radius, bt.life_time);
        damage_player(
            registry,
            tuning,
            id,
            bt.radius * tuning.player.fire_cost_fraction,
            None,
        );
    }
}

fn shield_deflects(player: &Player, bullet_pos: Vec2, acceptance: f32) -> bool {
    let Some(angle) = player.shield else {
        return false;
    };
    let Some(toward_bullet) = (bullet_pos - player.pos).try_normalize() else {
        return false;
    };
    toward_bullet.dot(vector::from_angle(angle)) > acceptance
}

fn bullet_body(b: &Bullet, tuning: &Tuning) -> Body {
    Body {
        pos: b.pos,
        vel: b.vel,
        radius: b.radius,
        mass: mass(b.radius, tuning.projectile.density),
        restitution: tuning.projectile.restitution,
    }
}

fn claim(owner_id: u64, tuning: &Tuning) -> Option<ChunkClaim> {
    Some(ChunkClaim::new(owner_id, tuning.chunk.claim_timeout))
}

fn bullets_vs_players(registry: &mut Registry, tuning: &Tuning) {
    let ids: Vec<u64> = registry.bullets.keys().copied().collect();
    for bullet_id in ids {
        let Some(bullet) = registry.bullets.get(&bullet_id).filter(|b| !b.deleted).cloned() else {
            continue;
        };
        // First live non-owner in contact takes the bullet.
        let Some(target) = registry
            .players
            .values()
            .filter(|p| p.is_live() && p.id != bullet.owner_id)
            .find(|p| p.pos.distance(bullet.pos) < p.radius + bullet.radius)
        else {
            continue;
        };
        let target_id = target.id;

        if shield_deflects(target, bullet.pos, tuning.player.shield_acceptance) {
            let player_body = Body::from(target);
            let shot = bullet_body(&bullet, tuning);
            if let Some(j) = elastic_impulse(&player_body, &shot, tuning.player.separation_bias) {
                if let Some(p) = registry.players.get_mut(&target_id) {
                    p.vel -= j / player_body.mass;
                }
                if let Some(b) = registry.bullets.get_mut(&bullet_id) {
                    b.vel += j / shot.mass;
                }
            }
            debug!(player_id = target_id, bullet_id, "bullet deflected by shield");
            continue;
        }

        if let Some(b) = registry.bullets.get_mut(&bullet_id) {
            b.deleted = true;
        }
        let dir = vector::normalize_or(bullet.vel, Vec2::X);
        let (edge, vel) = (target.pos + dir * target.radius, target.vel);
        let debris = bullet.radius;
        registry.spawn_chunk(
            edge + dir * debris,
            vel + dir * tuning.chunk.speed,
            debris,
            claim(target_id, tuning),
        );
        debug!(
            victim_id = target_id,
            shooter_id = bullet.owner_id,
            bullet_id,
            "player hit"
        );
        damage_player(registry, tuning, target_id, debris, Some(bullet.owner_id));
    }
}

fn bullets_vs_turrets(registry: &mut Registry, tuning: &Tuning) {
    let min_radius = tuning.player.min_radius;
    let ids: Vec<u64> = registry.bullets.keys().copied().collect();
    for bullet_id in ids {
        let Some(bullet) = registry.bullets.get(&bullet_id).filter(|b| !b.deleted).cloned() else {
            continue;
        };
        // A player's own bullets pass through its turret.
        let Some(turret) = registry
            .turrets
            .values_mut()
            .filter(|t| !t.deleted && t.owner_id != bullet.owner_id)
            .find(|t| t.pos.distance(bullet.pos) < t.radius + bullet.radius)
        else {
            continue;
        };

        let shot_mass = mass(bullet.radius, tuning.projectile.density);
        turret.vel += bullet.vel * (shot_mass / turret.mass());
        turret.radius -= bullet.radius;
        let dir = vector::normalize_or(bullet.vel, Vec2::X);
        let (turret_id, owner_id, pos, radius) =
            (turret.id, turret.owner_id, turret.pos, turret.radius);
        let destroyed = radius < min_radius;
        if destroyed {
            turret.deleted = true;
        }

        if let Some(b) = registry.bullets.get_mut(&bullet_id) {
            b.deleted = true;
        }
        registry.spawn_chunk(
            pos + dir * (radius.max(0.0) + bullet.radius),
            dir * tuning.chunk.speed,
            bullet.radius,
            claim(owner_id, tuning),
        );
        if destroyed {
            if radius > 0.0 {
                registry.spawn_chunk(pos, Vec2::ZERO, radius, claim(owner_id, tuning));
            }
            info!(turret_id, owner_id, shooter_id = bullet.owner_id, "turret destroyed");
        }
    }
}

fn players_vs_players(registry: &mut Registry, tuning: &Tuning) {
    let bodies: Vec<(u64, Body)> = registry
        .players
        .values()
        .filter(|p| p.is_live())
        .map(|p| (p.id, Body::from(p)))
        .collect();

    // Every unordered pair exactly once, all against start-of-pass velocities, so the result
    // does not depend on which pair happens to be visited first.
    let mut impulses: Vec<(u64, u64, Vec2)> = Vec::new();
    for (i, (a_id, a)) in bodies.iter().enumerate() {
        for (b_id, b) in &bodies[i + 1..] {
            if a.pos.distance(b.pos) >= a.radius + b.radius {
                continue;
            }
            if let Some(j) = elastic_impulse(a, b, tuning.player.separation_bias) {
                impulses.push((*a_id, *b_id, j));
            }
        }
    }

    for (a_id, b_id, j) in impulses {
        if let Some(a) = registry.players.get_mut(&a_id) {
            a.vel -= j / a.mass();
        }
        if let Some(b) = registry.players.get_mut(&b_id) {
            b.vel += j / b.mass();
        }
    }
}
