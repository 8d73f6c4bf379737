use crate::domain::registry::Registry;
use crate::domain::state::ChunkClaim;
use crate::domain::tuning::Tuning;
use crate::domain::vector;
use tracing::info;

/// Runs the level transition for every live player above the level-up threshold.
pub fn settle(registry: &mut Registry, tuning: &Tuning) {
    let threshold = tuning.economy.level_up_radius;
    let ready: Vec<u64> = registry
        .players
        .values()
        .filter(|p| p.is_live() && p.radius > threshold)
        .map(|p| p.id)
        .collect();

    for id in ready {
        transition(registry, tuning, id);
    }
}

fn transition(registry: &mut Registry, tuning: &Tuning, player_id: u64) -> Option<()> {
    let base = tuning.player.base_radius;
    let min_radius = tuning.player.min_radius;
    let et = &tuning.economy;
    let has_turret = registry.has_live_turret(player_id);

    let p = registry.live_player_mut(player_id)?;
    let excess = p.radius - base;
    let (pos, aim) = (p.pos, p.intent.aim);

    // A turret soaks up the whole excess, if it would be big enough to survive.
    if p.turret_capable && p.level >= et.turret_level && !has_turret {
        let turret_radius = excess * tuning.turret.radius_ratio;
        if turret_radius >= min_radius && base >= min_radius {
            p.radius = base;
            let turret_pos = pos - aim * (base + turret_radius);
            let turret_id =
                registry.spawn_turret(player_id, turret_pos, turret_radius, aim, tuning.turret.density);
            info!(player_id, turret_id, turret_radius, "turret deployed");
            return Some(());
        }
    }

    p.radius = base;
    p.level += 1;
    let level = p.level;

    if level <= et.max_level {
        p.shield = (level % 2 == 1).then(|| vector::angle_of(aim));
        p.turret_capable = level >= et.turret_level;

        let count = et.level_up_chunks.max(1);
        let radius = excess / count as f32;
        let claim = Some(ChunkClaim::new(player_id, tuning.chunk.claim_timeout));
        for dir in vector::radial_spread(count) {
            registry.spawn_chunk(
                pos + dir * (base + radius),
                dir * tuning.chunk.speed,
                radius,
                claim,
            );
        }
        info!(player_id, level, excess, "player leveled up");
        return Some(());
    }

    // Past the cap the excess comes out as a ring of bullets instead of more growth.
    let bt = &tuning.projectile;
    let count = et.overflow_bullets.max(1);
    let radius = excess / count as f32;
    for dir in vector::radial_spread(count) {
        registry.spawn_bullet(
            player_id,
            pos + dir * (base + radius),
            dir * bt.speed,
            radius,
            bt.life_time,
        );
    }
    info!(player_id, level, excess, "player overflowed");
    Some(())
}
