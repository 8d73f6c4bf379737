use crate::domain::registry::Registry;
use crate::domain::timestep::TimeStep;
use crate::domain::tuning::Tuning;
use crate::domain::vector;

/// Aims each turret at the nearest enemy in bullet range and fires when cooled down.
pub fn operate(registry: &mut Registry, tuning: &Tuning, step: TimeStep) {
    let range = tuning.bullet_range();
    let bt = &tuning.projectile;
    let ids: Vec<u64> = registry.turrets.keys().copied().collect();

    for turret_id in ids {
        let Some(turret) = registry.turrets.get_mut(&turret_id).filter(|t| !t.deleted) else {
            continue;
        };
        turret.fire_cooldown = (turret.fire_cooldown - step.dt).max(0.0);
        let (pos, owner_id) = (turret.pos, turret.owner_id);

        if !registry.is_live_player(owner_id) {
            continue;
        }
        let target = registry
            .players
            .values()
            .filter(|p| p.is_live() && p.id != owner_id)
            .map(|p| (p.pos, p.pos.distance(pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let Some((target_pos, distance)) = target else {
            continue;
        };
        if distance > range {
            continue;
        }

        let Some(turret) = registry.turrets.get_mut(&turret_id) else {
            continue;
        };
        // No lead: aim straight at where the target is now.
        turret.aim = vector::normalize_or(target_pos - pos, turret.aim);
        if turret.fire_cooldown > 0.0 {
            continue;
        }
        turret.fire_cooldown = tuning.turret.fire_cooldown;
        let muzzle = pos + turret.aim * (turret.radius + bt.radius);
        let vel = turret.aim * bt.speed + turret.vel;
        registry.spawn_bullet(owner_id, muzzle, vel, bt.radius, bt.life_time);
    }
}
