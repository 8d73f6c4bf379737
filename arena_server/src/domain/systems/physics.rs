use crate::domain::registry::Registry;
use crate::domain::timestep::TimeStep;
use crate::domain::tuning::Tuning;
use crate::domain::vector::{self, Vec2};

/// Advances every movable entity by one step.
pub fn integrate(registry: &mut Registry, tuning: &Tuning, map_size: Vec2, step: TimeStep) {
    let m = step.multiplier;
    let pt = &tuning.player;

    for p in registry.players.values_mut().filter(|p| p.is_live()) {
        // Bigger bodies are sluggish: both accel and top speed shrink with radius.
        let size_factor = pt.base_radius / p.radius;
        let accel = pt.accel * size_factor * m;
        let mut dv = Vec2::ZERO;
        if p.intent.left {
            dv.x -= accel;
        }
        if p.intent.right {
            dv.x += accel;
        }
        if p.intent.up {
            dv.y -= accel;
        }
        if p.intent.down {
            dv.y += accel;
        }
        p.vel = vector::clamp_length(p.vel + dv, pt.max_speed * size_factor);
        p.pos += p.vel * m;
        reflect(p.pos, &mut p.vel, map_size);

        if let Some(angle) = p.shield {
            let target = vector::angle_of(p.intent.aim);
            p.shield = Some(vector::turn_toward(angle, target, pt.shield_turn_rate * m));
        }
    }

    for b in registry.bullets.values_mut().filter(|b| !b.deleted) {
        b.pos += b.vel * m;
        reflect(b.pos, &mut b.vel, map_size);
        b.life -= step.dt;
        if b.life <= 0.0 {
            b.deleted = true;
        }
    }

    let chunk_drag = tuning.chunk.friction.powf(m);
    for c in registry.chunks.values_mut().filter(|c| !c.deleted) {
        c.pos += c.vel * m;
        c.vel *= chunk_drag;
        if let Some(claim) = c.claim.as_mut() {
            claim.remaining -= step.dt;
        }
        c.claim = c.active_claim();
        reflect(c.pos, &mut c.vel, map_size);
    }

    let turret_drag = tuning.turret.friction.powf(m);
    for t in registry.turrets.values_mut().filter(|t| !t.deleted) {
        t.pos += t.vel * m;
        t.vel *= turret_drag;
        reflect(t.pos, &mut t.vel, map_size);
    }
}

/// Flips velocity on any axis where the body is out of bounds and still heading out.
///
/// Position is left alone, so a body may sit outside the map for a tick.
pub fn reflect(pos: Vec2, vel: &mut Vec2, bounds: Vec2) {
    if (pos.x < 0.0 && vel.x < 0.0) || (pos.x > bounds.x && vel.x > 0.0) {
        vel.x = -vel.x;
    }
    if (pos.y < 0.0 && vel.y < 0.0) || (pos.y > bounds.y && vel.y > 0.0) {
        vel.y = -vel.y;
    }
}
