/// Gameplay tuning for player bodies.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Radius a player spawns with and returns to after every level transition.
    pub base_radius: f32,

    /// Below this radius a player (or turret) is eliminated.
    pub min_radius: f32,

    /// Acceleration per active movement flag at base radius.
    pub accel: f32,

    /// Speed cap at base radius; both scale with `base_radius / radius`.
    pub max_speed: f32,

    /// Seconds between shots.
    pub fire_cooldown: f32,

    /// Share of the bullet radius a shot costs the shooter.
    pub fire_cost_fraction: f32,

    /// Coefficient of restitution for body collisions.
    pub restitution: f32,

    /// Mass density; mass is `radius^2 * pi * density`.
    pub density: f32,

    /// Max shield turn per tick, radians.
    pub shield_turn_rate: f32,

    /// Minimum dot product between shield facing and the incoming bullet for a deflection.
    pub shield_acceptance: f32,

    /// Extra impulse per pixel of overlap so bodies resting inside each other separate.
    pub separation_bias: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            base_radius: 30.0,
            min_radius: 8.0,
            accel: 5.0 / 60.0,
            max_speed: 200.0 / 60.0,
            fire_cooldown: 0.25,
            fire_cost_fraction: 0.1,
            restitution: 0.8,
            density: 1.0,
            shield_turn_rate: 0.08,
            shield_acceptance: 0.5,
            separation_bias: 0.1,
        }
    }
}
