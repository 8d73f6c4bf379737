// 2D vector helpers on top of glam.

pub use glam::Vec2;

/// Unit vector pointing along `angle` (radians, +x = 0, +y = clockwise on screen).
pub fn from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of `v` in radians, matching `from_angle`.
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Normalizes `v`, or returns `fallback` when `v` has no usable direction.
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    v.try_normalize().unwrap_or(fallback)
}

/// Scales `v` down to `max_len` if it is longer; shorter vectors pass through.
pub fn clamp_length(v: Vec2, max_len: f32) -> Vec2 {
    v.clamp_length_max(max_len)
}

/// `count` unit vectors evenly spaced around the circle, starting at +x.
pub fn radial_spread(count: usize) -> impl Iterator<Item = Vec2> {
    let step = std::f32::consts::TAU / count.max(1) as f32;
    (0..count).map(move |k| from_angle(step * k as f32))
}

/// Rotates `current` toward `target` by at most `max_delta` radians, taking the short way round.
pub fn turn_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let mut diff = (target - current) % std::f32::consts::TAU;
    if diff > std::f32::consts::PI {
        diff -= std::f32::consts::TAU;
    } else if diff < -std::f32::consts::PI {
        diff += std::f32::consts::TAU;
    }
    current + diff.clamp(-max_delta, max_delta)
}
