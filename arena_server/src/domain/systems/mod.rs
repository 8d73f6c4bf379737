// Per-tick simulation systems, run by `World::step` in declaration order.

pub mod physics;
pub mod combat;
pub mod economy;
pub mod attraction;
pub mod turret_ai;
