// Drives the two world cadences off the monotonic tokio clock.

use crate::domain::TimeStep;
use crate::domain::tuning::TimestepTuning;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    Physics(TimeStep),
    Broadcast,
}

pub struct Scheduler {
    physics: Interval,
    broadcast: Interval,
    last_physics: Instant,
    timestep: TimestepTuning,
}

impl Scheduler {
    pub fn new(physics_every: Duration, broadcast_every: Duration, timestep: TimestepTuning) -> Self {
        let mut physics = interval(physics_every);
        physics.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut broadcast = interval(broadcast_every);
        broadcast.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            physics,
            broadcast,
            last_physics: Instant::now(),
            timestep,
        }
    }

    /// Waits for whichever cadence fires next. Physics wins ties so broadcasts
    /// always carry the latest state.
    pub async fn next(&mut self) -> Trigger {
        tokio::select! {
            biased;
            _ = self.physics.tick() => {
                // Measure real time, not the interval's deadline, so a stall shows up as one long step.
                let now = Instant::now();
                let elapsed = now.saturating_duration_since(self.last_physics);
                self.last_physics = now;
                Trigger::Physics(TimeStep::from_elapsed(elapsed, &self.timestep))
            }
            _ = self.broadcast.tick() => Trigger::Broadcast,
        }
    }
}
