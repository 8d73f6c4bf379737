// Use cases layer: application workflows for the arena server.

pub mod game;
pub mod scheduler;
pub mod types;

pub use game::{WorldSettings, world_task};
pub use types::{ClientCommand, ClientSink, GameEvent, Outbound};
