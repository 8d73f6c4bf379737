// Domain layer: core simulation types and rules.

pub mod events;
pub mod registry;
pub mod state;
pub mod systems;
pub mod timestep;
pub mod tuning;
pub mod vector;
pub mod world;

pub use events::{Audience, Envelope, WorldEvent};
pub use state::PlayerIntent;
pub use timestep::TimeStep;
pub use tuning::Tuning;
pub use world::World;
