use crate::use_cases::GameEvent;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AppState {
    // Inputs flowing from the network into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    // Frames buffered per client before the fan-out gives up on it.
    pub client_buffer: usize,
}
