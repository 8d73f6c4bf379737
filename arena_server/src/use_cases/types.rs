// Use-case level inputs/outputs for the world loop.

use crate::domain::{Envelope, PlayerIntent};
use axum::extract::ws::Utf8Bytes;
use tokio::sync::{mpsc, oneshot};

/// Bounded per-connection queue of serialized frames.
pub type ClientSink = mpsc::Sender<Utf8Bytes>;

/// Decoded client request, already validated by the protocol layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    Controls(PlayerIntent),
    Spawn,
    Upgrayde,
}

#[derive(Debug)]
pub enum GameEvent {
    Connect {
        display_name: String,
        // Frames for this client; handed to the fan-out before its initial sync.
        sink: ClientSink,
        reply: oneshot::Sender<u64>,
    },
    Disconnect {
        player_id: u64,
    },
    Command {
        player_id: u64,
        command: ClientCommand,
    },
}

/// Everything the world task hands to the fan-out, in delivery order.
#[derive(Debug)]
pub enum Outbound {
    Attach { player_id: u64, sink: ClientSink },
    Detach { player_id: u64 },
    Event(Envelope),
}
