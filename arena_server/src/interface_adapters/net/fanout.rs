use crate::domain::{Envelope, WorldEvent};
use crate::interface_adapters::protocol::ServerMessage;
use crate::use_cases::{ClientSink, Outbound};

use axum::extract::ws::Utf8Bytes;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};

/// Serializes one event into a shareable text frame.
pub fn encode(event: &WorldEvent) -> Result<Utf8Bytes, serde_json::Error> {
    let msg = ServerMessage::from(event);
    serde_json::to_string(&msg).map(Utf8Bytes::from)
}

/// Player id to connection sink table, owned by the fan-out task.
#[derive(Default)]
pub struct Fanout {
    sinks: HashMap<u64, ClientSink>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached(&self) -> usize {
        self.sinks.len()
    }

    pub fn handle(&mut self, item: Outbound) {
        match item {
            Outbound::Attach { player_id, sink } => {
                debug!(player_id, "client attached to fan-out");
                self.sinks.insert(player_id, sink);
            }
            Outbound::Detach { player_id } => {
                if self.sinks.remove(&player_id).is_some() {
                    debug!(player_id, "client detached from fan-out");
                }
            }
            Outbound::Event(envelope) => self.deliver(envelope),
        }
    }

    fn deliver(&mut self, envelope: Envelope) {
        // Serialize once; every recipient gets a clone of the same bytes.
        let bytes = match encode(&envelope.event) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = ?e, "failed to serialize world event");
                return;
            }
        };

        let mut detached = Vec::new();
        for (&player_id, sink) in &self.sinks {
            if !envelope.audience.includes(player_id) {
                continue;
            }
            match sink.try_send(bytes.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(player_id, "client sink full; detaching slow client");
                    detached.push(player_id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(player_id, "client sink closed");
                    detached.push(player_id);
                }
            }
        }

        // Dropping the sender ends the connection's frame stream, which closes the socket
        // and sends the player's disconnect back to the world.
        for player_id in detached {
            self.sinks.remove(&player_id);
        }
    }
}

pub async fn fanout_task(mut outbound_rx: mpsc::Receiver<Outbound>) {
    let mut fanout = Fanout::new();
    while let Some(item) = outbound_rx.recv().await {
        fanout.handle(item);
    }
    info!(attached = fanout.attached(), "outbound channel closed; fan-out exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attach(fanout: &mut Fanout, player_id: u64, capacity: usize) -> mpsc::Receiver<Utf8Bytes> {
        let (sink, rx) = mpsc::channel(capacity);
        fanout.handle(Outbound::Attach { player_id, sink });
        rx
    }

    #[test]
    fn audiences_route_frames() {
        let mut fanout = Fanout::new();
        let mut a = attach(&mut fanout, 1, 8);
        let mut b = attach(&mut fanout, 2, 8);

        fanout.handle(Outbound::Event(Envelope::only(1, WorldEvent::Identity(1))));
        fanout.handle(Outbound::Event(Envelope::all_except(1, WorldEvent::PlayerDeleted(9))));
        fanout.handle(Outbound::Event(Envelope::all(WorldEvent::ChunkDeleted(4))));

        assert_eq!(a.try_recv().unwrap().as_str(), r#"{"name":"you","args":1}"#);
        assert_eq!(a.try_recv().unwrap().as_str(), r#"{"name":"deleteChunk","args":4}"#);
        assert!(a.try_recv().is_err());

        assert_eq!(b.try_recv().unwrap().as_str(), r#"{"name":"delete","args":9}"#);
        assert_eq!(b.try_recv().unwrap().as_str(), r#"{"name":"deleteChunk","args":4}"#);
        assert!(b.try_recv().is_err());
    }

    #[test]
    fn full_sink_is_detached_and_others_keep_receiving() {
        let mut fanout = Fanout::new();
        let mut slow = attach(&mut fanout, 1, 1);
        let mut fast = attach(&mut fanout, 2, 8);

        fanout.handle(Outbound::Event(Envelope::all(WorldEvent::BulletDeleted(1))));
        fanout.handle(Outbound::Event(Envelope::all(WorldEvent::BulletDeleted(2))));
        assert_eq!(fanout.attached(), 1);

        // The slow client gets what fit, then its stream ends.
        assert!(slow.try_recv().is_ok());
        assert!(matches!(
            slow.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
        assert!(fast.try_recv().is_ok());
        assert!(fast.try_recv().is_ok());
    }

    #[test]
    fn detach_stops_delivery() {
        let mut fanout = Fanout::new();
        let mut rx = attach(&mut fanout, 1, 8);
        fanout.handle(Outbound::Detach { player_id: 1 });
        fanout.handle(Outbound::Event(Envelope::all(WorldEvent::PlayerDeleted(1))));
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
        assert_eq!(fanout.attached(), 0);
    }
}
