use super::scheduler::{Scheduler, Trigger};
use super::types::{ClientCommand, GameEvent, Outbound};
use crate::domain::{Tuning, World};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::SendError;
use tokio::sync::{Notify, mpsc};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct WorldSettings {
    pub tuning: Tuning,
    // Enables the `upgrayde` debug command.
    pub allow_upgrayde: bool,
    pub physics_interval: Duration,
    pub broadcast_interval: Duration,
}

/// Owns the world. Everything that touches simulation state happens on this task,
/// one event at a time.
pub async fn world_task(
    mut input_rx: mpsc::Receiver<GameEvent>,
    outbound_tx: mpsc::Sender<Outbound>,
    settings: WorldSettings,
    shutdown: Arc<Notify>,
) {
    let mut world = World::new(settings.tuning, settings.allow_upgrayde);
    let mut scheduler = Scheduler::new(
        settings.physics_interval,
        settings.broadcast_interval,
        settings.tuning.timestep,
    );

    let shutdown_signal = shutdown.notified();
    tokio::pin!(shutdown_signal);

    info!(
        physics_ms = settings.physics_interval.as_millis() as u64,
        broadcast_ms = settings.broadcast_interval.as_millis() as u64,
        allow_upgrayde = settings.allow_upgrayde,
        "world task started"
    );

    loop {
        let result = tokio::select! {
            _ = &mut shutdown_signal => {
                info!("world task shutting down");
                break;
            }
            trigger = scheduler.next() => {
                match trigger {
                    Trigger::Physics(step) => world.step(step),
                    Trigger::Broadcast => world.broadcast_state(),
                }
                Ok(())
            }
            event = input_rx.recv() => {
                let Some(event) = event else {
                    info!("input channel closed; world task exiting");
                    break;
                };
                handle_event(&mut world, event, &outbound_tx).await
            }
        };

        // Everything the world queued goes out before the next event is looked at.
        if result.is_err() || flush(&mut world, &outbound_tx).await.is_err() {
            warn!("outbound channel closed; world task exiting");
            break;
        }
    }
}

async fn handle_event(
    world: &mut World,
    event: GameEvent,
    outbound_tx: &mpsc::Sender<Outbound>,
) -> Result<(), SendError<Outbound>> {
    match event {
        GameEvent::Connect {
            display_name,
            sink,
            reply,
        } => {
            let player_id = world.connect(display_name);
            // Attach before the initial sync so the client sees its whole snapshot.
            outbound_tx
                .send(Outbound::Attach { player_id, sink })
                .await?;
            flush(world, outbound_tx).await?;
            if reply.send(player_id).is_err() {
                debug!(player_id, "connection gone before join completed");
                outbound_tx.send(Outbound::Detach { player_id }).await?;
                world.disconnect(player_id);
            }
        }
        GameEvent::Disconnect { player_id } => {
            outbound_tx.send(Outbound::Detach { player_id }).await?;
            world.disconnect(player_id);
        }
        GameEvent::Command { player_id, command } => {
            let applied = match command {
                ClientCommand::Controls(intent) => world.apply_intent(player_id, intent),
                ClientCommand::Spawn => world.respawn(player_id),
                ClientCommand::Upgrayde => world.upgrayde(player_id),
            };
            if !applied {
                debug!(player_id, ?command, "command ignored");
            }
        }
    }
    Ok(())
}

async fn flush(
    world: &mut World,
    outbound_tx: &mpsc::Sender<Outbound>,
) -> Result<(), SendError<Outbound>> {
    for envelope in world.drain_events() {
        outbound_tx.send(Outbound::Event(envelope)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Audience, WorldEvent};
    use tokio::sync::oneshot;

    fn settings() -> WorldSettings {
        WorldSettings {
            tuning: Tuning::default(),
            allow_upgrayde: false,
            physics_interval: Duration::from_millis(16),
            broadcast_interval: Duration::from_millis(32),
        }
    }

    struct Harness {
        input_tx: mpsc::Sender<GameEvent>,
        out_rx: mpsc::Receiver<Outbound>,
        shutdown: Arc<Notify>,
        task: tokio::task::JoinHandle<()>,
    }

    fn start() -> Harness {
        let (input_tx, input_rx) = mpsc::channel(16);
        let (out_tx, out_rx) = mpsc::channel(256);
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(world_task(input_rx, out_tx, settings(), shutdown.clone()));
        Harness {
            input_tx,
            out_rx,
            shutdown,
            task,
        }
    }

    // Skips periodic move broadcasts, which can interleave with anything.
    async fn next_non_move(rx: &mut mpsc::Receiver<Outbound>) -> Outbound {
        loop {
            let item = rx.recv().await.expect("outbound open");
            if let Outbound::Event(env) = &item {
                if matches!(env.event, WorldEvent::PlayerMoved(_)) {
                    continue;
                }
            }
            return item;
        }
    }

    #[tokio::test]
    async fn connect_attaches_sink_before_initial_sync() {
        let mut h = start();
        let (sink, _frames) = mpsc::channel(8);
        let (reply, reply_rx) = oneshot::channel();
        h.input_tx
            .send(GameEvent::Connect {
                display_name: "ada".into(),
                sink,
                reply,
            })
            .await
            .unwrap();
        let id = reply_rx.await.unwrap();

        match next_non_move(&mut h.out_rx).await {
            Outbound::Attach { player_id, .. } => assert_eq!(player_id, id),
            other => panic!("expected attach, got {other:?}"),
        }
        let mut events = Vec::new();
        for _ in 0..4 {
            match next_non_move(&mut h.out_rx).await {
                Outbound::Event(env) => events.push(env),
                other => panic!("expected event, got {other:?}"),
            }
        }
        assert!(matches!(events[0].event, WorldEvent::PlayerSpawned(ref p) if p.name == "ada"));
        assert_eq!(events[0].audience, Audience::Only(id));
        assert_eq!(events[1].audience, Audience::AllExcept(id));
        assert_eq!(events[2].event, WorldEvent::Identity(id));
        assert!(matches!(events[3].event, WorldEvent::MapResized(_)));

        h.shutdown.notify_one();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn abandoned_connect_is_rolled_back() {
        let mut h = start();
        let (sink, _frames) = mpsc::channel(8);
        let (reply, reply_rx) = oneshot::channel();
        drop(reply_rx);
        h.input_tx
            .send(GameEvent::Connect {
                display_name: "gone".into(),
                sink,
                reply,
            })
            .await
            .unwrap();

        let mut detached = None;
        let mut deleted = None;
        while deleted.is_none() {
            match next_non_move(&mut h.out_rx).await {
                Outbound::Detach { player_id } => detached = Some(player_id),
                Outbound::Event(env) => {
                    if let WorldEvent::PlayerDeleted(id) = env.event {
                        deleted = Some(id);
                    }
                }
                Outbound::Attach { .. } => {}
            }
        }
        assert_eq!(detached, deleted);

        h.shutdown.notify_one();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn world_task_exits_when_inputs_close() {
        let h = start();
        drop(h.input_tx);
        h.task.await.unwrap();
    }
}
