use crate::interface_adapters::protocol::decode_client_message;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{ClientCommand, GameEvent};

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, Span, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    Ws(axum::Error),
    InputClosed,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Ws(e) => write!(f, "websocket error: {e}"),
            NetError::InputClosed => write!(f, "world input channel closed"),
        }
    }
}

impl std::error::Error for NetError {}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct ConnectQuery {
    // Display name shown to other players.
    #[serde(default)]
    name: Option<String>,
}

const MAX_NAME_CHARS: usize = 24;
const DEFAULT_NAME: &str = "player";
const LOG_THROTTLE: Duration = Duration::from_secs(2);

pub fn sanitize_name(raw: Option<&str>) -> String {
    let name: String = raw
        .unwrap_or_default()
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_NAME_CHARS)
        .collect();
    if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    let display_name = sanitize_name(query.name.as_deref());
    let input_tx = state.input_tx.clone();
    let client_buffer = state.client_buffer;
    ws.on_upgrade(move |socket| {
        let span = info_span!("conn", player_id = tracing::field::Empty);
        handle_socket(socket, input_tx, display_name, client_buffer).instrument(span)
    })
}

async fn handle_socket(
    mut socket: WebSocket,
    input_tx: mpsc::Sender<GameEvent>,
    display_name: String,
    client_buffer: usize,
) {
    // The sink is registered with the world on connect, so the initial snapshot
    // queues up in `frames` before the loop below starts draining it.
    let (sink, mut frames) = mpsc::channel::<Utf8Bytes>(client_buffer.max(1));
    let (reply, reply_rx) = oneshot::channel();
    let connect = GameEvent::Connect {
        display_name: display_name.clone(),
        sink,
        reply,
    };

    let joined = match input_tx.send(connect).await {
        Ok(()) => reply_rx.await.ok(),
        Err(_) => None,
    };
    let Some(player_id) = joined else {
        warn!("world unavailable; refusing connection");
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: close_code::ERROR,
                reason: "world unavailable".into(),
            })))
            .await;
        return;
    };

    Span::current().record("player_id", player_id);
    info!(player_id, display_name = %display_name, "client connected");

    let now = Instant::now() - LOG_THROTTLE;
    let mut ctx = ConnCtx {
        player_id,
        input_tx,
        msgs_in: 0,
        msgs_out: 0,
        bytes_in: 0,
        bytes_out: 0,
        invalid_messages: 0,
        last_input_full_log: now,
        last_invalid_log: now,
        close_frame: None,
    };

    // Main Client Loop
    if let Err(e) = run_client_loop(&mut socket, &mut frames, &mut ctx).await {
        warn!(error = %e, "client loop exited with error");
    }

    if ctx
        .input_tx
        .send(GameEvent::Disconnect { player_id })
        .await
        .is_err()
    {
        debug!(player_id, "world gone before disconnect");
    }
    debug!(
        player_id,
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_messages = ctx.invalid_messages,
        "client disconnected"
    );
}

struct ConnCtx {
    player_id: u64,
    input_tx: mpsc::Sender<GameEvent>,

    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,

    invalid_messages: u32,

    last_input_full_log: Instant,
    last_invalid_log: Instant,

    close_frame: Option<CloseFrame>,
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(
    socket: &mut WebSocket,
    frames: &mut mpsc::Receiver<Utf8Bytes>,
    ctx: &mut ConnCtx,
) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let control = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => match handle_incoming_ws(incoming, ctx) {
                Ok(control) => control,
                Err(e) => {
                    fatal = Some(e);
                    LoopControl::Disconnect
                }
            },

            // Outgoing frame from the fan-out
            frame = frames.recv() => match frame {
                Some(bytes) => forward_frame(socket, bytes, ctx).await,
                None => {
                    warn!(player_id = ctx.player_id, "outbound stream detached; closing");
                    ctx.close_frame = Some(CloseFrame {
                        code: close_code::POLICY,
                        reason: "client too slow".into(),
                    });
                    LoopControl::Disconnect
                }
            },
        };

        if let LoopControl::Disconnect = control {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = %err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn forward_frame(socket: &mut WebSocket, bytes: Utf8Bytes, ctx: &mut ConnCtx) -> LoopControl {
    let len = bytes.len() as u64;
    match socket.send(Message::Text(bytes)).await {
        Ok(()) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += len;
            LoopControl::Continue
        }
        Err(e) => {
            debug!(player_id = ctx.player_id, error = %e, "send failed; disconnecting");
            LoopControl::Disconnect
        }
    }
}

fn handle_incoming_ws(
    incoming: Option<Result<Message, axum::Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    let Some(msg) = incoming else {
        debug!(player_id, "socket stream ended");
        return Ok(LoopControl::Disconnect);
    };

    match msg? {
        Message::Text(text) => {
            ctx.msgs_in += 1;
            ctx.bytes_in += text.len() as u64;
            match decode_client_message(&text) {
                Ok(command) => forward_command(ctx, command),
                Err(e) => {
                    // Unknown or malformed input is dropped; the connection stays open.
                    ctx.invalid_messages += 1;
                    if should_log(&mut ctx.last_invalid_log) {
                        warn!(
                            player_id,
                            error = %e,
                            total = ctx.invalid_messages,
                            "dropping malformed message"
                        );
                    }
                    Ok(LoopControl::Continue)
                }
            }
        }
        Message::Binary(data) => {
            ctx.msgs_in += 1;
            ctx.bytes_in += data.len() as u64;
            ctx.invalid_messages += 1;
            if should_log(&mut ctx.last_invalid_log) {
                warn!(player_id, bytes = data.len(), "binary frames not supported; dropping");
            }
            Ok(LoopControl::Continue)
        }
        Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
        Message::Close(frame) => {
            debug!(player_id, ?frame, "client sent close");
            Ok(LoopControl::Disconnect)
        }
    }
}

fn forward_command(ctx: &mut ConnCtx, command: ClientCommand) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    match ctx
        .input_tx
        .try_send(GameEvent::Command { player_id, command })
    {
        Ok(()) => Ok(LoopControl::Continue),
        Err(TrySendError::Full(_)) => {
            if should_log(&mut ctx.last_input_full_log) {
                warn!(player_id, "input channel full; dropping command");
            }
            Ok(LoopControl::Continue)
        }
        Err(TrySendError::Closed(_)) => Err(NetError::InputClosed),
    }
}
