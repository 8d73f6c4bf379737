// Framework bootstrap for the arena server runtime.

use crate::domain::Tuning;
use crate::frameworks::config;
use crate::interface_adapters::net::{fanout_task, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{GameEvent, Outbound, WorldSettings, world_task};

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, mpsc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let shutdown = Arc::new(Notify::new());
    let state = build_state(shutdown.clone());
    // Start the Web Server
    let app = Router::new().route("/ws", get(ws_handler)).with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    });
    shutdown.notify_one();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::new(config::http_host(), config::http_port());

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state(shutdown: Arc<Notify>) -> Arc<AppState> {
    // input_tx/rx: every client command goes to the single world task.
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(config::INPUT_CHANNEL_CAPACITY);
    // outbound_tx/rx: ordered world output, fanned out to client sinks.
    let (outbound_tx, outbound_rx) = mpsc::channel::<Outbound>(config::OUTBOUND_CHANNEL_CAPACITY);

    let settings = WorldSettings {
        tuning: Tuning::default(),
        allow_upgrayde: config::allow_upgrayde(),
        physics_interval: config::PHYSICS_INTERVAL,
        broadcast_interval: config::BROADCAST_INTERVAL,
    };
    if settings.allow_upgrayde {
        tracing::warn!("upgrayde debug command enabled");
    }

    tokio::spawn(world_task(input_rx, outbound_tx, settings, shutdown));
    tokio::spawn(fanout_task(outbound_rx));

    Arc::new(AppState {
        input_tx,
        client_buffer: config::client_buffer(),
    })
}
