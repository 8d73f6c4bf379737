// Shared server bootstrap and WebSocket helpers for integration tests.
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

// WebSocket URL published once the server has bound its port.
static SERVER_URL: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Ensure the test server is running and return the shared `ws://` URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_addr = Arc::new(OnceLock::<String>::new());
        let published_addr_thread = Arc::clone(&published_addr);
        // Own OS thread and runtime so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Ephemeral port to avoid collisions with a locally running server.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_addr_thread.set(addr.to_string());
                arena_server::run(listener).await.expect("server failed");
            });
        });
        wait_until_accepting(published_addr);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

fn wait_until_accepting(published_addr: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published_addr.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_URL.set(format!("ws://{addr}/ws"));

    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}

pub async fn connect(name: &str) -> Client {
    let url = format!("{}?name={name}", ensure_server());
    let (ws, _) = connect_async(url).await.expect("websocket handshake");
    ws
}

/// Next text frame as JSON, skipping control frames.
pub async fn next_json(ws: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Text(text) => return serde_json::from_str(text.as_str()).expect("json frame"),
            Message::Close(frame) => panic!("server closed the connection: {frame:?}"),
            _ => continue,
        }
    }
}

/// Reads frames until one matches, returning it.
pub async fn wait_for(ws: &mut Client, mut pred: impl FnMut(&Value) -> bool) -> Value {
    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        assert!(tokio::time::Instant::now() < deadline, "expected frame never arrived");
        let frame = next_json(ws).await;
        if pred(&frame) {
            return frame;
        }
    }
}

/// Reads the initial sync up to and including `you`; returns the player id and the frames before it.
pub async fn read_until_you(ws: &mut Client) -> (u64, Vec<Value>) {
    let mut before = Vec::new();
    loop {
        let frame = next_json(ws).await;
        if frame["name"] == "you" {
            let id = frame["args"].as_u64().expect("numeric player id");
            return (id, before);
        }
        before.push(frame);
    }
}

pub async fn send_text(ws: &mut Client, text: &str) {
    ws.send(Message::text(text.to_string())).await.expect("send frame");
}
