mod support;

use futures::SinkExt;
use support::{connect, next_json, read_until_you, send_text, wait_for};
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
async fn connect_sequence_is_spawns_then_you_then_snapshot_then_map_size() {
    let mut ws = connect("seq").await;

    let (id, before) = read_until_you(&mut ws).await;
    assert!(!before.is_empty());
    assert!(before.iter().all(|f| f["name"] == "spawn"));
    let own = before
        .iter()
        .find(|f| f["args"]["id"] == id)
        .expect("own spawn precedes you");
    assert_eq!(own["args"]["name"], "seq");
    assert_eq!(own["args"]["radius"], 30.0);

    // Entity snapshot, then the new map size, before anything else.
    loop {
        let frame = next_json(&mut ws).await;
        let name = frame["name"].as_str().expect("frame name");
        if name == "mapSize" {
            assert!(frame["args"]["x"].as_f64().unwrap() >= 1440.0);
            break;
        }
        assert!(
            matches!(name, "spawnBullet" | "spawnChunk" | "spawnTurret"),
            "unexpected {name} during initial sync"
        );
    }
}

#[tokio::test]
async fn malformed_messages_keep_the_connection_open() {
    let mut ws = connect("sloppy").await;
    let (id, _) = read_until_you(&mut ws).await;

    send_text(&mut ws, "{not json").await;
    send_text(&mut ws, r#"{"name":"controls","args":{"left":"very"}}"#).await;
    send_text(&mut ws, r#"{"name":"dance"}"#).await;
    ws.send(Message::binary(vec![1u8, 2, 3]))
        .await
        .expect("send binary");
    send_text(&mut ws, r#"{"name":"controls","args":{"aim":{"x":0,"y":1}}}"#).await;

    let moved = wait_for(&mut ws, |f| {
        f["name"] == "move" && f["args"]["id"] == id && f["args"]["aim"]["y"] == 1.0
    })
    .await;
    assert_eq!(moved["args"]["aim"]["x"], 0.0);
}

#[tokio::test]
async fn disconnect_broadcasts_delete_to_others() {
    let mut leaver = connect("leaver").await;
    let (leaver_id, _) = read_until_you(&mut leaver).await;

    let mut stayer = connect("stayer").await;
    let (_, before) = read_until_you(&mut stayer).await;
    assert!(before.iter().any(|f| f["args"]["id"] == leaver_id));

    leaver.close(None).await.expect("close");

    let deleted = wait_for(&mut stayer, |f| f["name"] == "delete" && f["args"] == leaver_id).await;
    assert_eq!(deleted["args"], leaver_id);
}

#[tokio::test]
async fn respawn_is_ignored_while_alive() {
    let mut ws = connect("alive").await;
    let (id, _) = read_until_you(&mut ws).await;

    send_text(&mut ws, r#"{"name":"spawn"}"#).await;
    send_text(&mut ws, r#"{"name":"upgrayde"}"#).await;

    // Still the same, unleveled player on the next few moves.
    for _ in 0..3 {
        let moved = wait_for(&mut ws, |f| f["name"] == "move" && f["args"]["id"] == id).await;
        assert_eq!(moved["args"]["level"], 0);
    }
}
