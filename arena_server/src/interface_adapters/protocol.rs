// Wire protocol DTOs and conversions for arena client messages.
// Every frame, both directions, is a JSON object `{ "name": ..., "args": ... }`.

use crate::domain::state::{BulletSnapshot, ChunkSnapshot, PlayerSnapshot, TurretSnapshot};
use crate::domain::vector::Vec2;
use crate::domain::{PlayerIntent, WorldEvent};
use crate::use_cases::ClientCommand;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "name", content = "args", rename_all = "camelCase")]
pub enum ServerMessage {
    Spawn(PlayerDto),
    // Which player id this connection controls.
    You(u64),
    Move(PlayerDto),
    SpawnBullet(BulletDto),
    BulletMove(BulletDto),
    SpawnChunk(ChunkDto),
    ChunkMove(ChunkDto),
    SpawnTurret(TurretDto),
    TurretMove(TurretDto),
    Delete(u64),
    DeleteBullet(u64),
    DeleteChunk(u64),
    DeleteTurret(u64),
    MapSize(PointDto),
}

impl From<&WorldEvent> for ServerMessage {
    fn from(event: &WorldEvent) -> Self {
        match event {
            WorldEvent::PlayerSpawned(p) => ServerMessage::Spawn(p.into()),
            WorldEvent::Identity(id) => ServerMessage::You(*id),
            WorldEvent::PlayerMoved(p) => ServerMessage::Move(p.into()),
            WorldEvent::PlayerDeleted(id) => ServerMessage::Delete(*id),
            WorldEvent::BulletSpawned(b) => ServerMessage::SpawnBullet(b.into()),
            WorldEvent::BulletMoved(b) => ServerMessage::BulletMove(b.into()),
            WorldEvent::BulletDeleted(id) => ServerMessage::DeleteBullet(*id),
            WorldEvent::ChunkSpawned(c) => ServerMessage::SpawnChunk(c.into()),
            WorldEvent::ChunkMoved(c) => ServerMessage::ChunkMove(c.into()),
            WorldEvent::ChunkDeleted(id) => ServerMessage::DeleteChunk(*id),
            WorldEvent::TurretSpawned(t) => ServerMessage::SpawnTurret(t.into()),
            WorldEvent::TurretMoved(t) => ServerMessage::TurretMove(t.into()),
            WorldEvent::TurretDeleted(id) => ServerMessage::DeleteTurret(*id),
            WorldEvent::MapResized(size) => ServerMessage::MapSize((*size).into()),
        }
    }
}

/// Plain two-field coordinate record used for positions, velocities and aim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDto {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for PointDto {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<PointDto> for Vec2 {
    fn from(p: PointDto) -> Self {
        Vec2::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: u64,
    pub name: String,
    pub pos: PointDto,
    pub vel: PointDto,
    pub aim: PointDto,
    pub radius: f32,
    pub level: u32,
    pub kills: u32,
    // Facing angle in radians; null when the player has no shield.
    pub shield: Option<f32>,
}

impl From<&PlayerSnapshot> for PlayerDto {
    fn from(p: &PlayerSnapshot) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            pos: p.pos.into(),
            vel: p.vel.into(),
            aim: p.aim.into(),
            radius: p.radius,
            level: p.level,
            kills: p.kills,
            shield: p.shield,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletDto {
    pub id: u64,
    pub owner_id: u64,
    pub pos: PointDto,
    pub vel: PointDto,
    pub radius: f32,
}

impl From<&BulletSnapshot> for BulletDto {
    fn from(b: &BulletSnapshot) -> Self {
        Self {
            id: b.id,
            owner_id: b.owner_id,
            pos: b.pos.into(),
            vel: b.vel.into(),
            radius: b.radius,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChunkDto {
    pub id: u64,
    pub pos: PointDto,
    pub vel: PointDto,
    pub radius: f32,
}

impl From<&ChunkSnapshot> for ChunkDto {
    fn from(c: &ChunkSnapshot) -> Self {
        Self {
            id: c.id,
            pos: c.pos.into(),
            vel: c.vel.into(),
            radius: c.radius,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurretDto {
    pub id: u64,
    pub owner_id: u64,
    pub pos: PointDto,
    pub vel: PointDto,
    pub aim: PointDto,
    pub radius: f32,
}

impl From<&TurretSnapshot> for TurretDto {
    fn from(t: &TurretSnapshot) -> Self {
        Self {
            id: t.id,
            owner_id: t.owner_id,
            pos: t.pos.into(),
            vel: t.vel.into(),
            aim: t.aim.into(),
            radius: t.radius,
        }
    }
}

/// Raw inbound frame; `args` is decoded by the handler registered for `name`.
#[derive(Debug, Deserialize)]
struct ClientEnvelope {
    name: String,
    #[serde(default)]
    args: Value,
}

/// `controls` payload. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ControlsDto {
    aim: Option<PointDto>,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    fire: bool,
}

#[derive(Debug)]
pub enum ProtocolError {
    InvalidJson(serde_json::Error),
    InvalidArgs {
        name: &'static str,
        reason: String,
    },
    Unrecognized(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidJson(e) => write!(f, "invalid json: {e}"),
            ProtocolError::InvalidArgs { name, reason } => {
                write!(f, "invalid args for {name}: {reason}")
            }
            ProtocolError::Unrecognized(name) => write!(f, "unrecognized message: {name}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

type Handler = fn(Value) -> Result<ClientCommand, ProtocolError>;

const HANDLERS: &[(&str, Handler)] = &[
    ("controls", decode_controls),
    ("spawn", decode_spawn),
    ("upgrayde", decode_upgrayde),
];

/// Decodes one inbound text frame into a command for the world.
pub fn decode_client_message(text: &str) -> Result<ClientCommand, ProtocolError> {
    let envelope: ClientEnvelope =
        serde_json::from_str(text).map_err(ProtocolError::InvalidJson)?;
    let handler = HANDLERS
        .iter()
        .find(|(name, _)| *name == envelope.name)
        .map(|(_, handler)| *handler)
        .ok_or(ProtocolError::Unrecognized(envelope.name))?;
    handler(envelope.args)
}

fn decode_spawn(_args: Value) -> Result<ClientCommand, ProtocolError> {
    Ok(ClientCommand::Spawn)
}

fn decode_upgrayde(_args: Value) -> Result<ClientCommand, ProtocolError> {
    Ok(ClientCommand::Upgrayde)
}

fn decode_controls(args: Value) -> Result<ClientCommand, ProtocolError> {
    let invalid = |reason: String| ProtocolError::InvalidArgs {
        name: "controls",
        reason,
    };
    let dto: ControlsDto = if args.is_null() {
        ControlsDto::default()
    } else {
        serde_json::from_value(args).map_err(|e| invalid(e.to_string()))?
    };

    // A missing aim becomes zero, which the world reads as "keep the previous aim".
    let aim = dto.aim.map(Vec2::from).unwrap_or(Vec2::ZERO);
    if !aim.is_finite() {
        return Err(invalid("aim is not finite".to_string()));
    }

    Ok(ClientCommand::Controls(PlayerIntent {
        aim,
        left: dto.left,
        right: dto.right,
        up: dto.up,
        down: dto.down,
        fire: dto.fire,
    }))
}
