//! # Wire Protocol
//!
//! Every message exchanged between server and clients.
//!
//! Messages are adjacently tagged: `{"event": <name>, "payload": <payload>}`.
//! Event names and camelCase payload fields are a contract with deployed
//! clients and must not be renamed.
//!
//! ```text
//! Server → Client                    Client → Server
//! ─────────────────────────────      ───────────────
//! WAITING_FOR_PLAYERS(count)         playerInput
//! INITIALIZE_GAME / START_GAME
//! END_GAME / FULL_SERVER
//! AFTER_GAME_REPORT(report[])
//! assignPlayerId(id)
//! spawnEntity / despawnEntity
//! syncTransform / syncHealth
//! syncInventory / syncTimer
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math::Vector2;

/// Milliseconds since the Unix epoch (server or client wall clock).
pub type Millis = u64;

/// Opaque identifier of a transport connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SocketId(pub u64);

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "socket#{}", self.0)
    }
}

/// Gameplay kind of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    /// A connected player's ship.
    #[default]
    Player,
    /// Destructible rock that fragments into materials.
    Asteroid,
    /// Collectible dropped by asteroids and hit players.
    Material,
    /// Laser shot.
    Projectile,
    /// Entity carrying the session countdown.
    GameTimer,
    /// Static scoring zone.
    Goal,
}

/// Collision geometry tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColliderShape {
    /// `size.x` is the radius.
    #[default]
    Circle,
    /// `size` holds the half extents around the centre.
    Rectangle,
}

/// Default collider size when a spawn omits it.
pub const DEFAULT_SIZE: Vector2 = Vector2::new(30.0, 30.0);

/// Partial construction record sent with every spawn.
///
/// Every field is optional; [`InitialData`] accessors resolve the defaults
/// (static, drag enabled, 30x30 circle, priority 0).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialData {
    /// World position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vector2>,
    /// Heading in radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    /// Units per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Vector2>,
    /// Units per second squared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<Vector2>,
    /// Whether velocity decays over time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_drag: Option<bool>,
    /// Magnitude cap applied to input-driven acceleration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_acceleration: Option<f32>,
    /// Collider radius (`x`) or half extents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Vector2>,
    /// Collider geometry, `type` on the wire.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub shape: Option<ColliderShape>,
    /// Immovable during collision resolution, `static` on the wire.
    #[serde(rename = "static", skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    /// Higher priority pushes lower priority out of overlaps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f32>,
    /// Trigger geometry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_shape: Option<ColliderShape>,
    /// Trigger radius (`x`) or half extents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_size: Option<Vector2>,
    /// Current health.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<f32>,
    /// Health ceiling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_health: Option<f32>,
    /// Materials held.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_count: Option<u32>,
    /// When the entity appeared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawn_time: Option<Millis>,
    /// Milliseconds after `spawn_time` before despawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<Millis>,
    /// Laser cooldown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fire_rate: Option<Millis>,
    /// When the laser last fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fire_time: Option<Millis>,
    /// Countdown start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_start: Option<Millis>,
    /// Countdown length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_duration: Option<Millis>,
    /// Movement intent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_input: Option<Vector2>,
    /// Aim direction in radians, `lookRot` on the wire.
    #[serde(rename = "lookRot", skip_serializing_if = "Option::is_none")]
    pub look_rotation: Option<f32>,
    /// Set only on the copy a client spawns for its own ship.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_local_player: Option<bool>,
}

impl InitialData {
    /// Static flag, default `true`.
    #[must_use]
    pub fn static_or_default(&self) -> bool {
        self.is_static.unwrap_or(true)
    }

    /// Drag flag, default `true`.
    #[must_use]
    pub fn drag_or_default(&self) -> bool {
        self.has_drag.unwrap_or(true)
    }

    /// Collider size, default 30x30.
    #[must_use]
    pub fn size_or_default(&self) -> Vector2 {
        self.size.unwrap_or(DEFAULT_SIZE)
    }

    /// Collider shape, default circle.
    #[must_use]
    pub fn shape_or_default(&self) -> ColliderShape {
        self.shape.unwrap_or_default()
    }

    /// Resolution priority, default 0.
    #[must_use]
    pub fn priority_or_default(&self) -> f32 {
        self.priority.unwrap_or(0.0)
    }
}

/// Type-specific spawn extras.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OtherData {
    /// Jagged outline of an asteroid, relative to its centre.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Vector2>,
}

/// `spawnEntity` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnEntityPacket {
    /// Server-assigned id the client must reuse.
    pub entity_id: u32,
    /// Entity kind.
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Server time of the spawn.
    pub time: Millis,
    /// Construction record.
    pub initial: InitialData,
    /// Kind-specific extras.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_data: Option<OtherData>,
}

/// `despawnEntity` payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPacket {
    /// Entity removed.
    pub entity_id: u32,
    /// Server time of the removal.
    pub time: Millis,
}

/// `syncTransform` payload.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTransformPacket {
    /// Entity sampled.
    pub entity_id: u32,
    /// Authoritative position.
    pub position: Vector2,
    /// Authoritative heading.
    pub rotation: f32,
    /// Server time of the sample.
    pub time: Millis,
}

/// `syncHealth` payload.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncHealthPacket {
    /// Entity sampled.
    pub entity_id: u32,
    /// Current health.
    pub health: f32,
    /// Server time of the sample.
    pub time: Millis,
}

/// `syncInventory` payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncInventoryPacket {
    /// Entity sampled.
    pub entity_id: u32,
    /// Materials held.
    pub material_count: u32,
    /// Server time of the sample.
    pub time: Millis,
}

/// `syncTimer` payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTimerPacket {
    /// Timer entity.
    pub entity_id: u32,
    /// Countdown start.
    pub timer_start: Millis,
    /// Countdown length.
    pub timer_duration: Millis,
    /// Server time of the sample.
    pub time: Millis,
}

/// `playerInput` payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInputPacket {
    /// Ship the client believes it controls. The server routes by socket.
    pub entity_id: u32,
    /// Movement intent, each axis in `[-1, 1]`.
    pub move_input: Vector2,
    /// Aim direction in radians.
    pub look_rot: f32,
    /// Fire button held.
    pub is_fire: bool,
    /// Client time of the sample.
    pub time: Millis,
}

/// One line of the after-game report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    /// Player ship.
    pub entity_id: u32,
    /// Materials held when the game ended.
    pub score: u32,
}

/// Server → client events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ServerMessage {
    /// Players still missing before the game can start.
    #[serde(rename = "WAITING_FOR_PLAYERS")]
    WaitingForPlayers(u32),
    /// The room is full; the world is about to be built.
    #[serde(rename = "INITIALIZE_GAME")]
    InitializeGame,
    /// Every initial entity has been announced.
    #[serde(rename = "START_GAME")]
    StartGame,
    /// The match is over.
    #[serde(rename = "END_GAME")]
    EndGame,
    /// Sent to a rejected connection before it is closed.
    #[serde(rename = "FULL_SERVER")]
    FullServer,
    /// Final score of every player, sent just before `END_GAME`.
    #[serde(rename = "AFTER_GAME_REPORT")]
    AfterGameReport(Vec<ReportEntry>),
    /// Tells a socket which entity it controls.
    #[serde(rename = "assignPlayerId")]
    AssignPlayerId(u32),
    /// A new entity.
    #[serde(rename = "spawnEntity")]
    SpawnEntity(SpawnEntityPacket),
    /// An entity is gone.
    #[serde(rename = "despawnEntity")]
    DespawnEntity(EntityPacket),
    /// Position and heading sample.
    #[serde(rename = "syncTransform")]
    SyncTransform(SyncTransformPacket),
    /// Health sample.
    #[serde(rename = "syncHealth")]
    SyncHealth(SyncHealthPacket),
    /// Inventory sample.
    #[serde(rename = "syncInventory")]
    SyncInventory(SyncInventoryPacket),
    /// Countdown sample.
    #[serde(rename = "syncTimer")]
    SyncTimer(SyncTimerPacket),
}

impl ServerMessage {
    /// Wire name of the event.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::WaitingForPlayers(_) => "WAITING_FOR_PLAYERS",
            Self::InitializeGame => "INITIALIZE_GAME",
            Self::StartGame => "START_GAME",
            Self::EndGame => "END_GAME",
            Self::FullServer => "FULL_SERVER",
            Self::AfterGameReport(_) => "AFTER_GAME_REPORT",
            Self::AssignPlayerId(_) => "assignPlayerId",
            Self::SpawnEntity(_) => "spawnEntity",
            Self::DespawnEntity(_) => "despawnEntity",
            Self::SyncTransform(_) => "syncTransform",
            Self::SyncHealth(_) => "syncHealth",
            Self::SyncInventory(_) => "syncInventory",
            Self::SyncTimer(_) => "syncTimer",
        }
    }
}

/// Client → server events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ClientMessage {
    /// Latest input sample of the local ship.
    #[serde(rename = "playerInput")]
    PlayerInput(PlayerInputPacket),
}

/// Who an outbound server message is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recipient {
    /// Every connected socket.
    All,
    /// A single socket.
    Socket(SocketId),
}

/// Instruction from the session to the transport.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerCommand {
    /// Deliver a message.
    Send {
        /// Target of the message.
        recipient: Recipient,
        /// Message body.
        message: ServerMessage,
    },
    /// Close a connection.
    Disconnect(SocketId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_transform_wire_format() {
        let msg = ServerMessage::SyncTransform(SyncTransformPacket {
            entity_id: 3,
            position: Vector2::new(1.0, 2.0),
            rotation: 0.5,
            time: 1000,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["event"], "syncTransform");
        assert_eq!(json["payload"]["entityId"], 3);
        assert_eq!(json["payload"]["position"]["x"], 1.0);
        assert_eq!(json["payload"]["time"], 1000);
    }

    #[test]
    fn test_unit_events_have_no_payload() {
        let json = serde_json::to_string(&ServerMessage::StartGame).unwrap();
        assert_eq!(json, r#"{"event":"START_GAME"}"#);

        let back: ServerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ServerMessage::StartGame);
    }

    #[test]
    fn test_initial_data_defaults() {
        let initial: InitialData = serde_json::from_str("{}").unwrap();
        assert!(initial.static_or_default());
        assert!(initial.drag_or_default());
        assert_eq!(initial.size_or_default(), DEFAULT_SIZE);
        assert_eq!(initial.shape_or_default(), ColliderShape::Circle);
        assert_eq!(initial.priority_or_default(), 0.0);
    }

    #[test]
    fn test_spawn_packet_field_names() {
        let msg = ServerMessage::SpawnEntity(SpawnEntityPacket {
            entity_id: 7,
            entity_type: EntityType::GameTimer,
            time: 5,
            initial: InitialData {
                timer_duration: Some(90_000),
                ..InitialData::default()
            },
            other_data: None,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["payload"]["type"], "gameTimer");
        assert_eq!(json["payload"]["initial"]["timerDuration"], 90_000);
        assert!(json["payload"]["initial"].get("position").is_none());
        assert!(json["payload"].get("otherData").is_none());
    }

    #[test]
    fn test_initial_data_wire_names() {
        let initial = InitialData {
            shape: Some(ColliderShape::Rectangle),
            is_static: Some(false),
            look_rotation: Some(1.5),
            has_drag: Some(true),
            ..InitialData::default()
        };
        let json = serde_json::to_value(&initial).unwrap();
        assert_eq!(json["type"], "rectangle");
        assert_eq!(json["static"], false);
        assert_eq!(json["lookRot"], 1.5);
        assert_eq!(json["hasDrag"], true);
        assert!(json.get("shape").is_none());
        assert!(json.get("isStatic").is_none());

        let back: InitialData =
            serde_json::from_str(r#"{"static":false,"type":"rectangle","lookRot":1.5}"#).unwrap();
        assert!(!back.static_or_default());
        assert_eq!(back.shape_or_default(), ColliderShape::Rectangle);
        assert_eq!(back.look_rotation, Some(1.5));
    }

    #[test]
    fn test_player_input_parses_from_client() {
        let line = r#"{"event":"playerInput","payload":{"entityId":1,"moveInput":{"x":1.0,"y":0.0},"lookRot":0.25,"isFire":true,"time":42}}"#;
        let ClientMessage::PlayerInput(input) = serde_json::from_str(line).unwrap();
        assert_eq!(input.entity_id, 1);
        assert!(input.is_fire);
        assert_eq!(input.move_input, Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_event_names_match_serde_tags() {
        let msgs = [
            ServerMessage::WaitingForPlayers(1),
            ServerMessage::EndGame,
            ServerMessage::AfterGameReport(vec![]),
            ServerMessage::AssignPlayerId(4),
        ];
        for msg in msgs {
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["event"], msg.event_name());
        }
    }
}
