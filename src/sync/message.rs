use crate::board::*;
use crate::engine::*;
use serde::Deserialize;
use serde::Serialize;

/// Errors raised while decoding a wire message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    Malformed(String),
    Unexpected(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed message: {}", s),
            Self::Unexpected(s) => write!(f, "unexpected message: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// A roster entry as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub is_ready: bool,
    pub connected: bool,
}

/// Room summary carried by `rejoined`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub code: String,
    pub players: Vec<PlayerInfo>,
    pub game_started: bool,
    pub host_id: Option<PlayerId>,
}

/// Messages sent from a participant to the room coordinator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Join {
        player_id: PlayerId,
        player_name: String,
    },
    Ping,
    StartGame,
    GameAction {
        action: Action,
        player_id: PlayerId,
    },
    SyncState {
        state: GameState,
    },
}

/// Messages sent from the room coordinator to participants.
///
/// `game_started` carries the shuffle seed so every replica builds the same
/// opening state; `state_sync` names the host that produced the snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    RoomState {
        players: Vec<PlayerInfo>,
        game_started: bool,
        host_id: Option<PlayerId>,
    },
    PlayerJoined {
        players: Vec<PlayerInfo>,
        game_started: bool,
        host_id: Option<PlayerId>,
    },
    PlayerLeft {
        player_id: PlayerId,
        players: Vec<PlayerInfo>,
        host_id: Option<PlayerId>,
        game_started: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_disconnected: Option<bool>,
    },
    Rejoined {
        room: RoomView,
        game_state: Option<GameState>,
    },
    GameStarted {
        players: Vec<PlayerInfo>,
        seed: u64,
    },
    GameAction {
        action: Action,
        player_id: PlayerId,
    },
    StateSync {
        state: GameState,
        players: Vec<PlayerInfo>,
        host_id: PlayerId,
    },
    Pong,
    Error {
        message: String,
    },
}

impl ClientMessage {
    pub fn join(id: &PlayerId, name: &str) -> Self {
        Self::Join {
            player_id: id.clone(),
            player_name: name.to_string(),
        }
    }
    pub fn game_action(id: &PlayerId, action: Action) -> Self {
        Self::GameAction {
            action,
            player_id: id.clone(),
        }
    }
    pub fn decode(s: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(s).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize client message")
    }
}

impl ServerMessage {
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }
    pub fn decode(s: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(s).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}
