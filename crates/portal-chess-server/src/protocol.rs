use serde::{Deserialize, Serialize};
use serde_json::Value;

use portal_chess_core::{Color, Position, ResolvedMove};

/// Client → server events. Unknown fields are ignored; missing fields are
/// reported through acknowledgement error codes rather than parse failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        #[serde(default)]
        time_minutes: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        #[serde(default)]
        room_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    MakeMove {
        #[serde(default)]
        room_id: Option<String>,
        #[serde(default)]
        resolved: Option<Value>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    MissingRoomId,
    NotFound,
    RoomLocked,
    InvalidPayload,
    NotReady,
    GameOver,
    IllegalMove,
    ServerError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Clocks {
    pub w: u64,
    pub b: u64,
}

impl Clocks {
    pub fn from_ms(clocks: [u64; 2]) -> Self {
        Self {
            w: clocks[Color::White as usize],
            b: clocks[Color::Black as usize],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndResult {
    Checkmate,
    Stalemate,
    Timeout,
}

/// Full color word used in `gameEnd` payloads.
pub fn color_word(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

/// Server → client events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Ack {
        #[serde(skip_serializing_if = "Option::is_none")]
        room_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        ok: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<ErrorCode>,
    },
    #[serde(rename_all = "camelCase")]
    GameStart {
        room_id: String,
        color: Color,
        state: Position,
        clocks: Clocks,
    },
    #[serde(rename_all = "camelCase")]
    PlayerJoined { socket_id: String },
    #[serde(rename_all = "camelCase")]
    MoveMade {
        resolved: ResolvedMove,
        state: Position,
        clocks: Clocks,
    },
    #[serde(rename_all = "camelCase")]
    Clock {
        clocks: Clocks,
        turn: Color,
        ts: u64,
    },
    #[serde(rename_all = "camelCase")]
    GameEnd {
        result: EndResult,
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<&'static str>,
    },
    #[serde(rename_all = "camelCase")]
    PlayerLeft { socket_id: String },
}

impl ServerMessage {
    pub fn ack_room(room_id: String) -> Self {
        Self::Ack {
            room_id: Some(room_id),
            ok: None,
            error: None,
        }
    }

    pub fn ack_ok() -> Self {
        Self::Ack {
            room_id: None,
            ok: Some(true),
            error: None,
        }
    }

    pub fn ack_error(error: ErrorCode) -> Self {
        Self::Ack {
            room_id: None,
            ok: None,
            error: Some(error),
        }
    }
}
