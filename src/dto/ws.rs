use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Messages accepted from player WebSocket clients.
///
/// The channel is primarily server-push; clients only send a heartbeat and
/// optional acknowledgements. Anything else deserializes to `Unknown` and is
/// logged, never acted upon.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat; answered with [`ServerMessage::Pong`].
    Ping,
    /// Acknowledgement of a received notification.
    Ack,
    /// Any unrecognized message type.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parse a client frame from its JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Messages pushed to player WebSocket clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms registration under the connecting player's name.
    Connected {
        /// Name the connection is registered under.
        username: String,
    },
    /// Heartbeat reply.
    Pong,
    /// It is now this player's turn in the given lobby.
    YourTurn {
        /// Lobby awaiting the player's contribution.
        lobby_id: Uuid,
    },
    /// The lobby finished and generated songs are available.
    SongsReady {
        /// Lobby whose results can be fetched.
        lobby_id: Uuid,
    },
}

impl ServerMessage {
    /// Serialize into a WebSocket text frame.
    pub fn to_ws_message(&self) -> Result<Message, serde_json::Error> {
        Ok(Message::Text(serde_json::to_string(self)?.into()))
    }
}
