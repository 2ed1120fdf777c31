//! Registry of live player WebSocket connections, keyed by player name.

use axum::extract::ws::Message;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

use crate::dto::ws::ServerMessage;

/// Handle used to push messages to a connected player.
#[derive(Clone)]
pub struct PlayerConnection {
    /// Player name the connection identified with.
    pub name: String,
    /// Writer channel drained by the connection's dedicated writer task.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Reasons a push notification did not reach a player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// No live connection is registered under this name.
    #[error("player `{0}` is not connected")]
    NotConnected(String),
    /// The writer channel is closed; the stale entry has been dropped.
    #[error("failed to push message to player `{0}`")]
    SendFailed(String),
}

/// Process-wide map from player name to their live push connection.
///
/// Registration is last-connect-wins: a reconnect under the same name
/// silently replaces the previous entry, and the superseded read loop can no
/// longer evict it thanks to the `same_channel` guard in [`Self::release`].
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<String, PlayerConnection>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `name`, replacing any prior one.
    pub fn register(&self, name: String, tx: mpsc::UnboundedSender<Message>) {
        self.connections
            .insert(name.clone(), PlayerConnection { name, tx });
    }

    /// Remove the entry for `name` if it still belongs to this connection.
    /// Idempotent and safe to call after a reconnect replaced the entry.
    pub fn release(&self, name: &str, tx: &mpsc::UnboundedSender<Message>) {
        self.connections
            .remove_if(name, |_, connection| connection.tx.same_channel(tx));
    }

    /// Best-effort push of a message to a player. A dead writer channel is
    /// unregistered on the spot so later notifies report `NotConnected`.
    pub fn notify(&self, name: &str, message: &ServerMessage) -> Result<(), NotifyError> {
        let tx = self
            .connections
            .get(name)
            .map(|connection| connection.tx.clone())
            .ok_or_else(|| NotifyError::NotConnected(name.to_string()))?;

        let payload = match message.to_ws_message() {
            Ok(payload) => payload,
            Err(err) => {
                // Serialization of our own enum failing is a bug, not a
                // connection problem; log and report the send as failed.
                warn!(player = %name, error = %err, "failed to serialize push message");
                return Err(NotifyError::SendFailed(name.to_string()));
            }
        };

        if tx.send(payload).is_err() {
            self.connections
                .remove_if(name, |_, connection| connection.tx.same_channel(&tx));
            return Err(NotifyError::SendFailed(name.to_string()));
        }
        Ok(())
    }

    /// Whether a connection is registered under `name`.
    pub fn is_connected(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
