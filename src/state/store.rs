//! Authoritative in-memory lobby map with per-lobby exclusive mutation.

use std::time::Duration;

use dashmap::DashMap;
use tracing::warn;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::gateway::error::GatewayErrorKind;
use crate::gateway::models::SongResult;
use crate::state::lobby::{Lobby, LobbyPhase, TurnStep};

/// Mint a fresh lobby identifier. UUID v4 gives 122 random bits, so
/// collisions over a process lifetime are negligible.
pub fn new_lobby_id() -> Uuid {
    Uuid::new_v4()
}

/// Process-wide mapping from lobby id to lobby state.
///
/// Every mutation runs inside the map's exclusive entry guard and never
/// awaits, so turn submissions and joins targeting the same lobby are
/// linearizable: the read-check-write sequence is a single critical section
/// and losing contenders observe the already-advanced state.
#[derive(Debug, Default)]
pub struct LobbyStore {
    lobbies: DashMap<Uuid, Lobby>,
}

impl LobbyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new lobby with the host as its first player and return a
    /// snapshot of it. Never fails.
    pub fn create(&self, host: String, title: String) -> Lobby {
        let lobby = Lobby::new(new_lobby_id(), host, title);
        self.lobbies.insert(lobby.id, lobby.clone());
        lobby
    }

    /// Read-only snapshot of a lobby.
    pub fn snapshot(&self, id: Uuid) -> Option<Lobby> {
        self.lobbies.get(&id).map(|entry| entry.value().clone())
    }

    /// Append a player to a lobby, returning the updated snapshot.
    pub fn join(&self, id: Uuid, name: String) -> Result<Lobby, ServiceError> {
        let mut entry = self
            .lobbies
            .get_mut(&id)
            .ok_or(ServiceError::LobbyNotFound(id))?;
        entry.join(name)?;
        Ok(entry.value().clone())
    }

    /// Apply a turn submission under the lobby's exclusive entry guard.
    /// This is the only path by which turn-related fields change.
    pub fn submit(&self, id: Uuid, player: &str, content: String) -> Result<TurnStep, ServiceError> {
        let mut entry = self
            .lobbies
            .get_mut(&id)
            .ok_or(ServiceError::LobbyNotFound(id))?;
        Ok(entry.submit(player, content)?)
    }

    /// Record generation results on a Completing lobby.
    pub fn finish(&self, id: Uuid, results: Vec<SongResult>) {
        match self.lobbies.get_mut(&id) {
            Some(mut entry) => {
                if !entry.finish(results) {
                    warn!(lobby = %id, phase = ?entry.phase, "ignoring generation results outside completing phase");
                }
            }
            None => warn!(lobby = %id, "generation finished for a lobby that no longer exists"),
        }
    }

    /// Record a generation failure on a Completing lobby.
    pub fn fail(&self, id: Uuid, reason: GatewayErrorKind) {
        match self.lobbies.get_mut(&id) {
            Some(mut entry) => {
                if !entry.fail(reason) {
                    warn!(lobby = %id, phase = ?entry.phase, "ignoring generation failure outside completing phase");
                }
            }
            None => warn!(lobby = %id, "generation failed for a lobby that no longer exists"),
        }
    }

    /// Number of lobbies currently held.
    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    /// Whether the store holds no lobbies.
    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }

    /// Drop terminal lobbies past their retention window and collecting
    /// lobbies idle past the abandonment timeout. Completing lobbies are
    /// never swept; an in-flight generation must be able to write back.
    /// Returns the number of evicted lobbies.
    pub fn remove_expired(&self, retention: Duration, idle_timeout: Duration) -> usize {
        let before = self.lobbies.len();
        self.lobbies.retain(|_, lobby| match lobby.phase {
            LobbyPhase::Done { .. } | LobbyPhase::Failed { .. } => {
                lobby.touched_at.elapsed() < retention
            }
            LobbyPhase::Completing => true,
            LobbyPhase::Collecting { .. } => lobby.touched_at.elapsed() < idle_timeout,
        });
        before - self.lobbies.len()
    }
}
