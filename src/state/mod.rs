//! Shared application state: the lobby store and the connection registry.

pub mod lobby;
pub mod registry;
pub mod store;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::gateway::SongGenerator;

pub use self::registry::ConnectionRegistry;
pub use self::store::LobbyStore;

/// Cheaply cloneable handle to the process-wide state.
pub type SharedState = Arc<AppState>;

/// Central application state: the two shared mutable resources of the core
/// plus the immutable configuration and the gateway handle.
pub struct AppState {
    config: AppConfig,
    lobbies: LobbyStore,
    connections: ConnectionRegistry,
    gateway: Arc<dyn SongGenerator>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be
    /// cloned cheaply across request handlers and socket tasks.
    pub fn new(config: AppConfig, gateway: Arc<dyn SongGenerator>) -> SharedState {
        Arc::new(Self {
            config,
            lobbies: LobbyStore::new(),
            connections: ConnectionRegistry::new(),
            gateway,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Authoritative lobby map.
    pub fn lobbies(&self) -> &LobbyStore {
        &self.lobbies
    }

    /// Registry of live player sockets keyed by player name.
    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    /// Handle to the song-generation gateway.
    pub fn gateway(&self) -> Arc<dyn SongGenerator> {
        Arc::clone(&self.gateway)
    }
}
