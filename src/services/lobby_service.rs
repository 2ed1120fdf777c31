use tracing::info;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::state::SharedState;
use crate::state::lobby::Lobby;

/// Open a new lobby hosted by `username` and return its snapshot.
pub fn create_lobby(state: &SharedState, username: String, title: Option<String>) -> Lobby {
    let title = title.unwrap_or_else(|| state.config().default_title.clone());
    let lobby = state.lobbies().create(username, title);
    info!(lobby = %lobby.id, host = %lobby.players[0].name, "lobby created");
    lobby
}

/// Add a player to an existing lobby and return the updated snapshot.
pub fn join_lobby(state: &SharedState, id: Uuid, username: String) -> Result<Lobby, ServiceError> {
    let lobby = state.lobbies().join(id, username.clone())?;
    info!(lobby = %id, player = %username, players = lobby.players.len(), "player joined lobby");
    Ok(lobby)
}

/// Read-only snapshot of a lobby, used for fetches and turn polling.
pub fn fetch_lobby(state: &SharedState, id: Uuid) -> Result<Lobby, ServiceError> {
    state
        .lobbies()
        .snapshot(id)
        .ok_or(ServiceError::LobbyNotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::gateway::SongGenerator;
    use crate::gateway::error::GatewayError;
    use crate::gateway::models::{GenerationRequest, SongResult};
    use crate::state::AppState;
    use futures::future::BoxFuture;
    use std::sync::Arc;

    struct NoGenerator;

    impl SongGenerator for NoGenerator {
        fn generate(
            &self,
            _request: GenerationRequest,
        ) -> BoxFuture<'static, Result<Vec<SongResult>, GatewayError>> {
            Box::pin(async { Err(GatewayError::EmptyResult) })
        }
    }

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(NoGenerator))
    }

    #[test]
    fn create_uses_configured_default_title() {
        let state = test_state();
        let lobby = create_lobby(&state, "alice".into(), None);
        assert_eq!(lobby.title, "MusicTitle");

        let titled = create_lobby(&state, "bob".into(), Some("Midnight Jam".into()));
        assert_eq!(titled.title, "Midnight Jam");
    }

    #[test]
    fn fetch_unknown_lobby_is_not_found() {
        let state = test_state();
        assert!(matches!(
            fetch_lobby(&state, Uuid::new_v4()),
            Err(ServiceError::LobbyNotFound(_))
        ));
    }

    #[test]
    fn join_then_fetch_sees_both_players() {
        let state = test_state();
        let lobby = create_lobby(&state, "alice".into(), None);
        join_lobby(&state, lobby.id, "bob".into()).unwrap();

        let snapshot = fetch_lobby(&state, lobby.id).unwrap();
        let names: Vec<_> = snapshot.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["alice", "bob"]);
    }
}
