use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload plus in-memory occupancy counters.
pub fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        open_lobbies: state.lobbies().len(),
        connected_players: state.connections().len(),
    }
}
