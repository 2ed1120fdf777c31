use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status; always "ok" while the process is serving.
    pub status: String,
    /// Number of lobbies currently held in memory.
    pub open_lobbies: usize,
    /// Number of connected player sockets.
    pub connected_players: usize,
}
