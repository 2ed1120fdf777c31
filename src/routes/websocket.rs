use axum::{
    Router,
    extract::{Path, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};

use crate::{
    dto::validation::validate_username, error::AppError, services::websocket_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/ws/{username}",
    tag = "ws",
    params(("username" = String, Path, description = "Player name to register the connection under")),
    responses(
        (status = 101, description = "Switching protocols to WebSocket"),
        (status = 400, description = "Invalid player name")
    )
)]
/// Upgrade the HTTP connection into a player push-notification session.
pub async fn ws_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    if let Err(err) = validate_username(&username) {
        return Err(AppError::BadRequest {
            kind: "malformed_request".into(),
            message: format!("invalid player name: {err}"),
        });
    }

    let shared_state = state.clone();
    Ok(ws.on_upgrade(move |socket| {
        websocket_service::handle_socket(shared_state, socket, username)
    }))
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/ws/{username}", get(ws_handler))
}
