use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::lobby::{
        CreateLobbyRequest, CreateLobbyResponse, JoinLobbyRequest, LobbySnapshot,
        SongsCreatedResponse, TurnAdvancedResponse, TurnRequest,
    },
    error::AppError,
    services::{lobby_service, turn_service},
    state::SharedState,
};

/// Routes handling the lobby lifecycle and turn submission.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/lobby", post(create_lobby))
        .route("/lobby/{id}", get(get_lobby))
        .route("/lobby/{id}/join", post(join_lobby))
        .route("/lobby/{id}/turn", post(submit_turn))
}

/// Open a new lobby with the requesting player as host.
#[utoipa::path(
    post,
    path = "/lobby",
    tag = "lobby",
    request_body = CreateLobbyRequest,
    responses(
        (status = 201, description = "Lobby created", body = CreateLobbyResponse),
        (status = 400, description = "Malformed request")
    )
)]
pub async fn create_lobby(
    State(state): State<SharedState>,
    Json(payload): Json<CreateLobbyRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let lobby = lobby_service::create_lobby(&state, payload.username, payload.title);
    Ok((
        StatusCode::CREATED,
        Json(CreateLobbyResponse { lobby_id: lobby.id }),
    ))
}

/// Fetch a read-only lobby snapshot; also the polling fallback for players
/// that missed a push notification.
#[utoipa::path(
    get,
    path = "/lobby/{id}",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier")),
    responses(
        (status = 200, description = "Lobby snapshot", body = LobbySnapshot),
        (status = 404, description = "Lobby not found")
    )
)]
pub async fn get_lobby(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LobbySnapshot>, AppError> {
    let lobby = lobby_service::fetch_lobby(&state, id)?;
    Ok(Json(LobbySnapshot::from(&lobby)))
}

/// Join an existing lobby.
#[utoipa::path(
    post,
    path = "/lobby/{id}/join",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier")),
    request_body = JoinLobbyRequest,
    responses(
        (status = 200, description = "Joined; updated snapshot", body = LobbySnapshot),
        (status = 403, description = "Lobby is full"),
        (status = 404, description = "Lobby not found"),
        (status = 409, description = "Name taken or lobby closed")
    )
)]
pub async fn join_lobby(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JoinLobbyRequest>,
) -> Result<Json<LobbySnapshot>, AppError> {
    payload.validate()?;
    let lobby = lobby_service::join_lobby(&state, id, payload.username)?;
    Ok(Json(LobbySnapshot::from(&lobby)))
}

/// Submit the current player's turn: the genre on turn 0, a verse afterwards.
#[utoipa::path(
    post,
    path = "/lobby/{id}/turn",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier")),
    request_body = TurnRequest,
    responses(
        (status = 200, description = "Turn advanced", body = TurnAdvancedResponse),
        (status = 201, description = "Game finished; songs generated", body = SongsCreatedResponse),
        (status = 403, description = "Not this player's turn"),
        (status = 404, description = "Lobby not found"),
        (status = 502, description = "Song generation failed"),
        (status = 504, description = "Song generation timed out")
    )
)]
pub async fn submit_turn(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TurnRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;
    let outcome =
        turn_service::submit_turn(&state, id, &payload.username, payload.content).await?;

    let response = match outcome {
        turn_service::TurnOutcome::Advanced { next_player } => (
            StatusCode::OK,
            Json(TurnAdvancedResponse { next_player }),
        )
            .into_response(),
        turn_service::TurnOutcome::Completed { results } => (
            StatusCode::CREATED,
            Json(SongsCreatedResponse {
                results: results.iter().map(Into::into).collect(),
            }),
        )
            .into_response(),
    };
    Ok(response)
}
