use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the songchain backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::lobby::create_lobby,
        crate::routes::lobby::get_lobby,
        crate::routes::lobby::join_lobby,
        crate::routes::lobby::submit_turn,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::lobby::CreateLobbyRequest,
            crate::dto::lobby::CreateLobbyResponse,
            crate::dto::lobby::JoinLobbyRequest,
            crate::dto::lobby::TurnRequest,
            crate::dto::lobby::TurnAdvancedResponse,
            crate::dto::lobby::SongsCreatedResponse,
            crate::dto::lobby::LobbySnapshot,
            crate::dto::lobby::LobbyPhaseDto,
            crate::dto::lobby::SongResultDto,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "lobby", description = "Lobby lifecycle and turn submission"),
        (name = "ws", description = "WebSocket push channel for players"),
    )
)]
pub struct ApiDoc;
