//! Two-level error design: domain-level [`ServiceError`] values are mapped
//! into HTTP-facing [`AppError`] responses with machine-readable kinds.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::gateway::error::{GatewayError, GatewayErrorKind};
use crate::state::lobby::{JoinError, TurnError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The referenced lobby does not exist (or has been evicted).
    #[error("lobby `{0}` not found")]
    LobbyNotFound(Uuid),
    /// The lobby already holds the maximum number of players.
    #[error("lobby is full")]
    LobbyFull,
    /// The lobby left the collecting phase; joins and turns are over.
    #[error("lobby is no longer accepting actions")]
    LobbyClosed,
    /// Another player in the lobby already uses this name.
    #[error("player name `{0}` is already taken")]
    NameTaken(String),
    /// A player tried to act outside their turn.
    #[error("not your turn (it is `{current}`'s turn)")]
    NotYourTurn {
        /// Name of the player whose turn it actually is.
        current: String,
    },
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The song-generation call failed; the lobby has been marked failed.
    #[error("song generation failed")]
    Gateway(#[source] GatewayError),
    /// An internal task crashed mid-operation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Machine-readable kind reported in HTTP error bodies.
    pub fn kind(&self) -> String {
        match self {
            ServiceError::LobbyNotFound(_) => "lobby_not_found".into(),
            ServiceError::LobbyFull => "lobby_full".into(),
            ServiceError::LobbyClosed => "lobby_closed".into(),
            ServiceError::NameTaken(_) => "name_taken".into(),
            ServiceError::NotYourTurn { .. } => "not_your_turn".into(),
            ServiceError::InvalidInput(_) => "malformed_request".into(),
            ServiceError::Gateway(err) => err.kind().to_string(),
            ServiceError::Internal(_) => "internal_error".into(),
        }
    }
}

impl From<JoinError> for ServiceError {
    fn from(err: JoinError) -> Self {
        match err {
            JoinError::Full => ServiceError::LobbyFull,
            JoinError::NameTaken(name) => ServiceError::NameTaken(name),
            JoinError::Closed => ServiceError::LobbyClosed,
        }
    }
}

impl From<TurnError> for ServiceError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::NotYourTurn { current } => ServiceError::NotYourTurn { current },
            TurnError::Closed => ServiceError::LobbyClosed,
        }
    }
}

impl From<GatewayError> for ServiceError {
    fn from(err: GatewayError) -> Self {
        ServiceError::Gateway(err)
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {message}")]
    BadRequest {
        /// Machine-readable kind.
        kind: String,
        /// Human-readable detail.
        message: String,
    },
    /// The action is not allowed for this player right now.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Machine-readable kind.
        kind: String,
        /// Human-readable detail.
        message: String,
    },
    /// Requested resource not found.
    #[error("not found: {message}")]
    NotFound {
        /// Machine-readable kind.
        kind: String,
        /// Human-readable detail.
        message: String,
    },
    /// Conflict with current lobby state.
    #[error("conflict: {message}")]
    Conflict {
        /// Machine-readable kind.
        kind: String,
        /// Human-readable detail.
        message: String,
    },
    /// The external song service failed.
    #[error("bad gateway: {message}")]
    BadGateway {
        /// Machine-readable kind.
        kind: String,
        /// Human-readable detail.
        message: String,
    },
    /// The external song service did not answer in time.
    #[error("gateway timeout: {message}")]
    GatewayTimeout {
        /// Human-readable detail.
        message: String,
    },
    /// Internal server error.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable detail.
        message: String,
    },
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            ServiceError::LobbyNotFound(_) => AppError::NotFound { kind, message },
            ServiceError::LobbyFull | ServiceError::NotYourTurn { .. } => {
                AppError::Forbidden { kind, message }
            }
            ServiceError::LobbyClosed | ServiceError::NameTaken(_) => {
                AppError::Conflict { kind, message }
            }
            ServiceError::InvalidInput(_) => AppError::BadRequest { kind, message },
            ServiceError::Gateway(gateway) => match gateway.kind() {
                GatewayErrorKind::Timeout => AppError::GatewayTimeout { message },
                _ => AppError::BadGateway { kind, message },
            },
            ServiceError::Internal(_) => AppError::Internal { message },
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest {
            kind: "malformed_request".into(),
            message: format!("validation failed: {err}"),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind) = match &self {
            AppError::BadRequest { kind, .. } => (StatusCode::BAD_REQUEST, kind.clone()),
            AppError::Forbidden { kind, .. } => (StatusCode::FORBIDDEN, kind.clone()),
            AppError::NotFound { kind, .. } => (StatusCode::NOT_FOUND, kind.clone()),
            AppError::Conflict { kind, .. } => (StatusCode::CONFLICT, kind.clone()),
            AppError::BadGateway { kind, .. } => (StatusCode::BAD_GATEWAY, kind.clone()),
            AppError::GatewayTimeout { .. } => {
                (StatusCode::GATEWAY_TIMEOUT, "gateway_timeout".into())
            }
            AppError::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error".into())
            }
        };

        let payload = Json(ErrorBody {
            error: kind,
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
