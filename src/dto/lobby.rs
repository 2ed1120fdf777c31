use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::dto::{format_system_time, validation::validate_username};
use crate::gateway::models::SongResult;
use crate::state::lobby::{Lobby, LobbyPhase};

/// Payload used to open a brand-new lobby.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLobbyRequest {
    /// Name of the host; becomes the first player and takes turn 0.
    pub username: String,
    /// Optional song title; the configured default is used when omitted.
    #[serde(default)]
    pub title: Option<String>,
}

impl Validate for CreateLobbyRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_username(&self.username) {
            errors.add("username", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload used to join an existing lobby.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinLobbyRequest {
    /// Name the joining player will be addressed by.
    pub username: String,
}

impl Validate for JoinLobbyRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_username(&self.username) {
            errors.add("username", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload carrying one turn's contribution.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TurnRequest {
    /// Player claiming the turn.
    pub username: String,
    /// Genre on turn 0, a verse on every later turn.
    pub content: String,
}

impl Validate for TurnRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_username(&self.username) {
            errors.add("username", e);
        }
        if self.content.trim().is_empty() {
            let mut e = validator::ValidationError::new("content_empty");
            e.message = Some("turn content must not be empty".into());
            errors.add("content", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Response returned after a lobby is created.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateLobbyResponse {
    /// Identifier other players use to join.
    pub lobby_id: Uuid,
}

/// Response returned when a turn advanced without finishing the game.
#[derive(Debug, Serialize, ToSchema)]
pub struct TurnAdvancedResponse {
    /// Player whose turn it now is.
    pub next_player: String,
}

/// Response returned when the final turn triggered song generation.
#[derive(Debug, Serialize, ToSchema)]
pub struct SongsCreatedResponse {
    /// Generated songs, in service order.
    pub results: Vec<SongResultDto>,
}

/// Coarse phase tag reported in lobby snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LobbyPhaseDto {
    /// Players are still taking turns.
    Collecting,
    /// The generation call is in flight.
    Completing,
    /// Songs are available under `results`.
    Done,
    /// Generation failed; see `failure_reason`.
    Failed,
}

/// A generated song as exposed to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SongResultDto {
    /// Identifier assigned by the generation service.
    pub id: String,
    /// Title of the generated track.
    pub title: String,
    /// Playable audio reference.
    pub audio_url: String,
    /// Cover image reference.
    pub image_url: String,
    /// Full lyric text.
    pub lyric: String,
    /// Style tags the service applied.
    pub tags: String,
}

impl From<&SongResult> for SongResultDto {
    fn from(value: &SongResult) -> Self {
        Self {
            id: value.id.clone(),
            title: value.title.clone(),
            audio_url: value.audio_url.clone(),
            image_url: value.image_url.clone(),
            lyric: value.lyric.clone(),
            tags: value.tags.clone(),
        }
    }
}

/// Read-only view of a lobby, served by `GET /lobby/{id}` and join replies.
#[derive(Debug, Serialize, ToSchema)]
pub struct LobbySnapshot {
    /// Lobby identifier.
    pub id: Uuid,
    /// Song title.
    pub title: String,
    /// Genre, once turn 0 has run.
    pub genre: Option<String>,
    /// Player names in turn order.
    pub players: Vec<String>,
    /// Verses collected so far, in turn order.
    pub verses: Vec<String>,
    /// Current phase tag.
    pub phase: LobbyPhaseDto,
    /// Index of the current turn while collecting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_turn: Option<usize>,
    /// Name of the player whose turn it is while collecting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player: Option<String>,
    /// Failure kind when the phase is `failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Generated songs when the phase is `done`.
    pub results: Vec<SongResultDto>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<&Lobby> for LobbySnapshot {
    fn from(lobby: &Lobby) -> Self {
        let (phase, current_turn, failure_reason, results) = match &lobby.phase {
            LobbyPhase::Collecting { turn } => (LobbyPhaseDto::Collecting, Some(*turn), None, Vec::new()),
            LobbyPhase::Completing => (LobbyPhaseDto::Completing, None, None, Vec::new()),
            LobbyPhase::Done { results } => (
                LobbyPhaseDto::Done,
                None,
                None,
                results.iter().map(Into::into).collect(),
            ),
            LobbyPhase::Failed { reason } => {
                (LobbyPhaseDto::Failed, None, Some(reason.to_string()), Vec::new())
            }
        };

        Self {
            id: lobby.id,
            title: lobby.title.clone(),
            genre: lobby.genre.clone(),
            players: lobby.players.iter().map(|p| p.name.clone()).collect(),
            verses: lobby.verses.clone(),
            phase,
            current_turn,
            current_player: lobby.current_player().map(str::to_string),
            failure_reason,
            results,
            created_at: format_system_time(lobby.created_at),
        }
    }
}
