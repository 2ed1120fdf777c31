//! Wire and domain models exchanged with the song-generation API.

use serde::{Deserialize, Serialize};

/// Accumulated lobby content handed to the gateway once every turn is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Song title chosen at lobby creation.
    pub title: String,
    /// Genre contributed by the first turn, sent as the style tag.
    pub genre: String,
    /// Verses in turn order.
    pub verses: Vec<String>,
}

impl GenerationRequest {
    /// Join the verses into the single newline-separated prompt the service
    /// expects.
    pub fn prompt(&self) -> String {
        self.verses.join("\n")
    }
}

/// Outbound payload for `POST /api/custom_generate`.
#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequestBody<'a> {
    pub prompt: String,
    pub tags: &'a str,
    pub title: &'a str,
    pub make_instrumental: bool,
    pub wait_audio: bool,
}

impl<'a> GenerateRequestBody<'a> {
    pub fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            prompt: request.prompt(),
            tags: &request.genre,
            title: &request.title,
            make_instrumental: false,
            wait_audio: true,
        }
    }
}

/// Raw song descriptor as returned by the service. The API reports many more
/// fields (model name, timestamps, status); only the ones surfaced to players
/// are retained.
#[derive(Debug, Deserialize)]
pub(crate) struct SongDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub audio_url: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub lyric: String,
    #[serde(default)]
    pub tags: String,
}

/// A generated song, stored on the lobby once generation completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongResult {
    /// Identifier assigned by the generation service.
    pub id: String,
    /// Title of the generated track.
    pub title: String,
    /// Playable audio reference.
    pub audio_url: String,
    /// Cover image reference.
    pub image_url: String,
    /// Full lyric text as rendered by the service.
    pub lyric: String,
    /// Style tags the service applied.
    pub tags: String,
}

impl From<SongDescriptor> for SongResult {
    fn from(value: SongDescriptor) -> Self {
        Self {
            id: value.id,
            title: value.title,
            audio_url: value.audio_url,
            image_url: value.image_url,
            lyric: value.lyric,
            tags: value.tags,
        }
    }
}
