//! Outbound integration with the external song-generation API.

pub mod client;
pub mod config;
pub mod error;
pub mod models;

use futures::future::BoxFuture;

use self::error::GatewayResult;
use self::models::{GenerationRequest, SongResult};

/// Abstraction over the song-generation service so the turn flow can be
/// exercised without a live endpoint.
pub trait SongGenerator: Send + Sync {
    /// Submit the accumulated lobby content and wait for generated songs.
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'static, GatewayResult<Vec<SongResult>>>;
}
