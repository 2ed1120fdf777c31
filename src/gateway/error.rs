//! Error types for the song-generation gateway.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`GatewayError`] failures.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures that can occur while talking to the song-generation service.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build song API client")]
    ClientBuilder {
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The service could not be reached at the network level.
    #[error("song API unreachable")]
    Unreachable {
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The service did not answer within the configured deadline.
    #[error("song API did not answer within the request deadline")]
    Timeout,
    /// The service answered with a non-success status code.
    #[error("unexpected song API response status {status}")]
    BadStatus {
        /// Status code returned by the service.
        status: StatusCode,
    },
    /// The response body could not be parsed into song descriptors.
    #[error("failed to decode song API response")]
    Decode {
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The service answered successfully but returned zero songs.
    #[error("song API returned no songs")]
    EmptyResult,
}

/// Coarse classification of a [`GatewayError`], recorded on failed lobbies
/// and surfaced in machine-readable error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Network-level failure before a response arrived.
    Unreachable,
    /// The configured deadline elapsed.
    Timeout,
    /// Non-2xx status or malformed body.
    BadResponse,
    /// Successful call that produced no songs.
    EmptyResult,
}

impl GatewayError {
    /// Classify this error for callers that only need the failure kind.
    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            GatewayError::Timeout => GatewayErrorKind::Timeout,
            GatewayError::ClientBuilder { .. } | GatewayError::Unreachable { .. } => {
                GatewayErrorKind::Unreachable
            }
            GatewayError::BadStatus { .. } | GatewayError::Decode { .. } => {
                GatewayErrorKind::BadResponse
            }
            GatewayError::EmptyResult => GatewayErrorKind::EmptyResult,
        }
    }
}

impl std::fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GatewayErrorKind::Unreachable => "gateway_unreachable",
            GatewayErrorKind::Timeout => "gateway_timeout",
            GatewayErrorKind::BadResponse => "gateway_bad_response",
            GatewayErrorKind::EmptyResult => "gateway_empty_result",
        };
        f.write_str(label)
    }
}
