use std::time::Duration;

/// Default endpoint used when `SONG_API_URL` is not set, matching the
/// development deployment of the generation service.
const DEFAULT_BASE_URL: &str = "http://localhost:3000";
/// Generation waits for the audio to be rendered, so the deadline is long.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Runtime configuration describing how to reach the song-generation API.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the service, without a trailing slash.
    pub base_url: String,
    /// Deadline applied to each generation request.
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// Construct a configuration from an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build a configuration by reading the expected environment variables,
    /// falling back to defaults when unset.
    pub fn from_env() -> Self {
        let base_url = std::env::var("SONG_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let mut config = Self::new(base_url);
        if let Some(secs) = std::env::var("SONG_API_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
        {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}
