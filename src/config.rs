//! Application-level configuration loading for lobby lifecycle tunables.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SONGCHAIN_CONFIG_PATH";

/// Title given to lobbies whose create request does not supply one.
const DEFAULT_TITLE: &str = "MusicTitle";
/// How long finished (done/failed) lobbies stay queryable.
const DEFAULT_DONE_RETENTION: Duration = Duration::from_secs(15 * 60);
/// How long a collecting lobby may sit idle before it counts as abandoned.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
/// How often the background sweep runs.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Title used when a create request omits one.
    pub default_title: String,
    /// Retention window for done/failed lobbies.
    pub done_retention: Duration,
    /// Idle timeout after which a collecting lobby is considered abandoned.
    pub idle_timeout: Duration,
    /// Interval between eviction sweeps.
    pub sweep_interval: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to
    /// baked-in defaults when the file is absent or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded lobby configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_TITLE.into(),
            done_retention: DEFAULT_DONE_RETENTION,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// JSON representation of the configuration file; every field is optional.
#[derive(Debug, Deserialize)]
struct RawConfig {
    default_title: Option<String>,
    done_retention_secs: Option<u64>,
    idle_timeout_secs: Option<u64>,
    sweep_interval_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            default_title: value.default_title.unwrap_or(defaults.default_title),
            done_retention: value
                .done_retention_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.done_retention),
            idle_timeout: value
                .idle_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_timeout),
            sweep_interval: value
                .sweep_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
        }
    }
}

fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
