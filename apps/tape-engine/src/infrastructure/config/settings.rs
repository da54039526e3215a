//! Engine Configuration Settings
//!
//! Configuration types for the tape engine, loaded from environment
//! variables. Empty values are treated as unset where a variable is
//! optional.

use std::path::PathBuf;
use std::time::Duration;

use super::endpoint::{OriginContext, resolve_endpoint};
use crate::domain::history::DEFAULT_CAPACITY;

/// Default health check HTTP port.
const DEFAULT_HEALTH_PORT: u16 = 8090;

/// Default inter-event delay when replaying a capture file.
const DEFAULT_REPLAY_DELAY: Duration = Duration::from_millis(50);

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Origin string could not be parsed.
    #[error("invalid origin: {0}")]
    InvalidOrigin(String),
    /// Environment variable holds an unparseable value.
    #[error("environment variable {0} has invalid value: {1}")]
    InvalidValue(&'static str, String),
}

/// Replay feed settings.
#[derive(Debug, Clone)]
pub struct ReplaySettings {
    /// Newline-delimited JSON capture file to replay.
    pub file: PathBuf,
    /// Delay between replayed events, simulating real-time ingestion.
    pub delay: Duration,
}

/// Complete engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Environment-provided feed endpoint (`TRADES_WS`).
    pub env_endpoint: Option<String>,
    /// Hosting origin context (`TAPE_ORIGIN`).
    pub origin: Option<OriginContext>,
    /// History buffer capacity (`TAPE_BUFFER_CAPACITY`).
    pub buffer_capacity: usize,
    /// Health check HTTP port (`TAPE_HEALTH_PORT`).
    pub health_port: u16,
    /// Replay mode settings (`TAPE_REPLAY_FILE`, `TAPE_REPLAY_DELAY_MS`).
    pub replay: Option<ReplaySettings>,
}

impl EngineConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `TAPE_ORIGIN` or `TAPE_BUFFER_CAPACITY` is set
    /// to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_endpoint = env_nonempty("TRADES_WS");

        let origin = env_nonempty("TAPE_ORIGIN")
            .map(|raw| OriginContext::parse(&raw))
            .transpose()?;

        let buffer_capacity = parse_capacity(env_nonempty("TAPE_BUFFER_CAPACITY").as_deref())?;

        let health_port = parse_env_u16("TAPE_HEALTH_PORT", DEFAULT_HEALTH_PORT);

        let replay = env_nonempty("TAPE_REPLAY_FILE").map(|file| ReplaySettings {
            file: PathBuf::from(file),
            delay: parse_env_duration_millis("TAPE_REPLAY_DELAY_MS", DEFAULT_REPLAY_DELAY),
        });

        Ok(Self {
            env_endpoint,
            origin,
            buffer_capacity,
            health_port,
            replay,
        })
    }

    /// Resolve the feed connection URL, optionally forced by an explicit
    /// endpoint that takes precedence over everything else.
    #[must_use]
    pub fn feed_url(&self, explicit: Option<&str>) -> String {
        resolve_endpoint(explicit, self.env_endpoint.as_deref(), self.origin.as_ref())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            env_endpoint: None,
            origin: None,
            buffer_capacity: DEFAULT_CAPACITY,
            health_port: DEFAULT_HEALTH_PORT,
            replay: None,
        }
    }
}

/// Load a `.env` file from the current directory or any ancestor.
pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_capacity(raw: Option<&str>) -> Result<usize, ConfigError> {
    match raw {
        None => Ok(DEFAULT_CAPACITY),
        Some(value) => value
            .trim()
            .parse::<usize>()
            .map(|capacity| capacity.max(1))
            .map_err(|_| ConfigError::InvalidValue("TAPE_BUFFER_CAPACITY", value.to_string())),
    }
}

fn parse_env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = EngineConfig::default();
        assert_eq!(config.buffer_capacity, DEFAULT_CAPACITY);
        assert_eq!(config.health_port, DEFAULT_HEALTH_PORT);
        assert!(config.env_endpoint.is_none());
        assert!(config.origin.is_none());
        assert!(config.replay.is_none());
    }

    #[test]
    fn capacity_defaults_when_unset() {
        assert_eq!(parse_capacity(None).unwrap(), DEFAULT_CAPACITY);
    }

    #[test]
    fn capacity_parses_and_clamps_to_one() {
        assert_eq!(parse_capacity(Some("500")).unwrap(), 500);
        assert_eq!(parse_capacity(Some("0")).unwrap(), 1);
    }

    #[test]
    fn capacity_rejects_garbage() {
        assert!(parse_capacity(Some("lots")).is_err());
        assert!(parse_capacity(Some("-3")).is_err());
    }

    #[test]
    fn feed_url_uses_configured_origin() {
        let config = EngineConfig {
            origin: Some(OriginContext {
                secure_transport: true,
                hostname: "dash.example.com".to_string(),
            }),
            ..EngineConfig::default()
        };

        assert_eq!(config.feed_url(None), "wss://dash.example.com:8000/ws/trades");
    }

    #[test]
    fn feed_url_prefers_env_endpoint() {
        let config = EngineConfig {
            env_endpoint: Some("ws://feed.internal:8000/ws/trades".to_string()),
            origin: Some(OriginContext {
                secure_transport: true,
                hostname: "dash.example.com".to_string(),
            }),
            ..EngineConfig::default()
        };

        assert_eq!(config.feed_url(None), "ws://feed.internal:8000/ws/trades");
        assert_eq!(config.feed_url(Some("ws://override:1/ws")), "ws://override:1/ws");
    }
}
