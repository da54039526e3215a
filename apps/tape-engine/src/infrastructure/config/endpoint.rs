//! Feed Endpoint Resolution
//!
//! Derives the single feed connection URL from explicit configuration,
//! the environment, or the hosting origin. Resolution is a pure function
//! of its inputs and always succeeds: with nothing else available it
//! falls back to the literal localhost default.
//!
//! Precedence, first match wins:
//!
//! 1. Explicit endpoint argument
//! 2. Environment-provided endpoint (`TRADES_WS`)
//! 3. Derived from the origin context: `wss` iff the origin is served
//!    securely, same hostname, fixed port 8000, path `/ws/trades`
//! 4. Literal default

use super::settings::ConfigError;

/// Fallback endpoint for headless execution with no origin context.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/ws/trades";

/// Fixed port of the origin-derived endpoint.
const DEFAULT_PORT: u16 = 8000;

/// Path of the trades stream on the origin-derived endpoint.
const TRADES_PATH: &str = "/ws/trades";

/// Hosting origin, injected explicitly so resolution stays testable by
/// substitution instead of reading ambient global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginContext {
    /// Whether the origin is served over a secure transport.
    pub secure_transport: bool,
    /// Origin hostname.
    pub hostname: String,
}

impl OriginContext {
    /// Parse an origin string such as `https://dash.example.com` or
    /// `http://localhost:5173/app`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidOrigin` if the scheme is unknown or
    /// the hostname is empty.
    pub fn parse(origin: &str) -> Result<Self, ConfigError> {
        let origin = origin.trim();
        let (scheme, rest) = origin
            .split_once("://")
            .ok_or_else(|| ConfigError::InvalidOrigin(origin.to_string()))?;

        let secure_transport = match scheme.to_ascii_lowercase().as_str() {
            "https" | "wss" => true,
            "http" | "ws" => false,
            _ => return Err(ConfigError::InvalidOrigin(origin.to_string())),
        };

        let hostname = rest
            .split(['/', ':', '?', '#'])
            .next()
            .unwrap_or_default()
            .to_string();

        if hostname.is_empty() {
            return Err(ConfigError::InvalidOrigin(origin.to_string()));
        }

        Ok(Self {
            secure_transport,
            hostname,
        })
    }
}

/// Resolve the feed connection URL.
#[must_use]
pub fn resolve_endpoint(
    explicit: Option<&str>,
    env_endpoint: Option<&str>,
    origin: Option<&OriginContext>,
) -> String {
    if let Some(endpoint) = explicit.filter(|e| !e.is_empty()) {
        return endpoint.to_string();
    }

    if let Some(endpoint) = env_endpoint.filter(|e| !e.is_empty()) {
        return endpoint.to_string();
    }

    origin.map_or_else(
        || DEFAULT_ENDPOINT.to_string(),
        |origin| {
            let scheme = if origin.secure_transport { "wss" } else { "ws" };
            format!(
                "{scheme}://{}:{DEFAULT_PORT}{TRADES_PATH}",
                origin.hostname
            )
        },
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_endpoint_wins() {
        let origin = OriginContext {
            secure_transport: true,
            hostname: "dash.example.com".to_string(),
        };

        let url = resolve_endpoint(
            Some("ws://feed.internal:9001/ws/trades"),
            Some("ws://env.example:8000/ws/trades"),
            Some(&origin),
        );
        assert_eq!(url, "ws://feed.internal:9001/ws/trades");
    }

    #[test]
    fn environment_endpoint_beats_origin() {
        let origin = OriginContext {
            secure_transport: true,
            hostname: "dash.example.com".to_string(),
        };

        let url = resolve_endpoint(None, Some("ws://env.example:8000/ws/trades"), Some(&origin));
        assert_eq!(url, "ws://env.example:8000/ws/trades");
    }

    #[test]
    fn empty_overrides_are_treated_as_unset() {
        let url = resolve_endpoint(Some(""), Some(""), None);
        assert_eq!(url, DEFAULT_ENDPOINT);
    }

    #[test]
    fn secure_origin_derives_wss() {
        let origin = OriginContext {
            secure_transport: true,
            hostname: "dash.example.com".to_string(),
        };

        let url = resolve_endpoint(None, None, Some(&origin));
        assert_eq!(url, "wss://dash.example.com:8000/ws/trades");
    }

    #[test]
    fn insecure_origin_derives_ws() {
        let origin = OriginContext {
            secure_transport: false,
            hostname: "localhost".to_string(),
        };

        let url = resolve_endpoint(None, None, Some(&origin));
        assert_eq!(url, "ws://localhost:8000/ws/trades");
    }

    #[test]
    fn no_origin_falls_back_to_default() {
        assert_eq!(resolve_endpoint(None, None, None), DEFAULT_ENDPOINT);
    }

    #[test]
    fn origin_parses_scheme_and_hostname() {
        let origin = OriginContext::parse("https://dash.example.com").unwrap();
        assert!(origin.secure_transport);
        assert_eq!(origin.hostname, "dash.example.com");

        let origin = OriginContext::parse("http://localhost:5173/app").unwrap();
        assert!(!origin.secure_transport);
        assert_eq!(origin.hostname, "localhost");
    }

    #[test]
    fn origin_rejects_unknown_scheme_and_empty_host() {
        assert!(OriginContext::parse("ftp://example.com").is_err());
        assert!(OriginContext::parse("https://").is_err());
        assert!(OriginContext::parse("not-an-origin").is_err());
    }
}
