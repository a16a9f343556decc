//! Session configuration.

use std::time::Duration;

use metaclient_protocol::MAX_FRAME_LEN;
use serde::{Deserialize, Serialize};

/// Configuration for a metaserver session.
///
/// Every field has a default, so a config file only needs to name the
/// values it wants to change:
///
/// ```rust
/// use metaclient_session::SessionConfig;
///
/// let config = SessionConfig::from_json_str(r#"{ "host": "lobby.example.org" }"#).unwrap();
/// assert_eq!(config.host, "lobby.example.org");
/// assert_eq!(config.port, 7395);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Metaserver host name or address.
    pub host: String,

    /// Metaserver TCP port.
    pub port: u16,

    /// Build identifier reported in `LOGIN`/`RELOGIN`.
    pub build_id: String,

    /// Protocol version reported in `LOGIN`/`RELOGIN`.
    pub protocol_version: u32,

    /// How long to wait for the answer to a login or a game request.
    pub reply_timeout: Duration,

    /// How long the server may stay silent (no `PING`) before we treat
    /// the connection as dead.
    pub ping_timeout: Duration,

    /// Two earlier socket breaks inside this window make the next break
    /// give up instead of reconnecting.
    pub flood_window: Duration,

    /// Largest frame accepted from the server.
    pub max_frame_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 7395,
            build_id: env!("CARGO_PKG_VERSION").to_string(),
            protocol_version: 3,
            reply_timeout: Duration::from_secs(10),
            ping_timeout: Duration::from_secs(240),
            flood_window: Duration::from_secs(10),
            max_frame_len: MAX_FRAME_LEN,
        }
    }
}

impl SessionConfig {
    /// Parses a JSON config, filling missing fields with defaults.
    ///
    /// # Errors
    /// Returns the `serde_json` error if the text is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_metaserver_conventions() {
        let config = SessionConfig::default();
        assert_eq!(config.port, 7395);
        assert_eq!(config.reply_timeout, Duration::from_secs(10));
        assert_eq!(config.ping_timeout, Duration::from_secs(240));
        assert_eq!(config.flood_window, Duration::from_secs(10));
        assert!(!config.build_id.is_empty());
    }

    #[test]
    fn test_from_json_str_partial_config_keeps_defaults() {
        let config = SessionConfig::from_json_str(
            r#"{ "port": 9000, "reply_timeout": { "secs": 2, "nanos": 0 } }"#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.reply_timeout, Duration::from_secs(2));
        assert_eq!(config.host, "localhost");
    }

    #[test]
    fn test_from_json_str_wrong_type_is_error() {
        assert!(SessionConfig::from_json_str(r#"{ "port": "high" }"#).is_err());
    }
}
