//! Configuration system.
//!
//! Loads client configuration from JSON strings (file IO left to the app).
//! Every field has a default so partial documents are accepted.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::net::PlayerState;

/// Movement and combat tuning shared by prediction and reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Units per second along each held axis.
    pub move_speed: f32,
    /// Units per second of a freshly fired bullet.
    pub bullet_speed: f32,
    /// Shots per second while fire is held.
    pub fire_rate: f32,
    /// Divergence (units) above which the predicted local player snaps to the
    /// authority's record.
    pub correction_threshold: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            move_speed: 200.0,
            bullet_speed: 500.0,
            fire_rate: 5.0,
            correction_threshold: 50.0,
        }
    }
}

impl Tuning {
    /// Time between two shots while fire is held. A rate that is not
    /// positive never fires; a rate too small to represent saturates.
    pub fn fire_interval(&self) -> Duration {
        if self.fire_rate > 0.0 {
            saturating_secs(1.0 / f64::from(self.fire_rate))
        } else {
            Duration::MAX
        }
    }
}

/// Key names bound to the four movement directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: "w".to_string(),
            down: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
        }
    }
}

/// Root client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Host the game page was served from, e.g. `127.0.0.1:8080`.
    pub page_host: String,
    /// Explicit authority endpoint; derived from `page_host` when unset.
    pub authority_url: Option<String>,
    pub tuning: Tuning,
    pub bindings: KeyBindings,
    /// Provisional local player before the first snapshot arrives.
    pub spawn: PlayerState,
    /// Granularity of the send timer.
    pub send_tick_ms: u64,
    /// Minimum spacing between two outbound intents.
    pub min_send_interval_ms: f64,
    /// Frame (simulate + draw) rate.
    pub frame_hz: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_host: "127.0.0.1:8080".to_string(),
            authority_url: None,
            tuning: Tuning::default(),
            bindings: KeyBindings::default(),
            spawn: PlayerState::new(400.0, 300.0, 100.0),
            send_tick_ms: 10,
            min_send_interval_ms: 1000.0 / 120.0,
            frame_hz: 60,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid page host {0:?}, expected ip:port")]
    InvalidPageHost(String),

    #[error("page port {0} has no successor port for the authority")]
    PortOverflow(u16),
}

impl ClientConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// WebSocket endpoint of the authority: the page's host on the page's
    /// port plus one, unless overridden.
    pub fn authority_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.authority_url {
            return Ok(url.clone());
        }
        let page: SocketAddr = self
            .page_host
            .parse()
            .map_err(|_| ConfigError::InvalidPageHost(self.page_host.clone()))?;
        let port = page
            .port()
            .checked_add(1)
            .ok_or(ConfigError::PortOverflow(page.port()))?;
        Ok(format!("ws://{}", SocketAddr::new(page.ip(), port)))
    }

    /// Minimum spacing between two outbound intents. Negative and NaN values
    /// mean no spacing; huge values saturate.
    pub fn min_send_interval(&self) -> Duration {
        saturating_secs(self.min_send_interval_ms.max(0.0) / 1000.0)
    }
}

fn saturating_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_is_next_port_on_page_host() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.authority_url().unwrap(), "ws://127.0.0.1:8081");
    }

    #[test]
    fn explicit_url_wins() {
        let cfg = ClientConfig {
            authority_url: Some("ws://10.0.0.2:9000".to_string()),
            ..ClientConfig::default()
        };
        assert_eq!(cfg.authority_url().unwrap(), "ws://10.0.0.2:9000");
    }

    #[test]
    fn rejects_bad_hosts() {
        let cfg = ClientConfig {
            page_host: "localhost".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            cfg.authority_url(),
            Err(ConfigError::InvalidPageHost(_))
        ));

        let cfg = ClientConfig {
            page_host: "127.0.0.1:65535".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(cfg.authority_url(), Err(ConfigError::PortOverflow(65535))));
    }

    #[test]
    fn fire_interval_saturates() {
        let tuning = Tuning::default();
        assert_eq!(tuning.fire_interval(), Duration::from_millis(200));

        let slow = Tuning {
            fire_rate: 1e-20,
            ..Tuning::default()
        };
        assert_eq!(slow.fire_interval(), Duration::MAX);

        for rate in [0.0, -3.0, f32::NAN] {
            let off = Tuning {
                fire_rate: rate,
                ..Tuning::default()
            };
            assert_eq!(off.fire_interval(), Duration::MAX);
        }
    }

    #[test]
    fn min_send_interval_saturates() {
        let cfg = ClientConfig {
            min_send_interval_ms: 250.0,
            ..ClientConfig::default()
        };
        assert_eq!(cfg.min_send_interval(), Duration::from_millis(250));

        for ms in [f64::INFINITY, 1e300] {
            let cfg = ClientConfig {
                min_send_interval_ms: ms,
                ..ClientConfig::default()
            };
            assert_eq!(cfg.min_send_interval(), Duration::MAX);
        }

        for ms in [-5.0, f64::NAN] {
            let cfg = ClientConfig {
                min_send_interval_ms: ms,
                ..ClientConfig::default()
            };
            assert_eq!(cfg.min_send_interval(), Duration::ZERO);
        }
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ClientConfig::from_json_str(r#"{ "tuning": { "fire_rate": 10.0 } }"#).unwrap();
        assert_eq!(cfg.tuning.fire_rate, 10.0);
        assert_eq!(cfg.tuning.move_speed, 200.0);
        assert_eq!(cfg.bindings.up, "w");
        assert_eq!(cfg.send_tick_ms, 10);
    }
}
