// src/config.rs
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const ENV_WS_ADDR: &str = "NFC_WS_ADDR";
pub const ENV_POLL_INTERVAL_MS: &str = "NFC_POLL_INTERVAL_MS";
pub const ENV_EVENT_CAPACITY: &str = "NFC_EVENT_CAPACITY";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

// Runtime settings for the reader service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    // Address the WebSocket server binds to.
    pub ws_addr: SocketAddr,
    // How long one PC/SC status-change wait may block.
    pub poll_interval: Duration,
    // Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            ws_addr: SocketAddr::from(([127, 0, 0, 1], 3500)),
            poll_interval: Duration::from_millis(500),
            event_capacity: 100,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    // Build from an arbitrary variable lookup; unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServiceConfig::default();

        if let Some(value) = lookup(ENV_WS_ADDR) {
            config.ws_addr = parse(ENV_WS_ADDR, value)?;
        }
        if let Some(value) = lookup(ENV_POLL_INTERVAL_MS) {
            config.poll_interval = Duration::from_millis(parse(ENV_POLL_INTERVAL_MS, value)?);
        }
        if let Some(value) = lookup(ENV_EVENT_CAPACITY) {
            let capacity: usize = parse(ENV_EVENT_CAPACITY, value)?;
            // tokio broadcast panics on zero capacity
            if capacity == 0 {
                return Err(ConfigError::Invalid {
                    var: ENV_EVENT_CAPACITY,
                    value: "0".into(),
                });
            }
            config.event_capacity = capacity;
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}
