//! Typed configuration, loadable from a JSON file with environment
//! overrides, following the same pattern the teacher uses for
//! `GameConfig.json` — except here the values tune timeouts instead of
//! listing games.

use std::fs;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub turn_timeout_secs: u64,
    pub inactivity_timeout_secs: u64,
    pub reconnect_window_secs: u64,
    pub terminal_grace_secs: u64,
    pub quick_match_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "127.0.0.1:8889".to_string(),
            turn_timeout_secs: 60,
            inactivity_timeout_secs: 5,
            reconnect_window_secs: 60,
            terminal_grace_secs: 10,
            quick_match_timeout_secs: 120,
        }
    }
}

impl Config {
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }

    pub fn reconnect_window(&self) -> Duration {
        Duration::from_secs(self.reconnect_window_secs)
    }

    pub fn terminal_grace(&self) -> Duration {
        Duration::from_secs(self.terminal_grace_secs)
    }

    pub fn quick_match_timeout(&self) -> Duration {
        Duration::from_secs(self.quick_match_timeout_secs)
    }

    /// Loads configuration from the file named by `COORDINATOR_CONFIG`
    /// (default `CoordinatorConfig.json`), falling back to defaults if the
    /// file is absent, then applies individual `COORDINATOR_*` environment
    /// overrides on top.
    pub fn load() -> Self {
        let path = std::env::var("COORDINATOR_CONFIG")
            .unwrap_or_else(|_| "CoordinatorConfig.json".to_string());

        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(%path, error = %err, "Failed to parse config file, using defaults.");
                    Config::default()
                }
            },
            Err(_) => {
                tracing::info!(%path, "No config file found, using defaults.");
                Config::default()
            }
        };

        if let Ok(addr) = std::env::var("COORDINATOR_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        macro_rules! override_secs {
            ($field:ident, $env:literal) => {
                if let Ok(value) = std::env::var($env) {
                    if let Ok(parsed) = value.parse() {
                        config.$field = parsed;
                    }
                }
            };
        }
        override_secs!(turn_timeout_secs, "COORDINATOR_TURN_TIMEOUT_SECS");
        override_secs!(inactivity_timeout_secs, "COORDINATOR_INACTIVITY_TIMEOUT_SECS");
        override_secs!(reconnect_window_secs, "COORDINATOR_RECONNECT_WINDOW_SECS");
        override_secs!(terminal_grace_secs, "COORDINATOR_TERMINAL_GRACE_SECS");
        override_secs!(quick_match_timeout_secs, "COORDINATOR_QUICK_MATCH_TIMEOUT_SECS");

        config
    }
}
