//! Typed configuration for the router: the listen port and the static list
//! of backends it forwards to, loadable from JSON with environment
//! overrides — the same pattern the session coordinator uses for its own
//! config, and the teacher uses for `GameConfig.json`.

use std::fs;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub backends: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "0.0.0.0:8888".to_string(),
            backends: vec![
                "127.0.0.1:8889".to_string(),
                "127.0.0.1:8890".to_string(),
                "127.0.0.1:8891".to_string(),
            ],
        }
    }
}

impl Config {
    /// Loads configuration from the file named by `ROUTER_CONFIG` (default
    /// `RouterConfig.json`), falling back to defaults if the file is absent,
    /// then applies `ROUTER_LISTEN_ADDR`/`ROUTER_BACKENDS` overrides.
    pub fn load() -> Self {
        let path = std::env::var("ROUTER_CONFIG").unwrap_or_else(|_| "RouterConfig.json".to_string());

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

        if let Ok(addr) = std::env::var("ROUTER_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Ok(backends) = std::env::var("ROUTER_BACKENDS") {
            config.backends = backends.split(',').map(|s| s.trim().to_string()).collect();
        }

        config
    }
}
