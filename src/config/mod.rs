//! Configuration module for the team-building backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_DB_PATH: &str = "./data/drafts.sqlite";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;
const DEFAULT_DRAFT_KEY: &str = "ideaDraft";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Path to the SQLite file backing draft storage
    pub db_path: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Quiet interval before a form edit is autosaved
    pub autosave_delay: Duration,
    /// Storage key the draft snapshot lives under
    pub draft_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            db_path: DEFAULT_DB_PATH.into(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            autosave_delay: Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
            draft_key: DEFAULT_DRAFT_KEY.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let bind_addr = env::var("TEAMBUILDING_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse().unwrap_or_else(|_| {
            // Logging is not initialized yet, so this goes to stderr directly.
            eprintln!("Invalid TEAMBUILDING_BIND_ADDR {bind_addr:?}, using {DEFAULT_BIND_ADDR}");
            defaults.bind_addr
        });

        let db_path = env::var("TEAMBUILDING_DB_PATH")
            .unwrap_or_else(|_| DEFAULT_DB_PATH.to_string())
            .into();

        let log_level =
            env::var("TEAMBUILDING_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        let autosave_delay = match env::var("TEAMBUILDING_AUTOSAVE_DELAY_MS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    eprintln!(
                        "Invalid TEAMBUILDING_AUTOSAVE_DELAY_MS {raw:?}, using {DEFAULT_AUTOSAVE_DELAY_MS}"
                    );
                    defaults.autosave_delay
                }
            },
            Err(_) => defaults.autosave_delay,
        };

        let draft_key = env::var("TEAMBUILDING_DRAFT_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .unwrap_or(defaults.draft_key);

        Self {
            bind_addr,
            db_path,
            log_level,
            autosave_delay,
            draft_key,
        }
    }
}
