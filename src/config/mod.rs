//! Configuration module for the classroom backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;

use crate::conference::MediaPolicy;

/// Default number of undoable whiteboard strokes.
pub const DEFAULT_WHITEBOARD_HISTORY: usize = 200;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (optional in development)
    pub api_psk: Option<String>,
    /// Path to SQLite database file holding the key-value store
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Offset of the classroom's local time from UTC
    pub utc_offset: FixedOffset,
    /// Origin used when building classroom invite links
    pub public_base_url: String,
    /// Maximum number of undoable whiteboard strokes
    pub whiteboard_history: usize,
    /// Delay before the simulated chat reply arrives
    pub chat_reply_delay: Duration,
    /// How the simulated capture devices answer permission prompts
    pub media_policy: MediaPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("CLASSROOM_API_PSK").ok().filter(|k| !k.is_empty());

        let db_path = env::var("CLASSROOM_DB_PATH")
            .unwrap_or_else(|_| "./data/classroom.sqlite".to_string())
            .into();

        let bind_addr = env::var("CLASSROOM_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid CLASSROOM_BIND_ADDR format");

        let log_level = env::var("CLASSROOM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let offset_minutes: i32 = parse_var("CLASSROOM_UTC_OFFSET_MINUTES").unwrap_or(0);
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60)
            .expect("CLASSROOM_UTC_OFFSET_MINUTES must be within +/- 24 hours");

        let public_base_url = env::var("CLASSROOM_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}", bind_addr))
            .trim_end_matches('/')
            .to_string();

        let whiteboard_history = parse_var("CLASSROOM_WHITEBOARD_HISTORY")
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_WHITEBOARD_HISTORY);

        let chat_reply_delay =
            Duration::from_millis(parse_var("CLASSROOM_CHAT_REPLY_DELAY_MS").unwrap_or(1000));

        let media_policy = parse_var("CLASSROOM_MEDIA_POLICY").unwrap_or_default();

        Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            utc_offset,
            public_base_url,
            whiteboard_history,
            chat_reply_delay,
            media_policy,
        }
    }
}

/// Read and parse an optional variable, ignoring values that do not parse.
fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
