//! Console configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Numeric and boolean keys fall back to
//! their defaults when missing or unparsable; a bad listen address or
//! output format is a startup error.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::console::OutputFormat;
use crate::error::ConsoleError;

/// Top-level console configuration.
///
/// Loaded once at startup via [`ConsoleConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Socket address the console listens on (e.g. `0.0.0.0:23`).
    pub listen_addr: SocketAddr,

    /// Output dialect for every session.
    pub format: OutputFormat,

    /// Session pool size. `1` makes the console exclusive.
    pub max_sessions: usize,

    /// Sessions with no input for longer than this are closed.
    pub idle_timeout: Duration,

    /// Service tick period.
    pub poll_interval: Duration,

    /// Minimum spacing between diff passes.
    pub broadcast_interval: Duration,

    /// Line accumulation capacity in bytes.
    pub input_buffer: usize,

    /// Whether the `group` and `groups` verbs are active.
    pub groups_enabled: bool,

    /// Optional JSON seed for the in-memory registry.
    pub shades_file: Option<PathBuf>,

    /// Drive shade positions toward their targets in the bundled registry.
    pub simulate_motion: bool,

    /// Motion simulation period.
    pub simulation_step: Duration,

    /// Emit log lines as JSON instead of the pretty formatter.
    pub json_logs: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 23)),
            format: OutputFormat::Json,
            max_sessions: 3,
            idle_timeout: Duration::from_secs(600),
            poll_interval: Duration::from_millis(20),
            broadcast_interval: Duration::from_millis(100),
            input_buffer: 128,
            groups_enabled: true,
            shades_file: None,
            simulate_motion: true,
            simulation_step: Duration::from_millis(250),
            json_logs: false,
        }
    }
}

impl ConsoleConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Config`] if `LISTEN_ADDR` or `CONSOLE_FORMAT`
    /// is set but invalid.
    pub fn from_env() -> Result<Self, ConsoleError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Config`] if `LISTEN_ADDR` or `CONSOLE_FORMAT`
    /// is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConsoleError> {
        let defaults = Self::default();

        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConsoleError::Config(format!("LISTEN_ADDR '{raw}': {e}")))?,
            None => defaults.listen_addr,
        };
        let format = match lookup("CONSOLE_FORMAT") {
            Some(raw) => raw.parse()?,
            None => defaults.format,
        };

        let max_sessions = parse_key(&lookup, "CONSOLE_MAX_SESSIONS", defaults.max_sessions).max(1);
        let idle_timeout = Duration::from_secs(parse_key(
            &lookup,
            "CONSOLE_IDLE_TIMEOUT_SECS",
            defaults.idle_timeout.as_secs(),
        ));
        let poll_interval = millis(&lookup, "CONSOLE_POLL_INTERVAL_MS", defaults.poll_interval);
        let broadcast_interval = millis(
            &lookup,
            "CONSOLE_BROADCAST_INTERVAL_MS",
            defaults.broadcast_interval,
        );
        let input_buffer = parse_key(&lookup, "CONSOLE_INPUT_BUFFER", defaults.input_buffer).max(1);
        let groups_enabled = parse_bool(&lookup, "CONSOLE_GROUPS_ENABLED", defaults.groups_enabled);

        let shades_file = lookup("SHADES_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let simulate_motion = parse_bool(&lookup, "SIMULATE_MOTION", defaults.simulate_motion);
        let simulation_step = millis(&lookup, "SIMULATION_STEP_MS", defaults.simulation_step);
        let json_logs = lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"));

        Ok(Self {
            listen_addr,
            format,
            max_sessions,
            idle_timeout,
            poll_interval,
            broadcast_interval,
            input_buffer,
            groups_enabled,
            shades_file,
            simulate_motion,
            simulation_step,
            json_logs,
        })
    }
}

/// Parses a key as `T`, returning `default` on missing or invalid values.
fn parse_key<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Millisecond duration; zero is treated as unset since tokio intervals
/// reject a zero period.
fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Duration {
    match parse_key::<u64>(lookup, key, 0) {
        0 => default,
        ms => Duration::from_millis(ms),
    }
}

/// Parses a key as a boolean. Accepts `"true"`, `"1"`, `"false"`, `"0"`
/// (case-insensitive). Returns `default` otherwise.
fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
