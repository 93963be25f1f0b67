//! Logging setup.
//!
//! Library code only emits `tracing` events; binaries call [`init_logging`]
//! once to install a subscriber.
//!
//! # Targets
//!
//! | Target | Description |
//! |--------|-------------|
//! | `delegate_book::book` | List surgery (link/unlink) |
//! | `delegate_book::engine` | Order fills and rejections |
//! | `delegate_book::delegate` | Owner actions and events |
//! | `delegate_book::persistence` | Snapshot load/save |
//!
//! ```bash
//! # Trace list surgery only
//! RUST_LOG=warn,delegate_book::book=debug delegate-book levels
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable with colors
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
    /// Single-line text
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LogConfig {
    /// Filter from `RUST_LOG`, falling back to the configured level
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init_logging(config: &LogConfig) -> bool {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    let result = match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    };
    result.is_ok()
}
