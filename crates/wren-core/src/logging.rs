//! Logging bootstrap.
//!
//! Library code only emits `tracing` events. Applications that want them
//! printed call [`init`] once at startup (requires the `subscriber` feature).
//!
//! Environment:
//! - `WREN_LOG`: an `EnvFilter` directive string (default `warn`).
//! - `WREN_LOG_FORMAT`: `text` (default) or `json`.

use crate::error::{Error, Result};

/// Default filter when `WREN_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// Output format for the global subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse a format name (`text` or `json`, case-insensitive).
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(Error::configuration(format!(
                "unknown log format '{other}' (expected 'text' or 'json')"
            ))),
        }
    }
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    /// Read `WREN_LOG` and `WREN_LOG_FORMAT`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(filter) = get("WREN_LOG").filter(|f| !f.trim().is_empty()) {
            config.filter = filter;
        }
        if let Some(format) = get("WREN_LOG_FORMAT") {
            config.format = LogFormat::parse(&format)?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install a global subscriber writing to stderr.
///
/// Fails with a configuration error if the filter does not parse or a global
/// subscriber is already installed.
#[cfg(feature = "subscriber")]
pub fn init(config: &LogConfig) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| Error::configuration(format!("invalid log filter '{}': {e}", config.filter)))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| Error::configuration(format!("logging already initialized: {e}")))
}
