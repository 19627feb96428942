//! Structured logging setup
//!
//! Diagnostics go through `tracing` and are written to stderr, leaving stdout
//! for the per-file report lines. The default level is `warn`, so a normal
//! run prints nothing but the report.
//!
//! # Example
//!
//! ```no_run
//! use addpostbuild::util::logging;
//!
//! logging::init_logging(logging::config_from_env());
//!
//! tracing::debug!(path = "App.csproj", "Checking project");
//! ```

use crate::config::{DEFAULT_LOG_LEVEL, LOG_JSON_ENV, LOG_LEVEL_ENV};
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g. addpostbuild::locator) in logs
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            use_json: false,
            include_target: true,
        }
    }
}

/// Parses a log level from a string, falling back to WARN
///
/// ```
/// use addpostbuild::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("INFO"), Level::INFO);
/// assert_eq!(parse_level("invalid"), Level::WARN);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to WARN. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::WARN
        }
    }
}

/// Initializes the `tracing` subscriber. Later calls are ignored.
///
/// `RUST_LOG` directives are honored on top of the configured level.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let directive = format!("{}={}", env!("CARGO_CRATE_NAME"), config.level);
        let filter = match directive.parse() {
            Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
            Err(_) => EnvFilter::from_default_env(),
        };

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

/// Reads `ADDPOSTBUILD_LOG_LEVEL` and `ADDPOSTBUILD_LOG_JSON`
pub fn config_from_env() -> LoggingConfig {
    let level_str = env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

    let use_json = env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    LoggingConfig {
        level: parse_level(&level_str),
        use_json,
        ..Default::default()
    }
}
