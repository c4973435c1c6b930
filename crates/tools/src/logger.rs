//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup. Logs go to stderr so exported
//! configuration on stdout stays machine-readable.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log level when no `-v` flag is given.
pub const LOG_LEVEL_ENV: &str = "CHAINCONF_LOG_LEVEL";

pub const DEFAULT_LEVEL: &str = "warn";

#[derive(Debug, thiserror::Error)]
#[error("logger error: {0}")]
pub struct LoggerError(String);

/// Map `-v` occurrences to a level. Zero means "not given".
pub fn level_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Initialise the global tracing subscriber.
///
/// A `level` from the command line wins. Otherwise [`LOG_LEVEL_ENV`], then
/// `RUST_LOG`, then [`DEFAULT_LEVEL`] are tried in turn. `level` and
/// [`LOG_LEVEL_ENV`] take a single level; `RUST_LOG` keeps the full
/// directive syntax.
pub fn init(level: Option<&str>) -> Result<(), LoggerError> {
    let level = match level {
        Some(level) => Some(level.to_string()),
        None => std::env::var(LOG_LEVEL_ENV).ok(),
    };
    let filter = match level {
        Some(level) => EnvFilter::default().add_directive(parse_level(&level)?.into()),
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(DEFAULT_LEVEL))
            .map_err(|e| LoggerError(e.to_string()))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| LoggerError(format!("failed to set subscriber: {e}")))
}

/// Parse a single level name such as `info` or `debug`.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    let level = level.trim();
    if level.is_empty() {
        return Err(LoggerError(format!("{LOG_LEVEL_ENV} must not be empty")));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| LoggerError(format!("unrecognised log level: '{level}'")))
}
