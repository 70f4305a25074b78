use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{CfError, Result};

const DEFAULT_DIRECTIVES: &str = "info";

/// Installs the global `fmt` subscriber.
///
/// A non-empty `level` from the config wins; otherwise `RUST_LOG` is used,
/// and without either the subscriber logs at `info`.
pub fn init_logging(level: &str) -> Result<()> {
    let directives = filter_directives(level, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(&directives)
        .map_err(|e| CfError::Config(format!("invalid log level '{}': {}", directives, e)))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|_| CfError::Config("logging already initialized".to_string()))
}

fn filter_directives(level: &str, rust_log: Option<String>) -> String {
    let level = level.trim();
    if !level.is_empty() {
        return level.to_string();
    }
    match rust_log {
        Some(rust_log) if !rust_log.trim().is_empty() => rust_log,
        _ => DEFAULT_DIRECTIVES.to_string(),
    }
}
