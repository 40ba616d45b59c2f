//! Diagnostic logging to stderr.
//!
//! The level comes from `$TALLY_LOG` (`error`, `warn`, `info`, `debug`,
//! `trace`, or any flexi_logger spec such as `tally=debug`) and defaults to
//! `warn`. Durable diagnostics belong in the recovery log, not here.

use std::sync::OnceLock;

use flexi_logger::{Logger, LoggerHandle};

pub const LOG_ENV: &str = "TALLY_LOG";
pub const DEFAULT_LEVEL: &str = "warn";

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Start the stderr logger. Safe to call more than once; only the first
/// call has an effect. Failure to start is reported and otherwise ignored.
pub fn init_logging() {
    if LOGGER.get().is_some() {
        return;
    }
    let spec = level_spec(std::env::var(LOG_ENV).ok().as_deref());
    match start(&spec) {
        Ok(handle) => {
            let _ = LOGGER.set(handle);
        }
        Err(e) => eprintln!("warning: logging disabled: {}", e),
    }
}

fn start(spec: &str) -> Result<LoggerHandle, flexi_logger::FlexiLoggerError> {
    Logger::try_with_str(spec)
        .or_else(|_| Logger::try_with_str(DEFAULT_LEVEL))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
}

/// The logger spec to use for a raw `$TALLY_LOG` value.
fn level_spec(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => DEFAULT_LEVEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_defaults_to_warn() {
        assert_eq!(level_spec(None), "warn");
        assert_eq!(level_spec(Some("")), "warn");
        assert_eq!(level_spec(Some("  ")), "warn");
    }

    #[test]
    fn level_from_env_value() {
        assert_eq!(level_spec(Some("debug")), "debug");
        assert_eq!(level_spec(Some(" tally=trace ")), "tally=trace");
    }
}
