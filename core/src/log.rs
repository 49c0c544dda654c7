//! Logger initialization over `log4rs`.
//!
//! Library crates log through the `log` facade only; binaries call
//! [`init_logger`] once at startup.

mod appender;
mod consts;
mod logger;

pub use consts::{DEFAULT_LOGGER_ENV, DEFAULT_LOG_FILTER};
pub use logger::LogError;

use appender::AppenderSpec;
use consts::CONSOLE_APPENDER;
use log4rs::config::{Config, Root};
use logger::{Builder, Loggers};
use std::env;

/// Install the console logger.
///
/// Levels start at [`DEFAULT_LOG_FILTER`], then the `RUST_LOG` environment
/// variable is applied, then `filters` (an expression such as
/// `info,hdkeys_bip32=trace`) when the caller was given one.
pub fn init_logger(filters: Option<&str>) -> Result<(), LogError> {
    let loggers = build_loggers(&env::var(DEFAULT_LOGGER_ENV).unwrap_or_default(), filters)?;

    let stdout_appender = AppenderSpec::console(CONSOLE_APPENDER);
    let appenders = [stdout_appender.name];

    let config = Config::builder()
        .appender(stdout_appender.appender())
        .loggers(loggers.items())
        .build(Root::builder().appenders(appenders).build(loggers.root_level()))
        .map_err(|err| LogError::ConfigError(err.to_string()))?;

    log4rs::init_config(config).map_err(|err| LogError::ConfigError(err.to_string()))?;
    Ok(())
}

fn build_loggers(env_expression: &str, filters: Option<&str>) -> Result<Loggers, LogError> {
    let mut builder = Builder::from_expression(DEFAULT_LOG_FILTER)?;
    builder.parse_expression(env_expression)?;
    if let Some(filters) = filters {
        builder.parse_expression(filters)?;
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn test_default_level() {
        let loggers = build_loggers("", None).unwrap();
        assert_eq!(loggers.root_level(), LevelFilter::Info);
        assert!(loggers.specs().is_empty());
    }

    #[test]
    fn test_env_applies_without_filters() {
        let loggers = build_loggers("debug,hdkeys_bip32=trace", None).unwrap();
        assert_eq!(loggers.root_level(), LevelFilter::Debug);
        assert_eq!(loggers.specs()[0].level, LevelFilter::Trace);
    }

    #[test]
    fn test_filters_override_env() {
        let loggers = build_loggers("debug,hdkeys_bip32=trace", Some("warn")).unwrap();
        assert_eq!(loggers.root_level(), LevelFilter::Warn);
        assert_eq!(loggers.specs()[0].level, LevelFilter::Trace);

        let loggers = build_loggers("debug", Some("hdkeys=error")).unwrap();
        assert_eq!(loggers.root_level(), LevelFilter::Debug);
        assert_eq!(loggers.specs()[0].level, LevelFilter::Error);
    }

    #[test]
    fn test_invalid_env_expression() {
        assert!(matches!(build_loggers("hdkeys=loud", None), Err(LogError::ParseLoggerSpecError(_))));
    }
}
