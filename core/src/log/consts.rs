pub const DEFAULT_LOGGER_ENV: &str = "RUST_LOG";

/// Filter expression used when neither the command line nor the environment provides one
pub const DEFAULT_LOG_FILTER: &str = "info";

pub const CONSOLE_APPENDER: &str = "stdout";

/// Console (stdout) log line pattern, with explicit UTC time zone denoted by the suffix Z
pub const LOG_LINE_PATTERN_COLORED: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)}Z [{h({({l}):5.5})}] {m}{n}";
