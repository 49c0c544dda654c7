use log::LevelFilter;
use log4rs::config::Logger;
use std::{collections::BTreeMap, mem, str::FromStr};
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LogError {
    #[error("Logger spec parsing error: {0}")]
    ParseLoggerSpecError(String),

    #[error("Logger configuration error: {0}")]
    ConfigError(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct LoggerSpec {
    pub name: String,
    pub level: LevelFilter,
}

impl LoggerSpec {
    pub fn new(name: String, level: LevelFilter) -> Self {
        Self { name, level }
    }

    /// Module logger writing through the root appenders.
    pub fn logger(&self) -> Logger {
        Logger::builder().build(self.name.clone(), self.level)
    }
}

pub(super) struct Loggers {
    loggers: Vec<LoggerSpec>,
    root_level: LevelFilter,
}

impl Loggers {
    pub fn root_level(&self) -> LevelFilter {
        self.root_level
    }

    #[cfg(test)]
    pub fn specs(&self) -> &[LoggerSpec] {
        &self.loggers
    }

    pub fn items(&self) -> impl IntoIterator<Item = Logger> + '_ {
        self.loggers.iter().map(|x| x.logger())
    }
}

/// Collects a root level and per-module levels from filter expressions such
/// as `info,hdkeys_bip32=trace`.
pub(super) struct Builder {
    loggers: BTreeMap<String, LevelFilter>,
    root_level: Option<LevelFilter>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder { loggers: BTreeMap::new(), root_level: None }
    }

    /// Initializes the builder from a specs expression.
    pub fn from_expression(expression: &str) -> Result<Self, LogError> {
        let mut builder = Self::new();
        builder.parse_expression(expression)?;
        Ok(builder)
    }

    pub fn parse_expression(&mut self, expression: &str) -> Result<&mut Self, LogError> {
        for spec in expression.split(',').map(|x| x.trim()) {
            if spec.is_empty() {
                continue;
            }
            let mut parts = spec.split('=');
            let (log_level, name) = match (parts.next(), parts.next().map(|x| x.trim()), parts.next()) {
                (Some(part0), None, None) => {
                    // a single level string or number defines the root level
                    match part0.parse() {
                        Ok(lvl) => (lvl, None),
                        Err(_) => (LevelFilter::max(), Some(part0)),
                    }
                }
                (Some(part0), Some(""), None) => (LevelFilter::max(), Some(part0)),
                (Some(part0), Some(part1), None) => match part1.parse() {
                    Ok(lvl) => (lvl, Some(part0)),
                    Err(_) => return Err(LogError::ParseLoggerSpecError(spec.to_string())),
                },
                _ => return Err(LogError::ParseLoggerSpecError(spec.to_string())),
            };
            match name {
                Some(name) => {
                    self.logger(name.trim().to_string(), log_level);
                }
                None => {
                    self.root_level(log_level);
                }
            }
        }
        Ok(self)
    }

    pub fn root_level(&mut self, root_level: LevelFilter) -> &mut Self {
        self.root_level.replace(root_level);
        self
    }

    pub fn logger(&mut self, name: String, level: LevelFilter) -> &mut Self {
        self.loggers.insert(name, level);
        self
    }

    pub fn build(&mut self) -> Loggers {
        let loggers_map = mem::take(&mut self.loggers);
        let loggers = loggers_map.into_iter().map(|(name, level)| LoggerSpec::new(name, level)).collect::<Vec<_>>();
        Loggers { loggers, root_level: self.root_level.take().unwrap_or(LevelFilter::Error) }
    }
}

impl FromStr for Builder {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_expression(s)
    }
}
