use super::consts::LOG_LINE_PATTERN_COLORED;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        Append,
    },
    config::Appender,
    encode::pattern::PatternEncoder,
};

pub(super) struct AppenderSpec {
    pub name: &'static str,
    append: Box<dyn Append>,
}

impl AppenderSpec {
    /// Colored console appender. Log lines go to stderr so that command
    /// output on stdout stays machine readable.
    pub fn console(name: &'static str) -> Self {
        Self::new(
            name,
            Box::new(
                ConsoleAppender::builder().target(Target::Stderr).encoder(Box::new(PatternEncoder::new(LOG_LINE_PATTERN_COLORED))).build(),
            ),
        )
    }

    pub fn new(name: &'static str, append: Box<dyn Append>) -> Self {
        Self { name, append }
    }

    pub fn appender(self) -> Appender {
        Appender::builder().build(self.name, self.append)
    }
}
