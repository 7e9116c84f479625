use std::{fmt::Display, str::FromStr};

/// Log severity. Lower index is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Error,
    Info,
    Debug,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Error, Level::Info, Level::Debug];

    pub fn index(self) -> usize {
        match self {
            Level::Error => 0,
            Level::Info => 1,
            Level::Debug => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    /// Lenient lookup used for configured thresholds: anything unrecognized
    /// yields `None`, which means "no filtering".
    pub fn parse(value: &str) -> Option<Level> {
        value.parse().ok()
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Level {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Level::Error),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            other => Err(eyre::eyre!("Unknown log level {}", other)),
        }
    }
}

/// Level filter: a call at `level` proceeds iff its index does not exceed the
/// threshold's index. An absent threshold admits everything.
pub fn admits(threshold: Option<Level>, level: Level) -> bool {
    let max_index = threshold.map_or(usize::MAX, Level::index);
    level.index() <= max_index
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error | log::Level::Warn => Level::Error,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}
