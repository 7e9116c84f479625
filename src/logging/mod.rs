mod formatters;
mod lifecycle;
mod logger;
mod registry;
mod sinks;
mod strategy;

use std::{fmt::Display, path::PathBuf};

use crate::{config::Config, level::Level};

pub use formatters::DefaultFormatter;
pub use lifecycle::LifecycleState;
pub use logger::{Builder, Logger, Timer};
pub use sinks::ConsoleSink;
pub use strategy::WriteMode;

/// The three metric kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Mark,
    Gauge,
    Time,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Mark => "mark",
            MetricKind::Gauge => "gauge",
            MetricKind::Time => "time",
        }
    }
}

/// Turns events into finished lines. Implementations must be pure and must
/// terminate every line with exactly one `\n`.
pub trait LogFormatter: Sync + Send {
    fn format_log(&self, level: Level, message: &str, config: &Config, target: &Target) -> String;
    fn format_metric(&self, kind: MetricKind, name: &str, value: f64, config: &Config) -> String;
}

pub trait LogSink: Sync + Send {
    fn write_line(&self, line: &str) -> eyre::Result<()>;
    fn flush(&self) -> eyre::Result<()>;
}

/// Event category, one file per category when a directory is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Error,
    Info,
    Debug,
    Metrics,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Error => "error",
            Category::Info => "info",
            Category::Debug => "debug",
            Category::Metrics => "metrics",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.log", self.as_str())
    }
}

impl From<Level> for Category {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => Category::Error,
            Level::Info => Category::Info,
            Level::Debug => Category::Debug,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Console,
    File(PathBuf),
}

impl Target {
    /// Same (category, config) always resolves to the same target, which is
    /// what lets the registry reuse handles.
    pub fn resolve(category: Category, config: &Config) -> Self {
        match &config.dir {
            Some(dir) => Target::File(dir.join(category.file_name())),
            None => Target::Console,
        }
    }

    pub fn is_console(&self) -> bool {
        matches!(self, Target::Console)
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Console => write!(f, "console"),
            Target::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::Options;

    #[test]
    fn no_dir_resolves_to_console() {
        let config = Options::new().build().unwrap();

        for category in [
            Category::Error,
            Category::Info,
            Category::Debug,
            Category::Metrics,
        ] {
            assert_eq!(Target::resolve(category, &config), Target::Console);
        }
    }

    #[test]
    fn dir_resolves_to_category_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Options::new().dir(tmp.path()).build().unwrap();

        let target = Target::resolve(Category::Metrics, &config);

        assert_eq!(target, Target::File(tmp.path().join("metrics.log")));
        assert_eq!(target, Target::resolve(Category::Metrics, &config));
    }

    #[test]
    fn level_maps_onto_its_category() {
        assert_eq!(Category::from(Level::Debug).file_name(), "debug.log");
        assert_eq!(
            Path::new(&Category::from(Level::Error).file_name()),
            Path::new("error.log")
        );
    }
}
