use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use eyre::Context;

use crate::level::Level;

/// Immutable settings snapshot read by every write.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub name: String,
    pub colors: bool,
    pub metrics: bool,
    pub dir: Option<PathBuf>,
    pub level: Option<Level>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: host_name(),
            colors: true,
            metrics: true,
            dir: None,
            level: None,
        }
    }
}

/// Options accepted by `reconfigure`. Anything left unset falls back to the
/// defaults, never to the previously active configuration.
#[derive(Debug, Clone, Default)]
pub struct Options {
    colors: Option<bool>,
    metrics: Option<bool>,
    name: Option<String>,
    dir: Option<PathBuf>,
    level: Option<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colors(self, colors: bool) -> Self {
        Self {
            colors: Some(colors),
            ..self
        }
    }

    pub fn metrics(self, metrics: bool) -> Self {
        Self {
            metrics: Some(metrics),
            ..self
        }
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    pub fn dir(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..self
        }
    }

    pub fn level(self, level: impl AsRef<str>) -> Self {
        Self {
            level: Some(level.as_ref().to_string()),
            ..self
        }
    }

    /// Builds a fresh snapshot, validating (and creating) the output directory.
    pub fn build(self) -> eyre::Result<Config> {
        let dir = match self.dir {
            Some(dir) => Some(prepare_dir(&dir)?),
            None => None,
        };

        Ok(Config {
            name: self.name.unwrap_or_else(host_name),
            colors: self.colors.unwrap_or(true),
            metrics: self.metrics.unwrap_or(true),
            dir,
            level: self.level.as_deref().and_then(Level::parse),
        })
    }
}

fn prepare_dir(dir: &Path) -> eyre::Result<PathBuf> {
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Can't resolve current working directory")?
            .join(dir)
    };

    if dir.exists() && !dir.is_dir() {
        return Err(eyre::eyre!(
            "Log directory {} exists but is not a directory",
            dir.display()
        ));
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed creating log directory {}", dir.display()))?;

    Ok(dir)
}

// NOTE: HOSTNAME is not exported by every shell, hence the /etc/hostname fallback.
pub fn host_name() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        if !name.trim().is_empty() {
            return name.trim().to_string();
        }
    }

    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Process-wide, replaceable configuration. Readers always observe a whole
/// snapshot; a swap never exposes a partially applied update.
#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Arc<Config>>,
}

impl ConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub fn snapshot(&self) -> Arc<Config> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    pub fn replace(&self, config: Config) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(config);
    }
}
