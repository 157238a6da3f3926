use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Namespace used to derive category and action identifiers
pub const DEFAULT_NAMESPACE: &str = "local_notifier";

/// Get the local-notifier home directory (~/.local_notifier)
///
/// `LOCAL_NOTIFIER_HOME` overrides the location.
pub fn home_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("LOCAL_NOTIFIER_HOME") {
        return PathBuf::from(home);
    }
    dirs::home_dir()
        .expect("Could not determine home directory")
        .join(".local_notifier")
}

/// Default socket the daemon listens on
pub fn socket_path() -> PathBuf {
    home_dir().join("daemon.sock")
}

/// Log file written by `daemon --log-file`
pub fn log_path() -> PathBuf {
    home_dir().join("daemon.log")
}

pub fn config_path() -> PathBuf {
    home_dir().join("config.json")
}

pub fn ensure_home_dir() -> Result<()> {
    let home = home_dir();
    fs::create_dir_all(&home)
        .with_context(|| format!("Failed to create home directory {:?}", home))
}

/// Settings read from config.json
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix for the per-notification category identifiers
    pub namespace: String,

    /// Socket path override
    pub socket: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            socket: None,
        }
    }
}

impl Config {
    /// Load from the default config path, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    pub fn socket_path(&self) -> PathBuf {
        self.socket.clone().unwrap_or_else(socket_path)
    }
}
