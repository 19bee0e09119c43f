//! Configuration for querybar editors.
//!
//! QUERYBAR_ROOT resolution order:
//! 1. Explicit path passed to Config::with_root()
//! 2. QUERYBAR_ROOT environment variable
//! 3. Default: platform data directory (~/.local/share/querybar)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding config.toml and persisted editor data.
    #[serde(skip)]
    pub root: PathBuf,

    /// How many recently used filter keys to remember.
    #[serde(default = "default_recent_keys_limit")]
    pub recent_keys_limit: usize,

    /// Skip the operator and value parts of non-filter tokens when moving focus.
    #[serde(default = "default_skip_inert_parts")]
    pub skip_inert_parts: bool,

    /// Refuse to commit typed text that would produce free-text tokens.
    #[serde(default)]
    pub disallow_free_text: bool,
}

fn default_recent_keys_limit() -> usize {
    10
}

fn default_skip_inert_parts() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self::with_root(PathBuf::new())
    }
}

impl Config {
    /// Create a new config with the given root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recent_keys_limit: default_recent_keys_limit(),
            skip_inert_parts: default_skip_inert_parts(),
            disallow_free_text: false,
        }
    }

    /// Load config from QUERYBAR_ROOT/config.toml, or create default.
    pub fn load() -> Result<Self> {
        let root = resolve_root()?;
        Self::load_from(&root)
    }

    /// Load config from a specific root.
    pub fn load_from(root: &Path) -> Result<Self> {
        let config_path = root.join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
            config.root = root.to_path_buf();
            tracing::debug!(path = %config_path.display(), "Loaded config");
            Ok(config)
        } else {
            Ok(Self::with_root(root))
        }
    }

    /// Save config to QUERYBAR_ROOT/config.toml.
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(self.config_path(), contents)?;
        Ok(())
    }

    /// Path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Path to the persisted recent filter keys.
    pub fn recent_keys_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", crate::recent::RECENT_KEYS_STORAGE_KEY))
    }
}

/// Resolve QUERYBAR_ROOT using the standard resolution order.
fn resolve_root() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("QUERYBAR_ROOT") {
        return Ok(PathBuf::from(path));
    }

    if let Some(proj_dirs) = ProjectDirs::from("", "", "querybar") {
        return Ok(proj_dirs.data_dir().to_path_buf());
    }

    let home = std::env::var("HOME")
        .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;
    Ok(PathBuf::from(home).join(".local/share/querybar"))
}
