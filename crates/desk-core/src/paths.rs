//! File system paths for the desk client.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths for the desk client.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for client files (~/.desk)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance.
    ///
    /// Uses `DESK_CONFIG_DIR` when set, otherwise `~/.desk`.
    pub fn new() -> CoreResult<Self> {
        if let Ok(dir) = std::env::var("DESK_CONFIG_DIR") {
            return Ok(Self {
                base_dir: PathBuf::from(dir),
            });
        }

        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".desk"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.desk).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.desk/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }
}
