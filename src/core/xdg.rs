//! XDG Base Directory support.
//!
//! Resolves where tessera looks for its config file and where index
//! snapshots are written.

use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "tessera";

/// Snapshot file name inside the data directory
pub const SNAPSHOT_FILE: &str = "index.json";

/// XDG directory structure for tessera
#[derive(Debug, Clone)]
pub struct XdgDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl XdgDirs {
    /// Resolve directories
    ///
    /// Priority order (highest to lowest):
    /// 1. Explicit TESSERA_* env vars
    /// 2. XDG_* environment variables
    /// 3. XDG defaults (~/.config, ~/.local/share)
    pub fn new() -> Self {
        Self {
            config_dir: resolve("TESSERA_CONFIG_DIR", "XDG_CONFIG_HOME", &[".config"]),
            data_dir: resolve("TESSERA_DATA_DIR", "XDG_DATA_HOME", &[".local", "share"]),
        }
    }

    /// Get config file path
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Default snapshot location
    pub fn snapshot_file(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    /// Create config and data directories if they don't exist
    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    /// Log the resolved XDG paths
    pub fn log_paths(&self) {
        tracing::info!("XDG directories resolved:");
        tracing::info!("  Config: {:?}", self.config_dir);
        tracing::info!("  Data: {:?}", self.data_dir);
        tracing::info!("  Config file: {:?}", self.config_file());
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve(explicit_var: &str, xdg_var: &str, home_fallback: &[&str]) -> PathBuf {
    if let Ok(dir) = env::var(explicit_var) {
        return PathBuf::from(dir);
    }

    if let Ok(xdg) = env::var(xdg_var) {
        return PathBuf::from(xdg).join(APP_DIR);
    }

    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    for part in home_fallback {
        path.push(part);
    }
    path.join(APP_DIR)
}
