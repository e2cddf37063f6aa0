use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::app_dirs::AppDirs;
use crate::problem::Operation;
use crate::session::GameMode;

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 3;

/// Pre-game defaults shown on the menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub game_mode: GameMode,
    pub operation: Operation,
    pub level: u32,
    /// Redraw interval for the terminal UI
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game_mode: GameMode::Single,
            operation: Operation::Addition,
            level: MIN_LEVEL,
            tick_rate_ms: 100,
        }
    }
}

impl Config {
    /// Pull out-of-range values back into something playable.
    pub fn sanitized(mut self) -> Self {
        self.level = self.level.clamp(MIN_LEVEL, MAX_LEVEL);
        if self.tick_rate_ms == 0 {
            self.tick_rate_ms = Config::default().tick_rate_ms;
        }
        self
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config not found at {0}")]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait ConfigStore {
    fn load(&self) -> Result<Config, ConfigError>;

    /// Load, falling back to defaults when the file is missing or broken.
    fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(cfg) => cfg.sanitized(),
            Err(ConfigError::NotFound(_)) => Config::default(),
            Err(err) => {
                tracing::warn!("using default config: {err}");
                Config::default()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("tugmath_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::NotFound(self.path.clone()));
        }
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice::<Config>(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        assert_matches!(store.load(), Err(ConfigError::NotFound(_)));
        assert_eq!(store.load_or_default(), Config::default());
    }

    #[test]
    fn load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"game_mode":"two-player","operation":"division","level":2,"tick_rate_ms":50}"#,
        )
        .unwrap();
        let store = FileConfigStore::with_path(&path);
        let cfg = store.load().unwrap();
        assert_eq!(
            cfg,
            Config {
                game_mode: GameMode::TwoPlayer,
                operation: Operation::Division,
                level: 2,
                tick_rate_ms: 50,
            }
        );
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"level":3}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load().unwrap();
        assert_eq!(cfg.level, 3);
        assert_eq!(cfg.operation, Operation::Addition);
    }

    #[test]
    fn unknown_operation_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"operation":"modulo"}"#).unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_matches!(store.load(), Err(ConfigError::Serde(_)));
        assert_eq!(store.load_or_default(), Config::default());
    }

    #[test]
    fn level_is_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"level":9,"tick_rate_ms":0}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load_or_default();
        assert_eq!(cfg.level, MAX_LEVEL);
        assert_eq!(cfg.tick_rate_ms, 100);
    }
}
