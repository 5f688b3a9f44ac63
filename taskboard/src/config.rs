//! Engine configuration loaded through Figment
//!
//! Sources in precedence order (later overrides earlier):
//! 1. Built-in defaults
//! 2. `taskboard.toml`, `taskboard.yaml`/`.yml` or `taskboard.json` in the
//!    configuration directory (the current directory unless given)
//! 3. `TASKBOARD_*` environment variables, e.g. `TASKBOARD_LOCK_TIMEOUT_MS=2000`

use crate::error::{BoardError, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TASKBOARD_";

/// Configuration file stem searched for in the configuration directory
pub const CONFIG_FILE_STEM: &str = "taskboard";

/// Where newly created columns and tasks land among their siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Append after the last sibling
    #[default]
    End,
    /// Insert at position 0, shifting every sibling down
    Start,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// How long a mutation waits for the board lock before failing with a conflict
    pub lock_timeout_ms: u64,
    /// Poll interval for lock backends without a wait queue (the file store)
    pub lock_retry_interval_ms: u64,
    /// Buffered events per board topic before slow subscribers lag
    pub broadcast_capacity: usize,
    /// How many times the processor retries an operation that hit a conflict
    pub max_conflict_retries: u32,
    /// Placement of newly created columns and tasks
    pub new_item_placement: Placement,
    /// Maximum title length in characters
    pub max_title_len: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5_000,
            lock_retry_interval_ms: 10,
            broadcast_capacity: 256,
            max_conflict_retries: 3,
            new_item_placement: Placement::End,
            max_title_len: 255,
        }
    }
}

impl BoardConfig {
    /// Load from defaults, the current directory and the environment
    pub fn load() -> Result<Self> {
        let dir = std::env::current_dir()?;
        Self::load_from_dir(dir)
    }

    /// Load from defaults, config files in `dir` and the environment
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let config: Self = Self::figment(dir.as_ref()).extract()?;
        config.validate()?;
        debug!(?config, "loaded board configuration");
        Ok(config)
    }

    /// Build the layered figment for `dir`
    pub fn figment(dir: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        for ext in ["toml", "yaml", "yml", "json"] {
            let path = dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));
            if !path.is_file() {
                continue;
            }
            trace!("loading config file: {}", path.display());
            figment = match ext {
                "toml" => figment.merge(Toml::file(&path)),
                "json" => figment.merge(Json::file(&path)),
                _ => figment.merge(Yaml::file(&path)),
            };
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.lock_timeout_ms == 0 {
            return Err(BoardError::config("lock_timeout_ms must be greater than 0"));
        }
        if self.lock_retry_interval_ms == 0 {
            return Err(BoardError::config(
                "lock_retry_interval_ms must be greater than 0",
            ));
        }
        if self.broadcast_capacity == 0 {
            return Err(BoardError::config("broadcast_capacity must be greater than 0"));
        }
        if self.max_title_len == 0 {
            return Err(BoardError::config("max_title_len must be greater than 0"));
        }
        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn lock_retry_interval(&self) -> Duration {
        Duration::from_millis(self.lock_retry_interval_ms)
    }

    pub fn with_lock_timeout_ms(mut self, ms: u64) -> Self {
        self.lock_timeout_ms = ms;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.new_item_placement = placement;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_defaults_without_files() {
        let temp = TempDir::new().unwrap();
        let config = BoardConfig::load_from_dir(temp.path()).unwrap();
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.new_item_placement, Placement::End);
    }

    #[test]
    #[serial]
    fn test_toml_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("taskboard.toml"),
            "lock_timeout_ms = 250\nnew_item_placement = \"start\"\n",
        )
        .unwrap();

        let config = BoardConfig::load_from_dir(temp.path()).unwrap();
        assert_eq!(config.lock_timeout_ms, 250);
        assert_eq!(config.new_item_placement, Placement::Start);
        assert_eq!(config.broadcast_capacity, 256);
    }

    #[test]
    #[serial]
    fn test_yaml_file_is_read() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("taskboard.yaml"), "max_title_len: 80\n").unwrap();

        let config = BoardConfig::load_from_dir(temp.path()).unwrap();
        assert_eq!(config.max_title_len, 80);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("taskboard.json"), r#"{"max_conflict_retries": 1}"#).unwrap();

        std::env::set_var("TASKBOARD_MAX_CONFLICT_RETRIES", "7");
        let config = BoardConfig::load_from_dir(temp.path());
        std::env::remove_var("TASKBOARD_MAX_CONFLICT_RETRIES");

        assert_eq!(config.unwrap().max_conflict_retries, 7);
    }

    #[test]
    #[serial]
    fn test_invalid_value_rejected() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("taskboard.toml"), "broadcast_capacity = 0\n").unwrap();

        let err = BoardConfig::load_from_dir(temp.path()).unwrap_err();
        assert!(matches!(err, BoardError::Config { .. }));
    }

    #[test]
    #[serial]
    fn test_malformed_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("taskboard.toml"), "lock_timeout_ms = \"soon\"\n").unwrap();

        let err = BoardConfig::load_from_dir(temp.path()).unwrap_err();
        assert!(matches!(err, BoardError::Config { .. }));
    }
}
