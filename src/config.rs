use std::path::Path;

use crate::ai::algorithms::DqnConfig;
use crate::checkpoint::CheckpointManagerConfig;
use crate::error::ConfigError;
use crate::training::trainer::TrainerConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dqn: DqnConfig,
    pub training: TrainerConfig,
    pub checkpoint: CheckpointManagerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Number of plies played before the first update.
    pub fn warmup_plies(&self) -> usize {
        self.training
            .warmup_plies
            .unwrap_or(2 * self.dqn.replay_capacity)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dqn.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(
                "dqn.learning_rate must be > 0".into(),
            ));
        }
        if self.dqn.gamma < 0.0 || self.dqn.gamma > 1.0 {
            return Err(ConfigError::Validation(
                "dqn.gamma must be in [0, 1]".into(),
            ));
        }
        if self.dqn.epsilon < 0.0 || self.dqn.epsilon > 1.0 {
            return Err(ConfigError::Validation(
                "dqn.epsilon must be in [0, 1]".into(),
            ));
        }
        if self.dqn.batch_size == 0 {
            return Err(ConfigError::Validation(
                "dqn.batch_size must be > 0".into(),
            ));
        }
        if self.dqn.replay_capacity == 0 {
            return Err(ConfigError::Validation(
                "dqn.replay_capacity must be > 0".into(),
            ));
        }
        if self.dqn.sync_every == 0 {
            return Err(ConfigError::Validation(
                "dqn.sync_every must be > 0".into(),
            ));
        }
        if self.dqn.hidden_layers == 0 {
            return Err(ConfigError::Validation(
                "dqn.hidden_layers must be >= 1".into(),
            ));
        }
        if self.dqn.units == 0 {
            return Err(ConfigError::Validation(
                "dqn.units must be >= 1".into(),
            ));
        }

        if self.training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be > 0".into(),
            ));
        }
        if self.training.checkpoint_interval == 0 {
            return Err(ConfigError::Validation(
                "training.checkpoint_interval must be > 0".into(),
            ));
        }
        if self.checkpoint.keep_last_n == 0 {
            return Err(ConfigError::Validation(
                "checkpoint.keep_last_n must be >= 1".into(),
            ));
        }

        // Both seats need a recorded transition before the first update.
        if self.training.steps > 0 && self.warmup_plies() < 4 {
            return Err(ConfigError::Validation(
                "training.warmup_plies must be >= 4 when training.steps > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
