use std::path::PathBuf;

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("no 'latest' symlink found in {0}")]
    NoLatestSymlink(PathBuf),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to save model: {0}")]
    ModelSave(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("checkpoint at {path} was trained with symmetric = {found}, config has symmetric = {expected}")]
    SeatLayoutMismatch {
        path: PathBuf,
        expected: bool,
        found: bool,
    },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_error_display() {
        let err = CheckpointError::NoLatestSymlink(PathBuf::from("checkpoints"));
        assert_eq!(
            err.to_string(),
            "no 'latest' symlink found in checkpoints"
        );
    }

    #[test]
    fn test_training_error_display() {
        let err = TrainingError::SeatLayoutMismatch {
            path: PathBuf::from("checkpoints/checkpoint_000000100"),
            expected: false,
            found: true,
        };
        assert_eq!(
            err.to_string(),
            "checkpoint at checkpoints/checkpoint_000000100 was trained with symmetric = true, config has symmetric = false"
        );
    }

    #[test]
    fn test_training_error_wraps_config_error() {
        let err: TrainingError = ConfigError::Validation("dqn.batch_size must be > 0".into()).into();
        assert_eq!(
            err.to_string(),
            "configuration error: config validation error: dqn.batch_size must be > 0"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("learning_rate must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: learning_rate must be > 0"
        );
    }
}
