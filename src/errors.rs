// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),

    #[error("Config path does not exist: {0:?}")]
    ConfigNotFound(PathBuf),

    #[error("Working directory does not exist: {0:?}")]
    WorkingDirNotFound(PathBuf),

    #[error("Working directory must be a directory: {0:?}")]
    WorkingDirNotADirectory(PathBuf),

    #[error("A LeRobot process is already running")]
    AlreadyRunning,

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Run worker ended without reporting an outcome")]
    WorkerGone,

    #[error("Job file error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RunnerError {
    /// True for the errors raised by request validation, before any session
    /// directory exists or any process is spawned.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RunnerError::UnsupportedCommand(_)
                | RunnerError::ConfigNotFound(_)
                | RunnerError::WorkingDirNotFound(_)
                | RunnerError::WorkingDirNotADirectory(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
