// src/session/mod.rs

//! Per-run artifact directories.
//!
//! Each run gets `<base>/<YYYYMMDD-HHMMSS>/` containing `session.json`
//! (written when the session is created) plus `stdout.log` / `stderr.log`
//! (written once the streams have been drained).

pub mod manager;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use manager::SessionManager;

pub const STDOUT_LOG: &str = "stdout.log";
pub const STDERR_LOG: &str = "stderr.log";
pub const METADATA_FILE: &str = "session.json";

/// One run's artifact directory. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    root: PathBuf,
    started_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(root: PathBuf, started_at: DateTime<Utc>) -> Self {
        Self { root, started_at }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn stdout_path(&self) -> PathBuf {
        self.root.join(STDOUT_LOG)
    }

    pub fn stderr_path(&self) -> PathBuf {
        self.root.join(STDERR_LOG)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }
}

/// Contents of `session.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub command: String,
    pub config: Option<String>,
    pub extra_args: Vec<String>,
    pub working_dir: String,
    /// Request overrides only, not the merged process environment.
    pub environment: BTreeMap<String, String>,
    /// RFC 3339 timestamp.
    pub started_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_live_under_root() {
        let session = Session::new(PathBuf::from("/tmp/logs/20240101-120000"), Utc::now());

        assert_eq!(
            session.stdout_path(),
            PathBuf::from("/tmp/logs/20240101-120000/stdout.log")
        );
        assert_eq!(
            session.stderr_path(),
            PathBuf::from("/tmp/logs/20240101-120000/stderr.log")
        );
        assert_eq!(
            session.metadata_path(),
            PathBuf::from("/tmp/logs/20240101-120000/session.json")
        );
    }

    #[test]
    fn absent_config_serializes_as_null() {
        let meta = SessionMetadata {
            command: "lerobot-find-port".into(),
            config: None,
            extra_args: vec![],
            working_dir: "/w".into(),
            environment: BTreeMap::new(),
            started_at: "2024-01-01T12:00:00+00:00".into(),
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert!(value["config"].is_null());
        assert_eq!(value["extra_args"], serde_json::json!([]));
    }
}
