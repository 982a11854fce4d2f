// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{JobFile, RawJobFile};
use crate::errors::{Result, RunnerError};

/// Load a job file from a given path and return the raw `RawJobFile`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] to get
/// a `JobFile` with resolved paths.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawJobFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| RunnerError::Config(format!("reading job file at {path:?}: {e}")))?;

    Ok(toml::from_str(&contents)?)
}

/// Load a job file and resolve it relative to its own directory.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<JobFile> {
    let path = path.as_ref();
    let raw = load_from_path(path)?;
    JobFile::resolve(raw, &job_root_dir(path))
}

/// Job file looked up when `--job` is not given.
pub fn default_job_path() -> PathBuf {
    PathBuf::from("LeRobotJob.toml")
}

/// Directory that relative paths in the job file are resolved against.
///
/// - `configs/record.toml` → `configs`
/// - bare `LeRobotJob.toml` (empty parent) → current working directory
fn job_root_dir(job_path: &Path) -> PathBuf {
    match job_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
