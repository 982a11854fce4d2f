// src/config/validate.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::model::{JobFile, RawJobFile};
use crate::errors::{Result, RunnerError};
use crate::plan::{CommandConfig, ExecutionRequest};

impl JobFile {
    /// Check `raw` and resolve its relative paths against `base_dir`.
    ///
    /// Filesystem checks (config file present, working dir exists) are left
    /// to request validation at start time, so a job file can be loaded and
    /// dry-run before its inputs exist.
    pub fn resolve(raw: RawJobFile, base_dir: &Path) -> Result<Self> {
        let command = raw.job.command.trim();
        if command.is_empty() {
            return Err(RunnerError::Config(
                "[job].command must not be empty".to_string(),
            ));
        }

        let stop_grace = parse_duration(&raw.runner.stop_grace).map_err(|e| {
            RunnerError::Config(format!("[runner].stop_grace: {e}"))
        })?;
        if stop_grace.is_zero() {
            return Err(RunnerError::Config(
                "[runner].stop_grace must be greater than zero".to_string(),
            ));
        }

        let command_config = CommandConfig {
            command: command.to_string(),
            config_path: raw.job.config.map(|p| resolve_path(base_dir, p)),
            extra_args: raw.job.extra_args,
        };

        let working_dir = raw
            .job
            .working_dir
            .map(|p| resolve_path(base_dir, p))
            .unwrap_or_else(|| base_dir.to_path_buf());

        let request = ExecutionRequest {
            command_config,
            working_dir,
            environment: raw.job.env,
        };

        Ok(JobFile::new_unchecked(
            resolve_path(base_dir, raw.runner.log_dir),
            raw.runner.bin_dir.map(|p| resolve_path(base_dir, p)),
            stop_grace,
            request,
        ))
    }
}

fn resolve_path(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Parse a simple duration string like `"5s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;

    let secs_per_unit = match unit_part.trim().to_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        unit => {
            return Err(format!(
                "unsupported duration unit '{unit}'; expected ms, s, m, or h"
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: '{s}'"))
}
