// src/plan/planner.rs

//! Argument planning for LeRobot CLI commands.

use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::plan::model::CommandConfig;

/// Builds argument vectors that can be handed to `Command` without a shell.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    bin_dir: Option<PathBuf>,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve executables inside `dir` (e.g. a virtualenv's `bin/`) instead
    /// of relying on `PATH`.
    pub fn with_bin_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: Some(dir.into()),
        }
    }

    pub fn bin_dir(&self) -> Option<&Path> {
        self.bin_dir.as_deref()
    }

    /// Validate `config` and produce `[command, --config <path>?, extra_args...]`.
    pub fn build_args(&self, config: &CommandConfig) -> Result<Vec<String>> {
        config.validate()?;

        let mut args = Vec::with_capacity(3 + config.extra_args.len());
        args.push(config.command.clone());
        if let Some(path) = &config.config_path {
            args.push("--config".to_string());
            args.push(path.to_string_lossy().into_owned());
        }
        args.extend(config.extra_args.iter().cloned());
        Ok(args)
    }

    /// The executable to launch for `command`.
    pub fn program(&self, command: &str) -> PathBuf {
        match &self.bin_dir {
            Some(dir) => dir.join(command),
            None => PathBuf::from(command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_uses_bin_dir_when_configured() {
        assert_eq!(
            Planner::new().program("lerobot-record"),
            PathBuf::from("lerobot-record")
        );
        assert_eq!(
            Planner::with_bin_dir("/opt/venv/bin").program("lerobot-record"),
            PathBuf::from("/opt/venv/bin/lerobot-record")
        );
    }
}
