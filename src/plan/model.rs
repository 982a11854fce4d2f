// src/plan/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::errors::{Result, RunnerError};
use crate::types::CommandKind;

/// Declarative description of one LeRobot invocation.
///
/// `command` is kept as the raw string the caller supplied so that anything
/// outside [`CommandKind`] surfaces as [`RunnerError::UnsupportedCommand`]
/// instead of being unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandConfig {
    pub command: String,
    pub config_path: Option<PathBuf>,
    pub extra_args: Vec<String>,
}

impl CommandConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Parsed command identifier, if it belongs to the supported set.
    pub fn kind(&self) -> Option<CommandKind> {
        self.command.parse().ok()
    }

    /// Check the command against the supported set and the config path
    /// against the filesystem.
    pub fn validate(&self) -> Result<()> {
        if self.kind().is_none() {
            return Err(RunnerError::UnsupportedCommand(self.command.clone()));
        }
        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(RunnerError::ConfigNotFound(path.clone()));
            }
        }
        Ok(())
    }
}

/// A [`CommandConfig`] plus where and with which environment to run it.
///
/// `environment` holds only the per-request overrides; the process
/// environment is merged in at spawn time by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub command_config: CommandConfig,
    pub working_dir: PathBuf,
    pub environment: BTreeMap<String, String>,
}

impl ExecutionRequest {
    pub fn new(command_config: CommandConfig, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command_config,
            working_dir: working_dir.into(),
            environment: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.command_config.validate()?;
        if !self.working_dir.exists() {
            return Err(RunnerError::WorkingDirNotFound(self.working_dir.clone()));
        }
        if !self.working_dir.is_dir() {
            return Err(RunnerError::WorkingDirNotADirectory(
                self.working_dir.clone(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_do_not_share_extra_args() {
        let mut a = CommandConfig::new("lerobot-record");
        let b = CommandConfig::new("lerobot-record");
        a.extra_args.push("--foo".to_string());

        assert_eq!(a.extra_args, vec!["--foo".to_string()]);
        assert!(b.extra_args.is_empty());
    }

    #[test]
    fn validate_rejects_unknown_command_before_touching_config_path() {
        let cfg = CommandConfig::new("rm").with_config_path("/definitely/not/here.yaml");
        match cfg.validate() {
            Err(RunnerError::UnsupportedCommand(cmd)) => assert_eq!(cmd, "rm"),
            other => panic!("expected UnsupportedCommand, got {other:?}"),
        }
    }

    #[test]
    fn validate_reports_missing_config_path() {
        let cfg =
            CommandConfig::new("lerobot-record").with_config_path("/definitely/not/here.yaml");
        assert!(matches!(cfg.validate(), Err(RunnerError::ConfigNotFound(_))));
    }

    #[test]
    fn request_validation_checks_working_dir_kind() {
        let dir = std::env::temp_dir();
        let file = dir.join(format!("lerobot-runner-model-{}.txt", std::process::id()));
        std::fs::write(&file, "x").unwrap();

        let req = ExecutionRequest::new(CommandConfig::new("lerobot-find-port"), &file);
        let res = req.validate();
        std::fs::remove_file(&file).unwrap();

        assert!(matches!(res, Err(RunnerError::WorkingDirNotADirectory(_))));

        let missing = ExecutionRequest::new(
            CommandConfig::new("lerobot-find-port"),
            dir.join("lerobot-runner-no-such-dir"),
        );
        assert!(matches!(
            missing.validate(),
            Err(RunnerError::WorkingDirNotFound(_))
        ));
    }
}
