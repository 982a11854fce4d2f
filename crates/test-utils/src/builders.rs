#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lerobot_runner::{CommandConfig, ExecutionRequest};

/// Builder for `CommandConfig` to simplify test setup.
pub struct CommandConfigBuilder {
    config: CommandConfig,
}

impl CommandConfigBuilder {
    pub fn new(command: &str) -> Self {
        Self {
            config: CommandConfig::new(command),
        }
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config_path = Some(path.into());
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.config.extra_args.push(arg.to_string());
        self
    }

    pub fn build(self) -> CommandConfig {
        self.config
    }
}

/// Builder for `ExecutionRequest`.
pub struct RequestBuilder {
    request: ExecutionRequest,
}

impl RequestBuilder {
    pub fn new(command: &str, working_dir: &Path) -> Self {
        Self {
            request: ExecutionRequest::new(CommandConfig::new(command), working_dir),
        }
    }

    pub fn from_config(config: CommandConfig, working_dir: &Path) -> Self {
        Self {
            request: ExecutionRequest::new(config, working_dir),
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.request.command_config.extra_args.push(arg.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.request
            .environment
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> ExecutionRequest {
        self.request
    }
}
