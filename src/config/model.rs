// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::{Runner, RunnerOptions};
use crate::plan::{CommandConfig, ExecutionRequest, Planner};
use crate::session::SessionManager;

/// Job file as read from TOML, before paths are resolved and values checked.
///
/// ```toml
/// [runner]
/// log_dir = "logs"
/// bin_dir = ".venv/bin"
/// stop_grace = "5s"
///
/// [job]
/// command = "lerobot-record"
/// config = "configs/record.yaml"
/// extra_args = ["--display_data=true"]
/// working_dir = "."
///
/// [job.env]
/// HF_USER = "me"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawJobFile {
    #[serde(default)]
    pub runner: RunnerSection,

    pub job: JobSection,
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerSection {
    /// Base directory for session directories.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Directory holding the `lerobot-*` executables. If unset they are
    /// looked up on `PATH`.
    #[serde(default)]
    pub bin_dir: Option<PathBuf>,

    /// Duration string (`"250ms"`, `"5s"`, `"1m"`) that `stop` waits after
    /// SIGTERM before killing.
    #[serde(default = "default_stop_grace")]
    pub stop_grace: String,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_stop_grace() -> String {
    "5s".to_string()
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            bin_dir: None,
            stop_grace: default_stop_grace(),
        }
    }
}

/// `[job]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSection {
    pub command: String,

    #[serde(default)]
    pub config: Option<PathBuf>,

    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Defaults to the directory containing the job file.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Validated job file with all relative paths resolved against the job
/// file's directory.
#[derive(Debug, Clone)]
pub struct JobFile {
    pub log_dir: PathBuf,
    pub bin_dir: Option<PathBuf>,
    pub stop_grace: Duration,
    pub request: ExecutionRequest,
}

impl JobFile {
    pub(crate) fn new_unchecked(
        log_dir: PathBuf,
        bin_dir: Option<PathBuf>,
        stop_grace: Duration,
        request: ExecutionRequest,
    ) -> Self {
        Self {
            log_dir,
            bin_dir,
            stop_grace,
            request,
        }
    }

    pub fn command_config(&self) -> &CommandConfig {
        &self.request.command_config
    }

    pub fn to_request(&self) -> ExecutionRequest {
        self.request.clone()
    }

    pub fn planner(&self) -> Planner {
        match &self.bin_dir {
            Some(dir) => Planner::with_bin_dir(dir),
            None => Planner::new(),
        }
    }

    pub fn session_manager(&self) -> SessionManager {
        SessionManager::new(&self.log_dir)
    }

    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            stop_grace: self.stop_grace,
        }
    }

    /// A runner wired with this job file's planner, session base and
    /// options.
    pub fn runner(&self) -> Runner {
        Runner::new(self.planner(), self.session_manager()).with_options(self.runner_options())
    }
}
