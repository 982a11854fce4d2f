// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `lerobot-runner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lerobot-runner",
    version,
    about = "Run a LeRobot CLI command and record its output as a session.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the job file (TOML).
    ///
    /// Default: `LeRobotJob.toml` in the current working directory.
    #[arg(long, value_name = "PATH")]
    pub job: Option<PathBuf>,

    /// Base directory for session logs; overrides `[runner].log_dir`.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LEROBOT_RUNNER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the job and print the planned invocation without running it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = CliArgs::try_parse_from([
            "lerobot-runner",
            "--job",
            "jobs/record.toml",
            "--log-dir",
            "/tmp/sessions",
            "--log-level",
            "debug",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(args.job, Some(PathBuf::from("jobs/record.toml")));
        assert_eq!(args.log_dir, Some(PathBuf::from("/tmp/sessions")));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.dry_run);
    }

    #[test]
    fn defaults_are_empty() {
        let args = CliArgs::try_parse_from(["lerobot-runner"]).unwrap();
        assert!(args.job.is_none());
        assert!(args.log_dir.is_none());
        assert!(args.log_level.is_none());
        assert!(!args.dry_run);
    }
}
