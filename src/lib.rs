// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod plan;
pub mod session;
pub mod types;

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::{JobFile, default_job_path, load_and_validate};
use crate::exec::RunCallbacks;

pub use crate::errors::RunnerError;
pub use crate::exec::{RunHandle, RunReport, Runner, RunnerOptions};
pub use crate::plan::{CommandConfig, ExecutionRequest, Planner};
pub use crate::session::{Session, SessionManager, SessionMetadata};
pub use crate::types::{CommandKind, RunnerState};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - job file loading
/// - the runner (planner + session manager)
/// - terminal output forwarding
/// - Ctrl-C → `Runner::stop`
///
/// Returns the exit code the process should exit with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let job_path = args.job.clone().unwrap_or_else(default_job_path);
    let mut job = load_and_validate(&job_path)
        .with_context(|| format!("loading job file {job_path:?}"))?;

    if let Some(log_dir) = args.log_dir {
        job.log_dir = log_dir;
    }

    if args.dry_run {
        print_dry_run(&job)?;
        return Ok(0);
    }

    let runner = job.runner();
    let callbacks = RunCallbacks::new()
        .on_stdout(|chunk| {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(chunk.as_bytes());
            let _ = out.flush();
        })
        .on_stderr(|chunk| {
            let mut err = std::io::stderr().lock();
            let _ = err.write_all(chunk.as_bytes());
        })
        .on_error(|e| warn!(error = %e, "job error"));

    let handle = runner.start(job.to_request(), callbacks)?;
    info!(session = %handle.session().root().display(), "job started");

    let wait = handle.wait();
    tokio::pin!(wait);

    let report = tokio::select! {
        res = &mut wait => res,
        sig = tokio::signal::ctrl_c() => {
            match sig {
                Ok(()) => {
                    info!("Ctrl-C received; stopping job");
                    runner.stop().await;
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
            wait.await
        }
    }?;

    info!(
        session = %report.session.root().display(),
        exit_code = report.exit_code,
        duration_ms = report.duration.as_millis() as u64,
        "job finished"
    );

    Ok(process_exit_code(report.exit_code))
}

/// Shell convention for our own exit status: a child killed by signal `n`
/// (reported as `-n`) becomes `128 + n`. `-1` means the status carried
/// neither a code nor a signal and maps to a plain failure.
pub fn process_exit_code(child_code: i32) -> i32 {
    match child_code {
        -1 => 1,
        c if c < 0 => 128 + c.saturating_neg().min(127),
        c => c,
    }
}

/// Dry-run output: validated invocation, no process started, nothing written.
fn print_dry_run(job: &JobFile) -> Result<()> {
    job.request.validate()?;
    let planner = job.planner();
    let args = planner.build_args(job.command_config())?;

    println!("lerobot-runner dry-run");
    println!("  program:     {}", planner.program(&args[0]).display());
    println!("  argv:        {args:?}");
    println!("  working_dir: {}", job.request.working_dir.display());
    println!("  log_dir:     {}", job.log_dir.display());
    println!("  stop_grace:  {:?}", job.stop_grace);
    if !job.request.environment.is_empty() {
        println!("  env:");
        for (k, v) in &job.request.environment {
            println!("    {k}={v}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_exits_map_to_shell_convention() {
        assert_eq!(process_exit_code(0), 0);
        assert_eq!(process_exit_code(2), 2);
        assert_eq!(process_exit_code(-9), 137);
        assert_eq!(process_exit_code(-15), 143);
        assert_eq!(process_exit_code(-1), 1);
        assert_eq!(process_exit_code(-2), 130);
    }
}
