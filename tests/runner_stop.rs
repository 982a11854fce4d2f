// tests/runner_stop.rs
#![cfg(unix)]

mod common;
use crate::common::builders::RequestBuilder;
use crate::common::fake_bin::FakeBin;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use tokio::sync::mpsc;

use lerobot_runner::exec::RunCallbacks;
use lerobot_runner::{Planner, Runner, RunnerOptions, RunnerState, SessionManager};

type TestResult = Result<(), Box<dyn Error>>;

const GRACE: Duration = Duration::from_millis(400);

fn runner_for(bin: &FakeBin) -> Runner {
    Runner::new(
        Planner::with_bin_dir(bin.bin_dir()),
        SessionManager::new(bin.log_dir()),
    )
    .with_options(RunnerOptions { stop_grace: GRACE })
}

/// Callbacks that forward stdout chunks so a test can wait for the child to
/// report that it is up.
fn stdout_channel() -> (RunCallbacks, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callbacks = RunCallbacks::new().on_stdout(move |chunk| {
        let _ = tx.send(chunk.to_string());
    });
    (callbacks, rx)
}

fn process_exists(pid: u32) -> bool {
    let pid = Pid::from_raw(i32::try_from(pid).expect("pid fits in i32"));
    !matches!(kill(pid, None), Err(Errno::ESRCH))
}

#[tokio::test]
async fn stop_without_active_process_is_a_no_op() -> TestResult {
    init_tracing();

    let bin = FakeBin::new()?;
    let runner = runner_for(&bin);

    let started = Instant::now();
    with_timeout(runner.stop()).await;

    assert!(started.elapsed() < GRACE);
    assert_eq!(runner.state(), RunnerState::Idle);
    Ok(())
}

#[tokio::test]
async fn stop_terminates_cooperative_process_with_sigterm() -> TestResult {
    init_tracing();

    let bin = FakeBin::new()?;
    bin.install("lerobot-teleoperate", "echo ready\nexec sleep 30")?;
    let runner = runner_for(&bin);
    let (callbacks, mut lines) = stdout_channel();

    let handle = runner.start(
        RequestBuilder::new("lerobot-teleoperate", &bin.work_dir()).build(),
        callbacks,
    )?;
    assert_eq!(with_timeout(lines.recv()).await.as_deref(), Some("ready\n"));
    assert_eq!(runner.state(), RunnerState::Running);
    let pid = runner.active_pid().ok_or("no pid while running")?;

    let started = Instant::now();
    with_timeout(runner.stop()).await;

    assert!(started.elapsed() < GRACE, "cooperative exit should not wait out the grace period");
    assert!(!process_exists(pid));

    let report = with_timeout(handle.wait()).await?;
    assert_eq!(report.exit_code, -15);
    assert_eq!(fs::read_to_string(report.session.stdout_path())?, "ready\n");
    assert_eq!(runner.state(), RunnerState::Idle);
    Ok(())
}

#[tokio::test]
async fn stop_kills_process_that_ignores_sigterm() -> TestResult {
    init_tracing();

    let bin = FakeBin::new()?;
    bin.install(
        "lerobot-record",
        "trap '' TERM\necho ready\nwhile :; do sleep 0.05; done",
    )?;
    let runner = Arc::new(runner_for(&bin));
    let (callbacks, mut lines) = stdout_channel();

    let handle = runner.start(
        RequestBuilder::new("lerobot-record", &bin.work_dir()).build(),
        callbacks,
    )?;
    assert_eq!(with_timeout(lines.recv()).await.as_deref(), Some("ready\n"));
    let pid = runner.active_pid().ok_or("no pid while running")?;

    let started = Instant::now();
    let stopper = {
        let runner = runner.clone();
        tokio::spawn(async move { runner.stop().await })
    };

    tokio::time::sleep(GRACE / 4).await;
    assert_eq!(runner.state(), RunnerState::Stopping);
    assert!(process_exists(pid), "SIGTERM alone must not have ended it");

    with_timeout(stopper).await?;
    assert!(started.elapsed() >= GRACE);
    assert!(!process_exists(pid), "stop returned before the process was reaped");

    let report = with_timeout(handle.wait()).await?;
    assert_eq!(report.exit_code, -9);
    assert_eq!(runner.state(), RunnerState::Idle);
    Ok(())
}

#[tokio::test]
async fn concurrent_stops_both_return_after_exit() -> TestResult {
    init_tracing();

    let bin = FakeBin::new()?;
    bin.install("lerobot-calibrate", "echo ready\nexec sleep 30")?;
    let runner = Arc::new(runner_for(&bin));
    let (callbacks, mut lines) = stdout_channel();

    let handle = runner.start(
        RequestBuilder::new("lerobot-calibrate", &bin.work_dir()).build(),
        callbacks,
    )?;
    assert_eq!(with_timeout(lines.recv()).await.as_deref(), Some("ready\n"));
    let pid = runner.active_pid().ok_or("no pid while running")?;

    let a = {
        let runner = runner.clone();
        tokio::spawn(async move { runner.stop().await })
    };
    let b = {
        let runner = runner.clone();
        tokio::spawn(async move { runner.stop().await })
    };
    with_timeout(a).await?;
    with_timeout(b).await?;

    assert!(!process_exists(pid));
    assert_eq!(with_timeout(handle.wait()).await?.exit_code, -15);
    Ok(())
}

#[tokio::test]
async fn stop_after_natural_exit_returns_immediately() -> TestResult {
    init_tracing();

    let bin = FakeBin::new()?;
    bin.install("lerobot-find-port", "echo /dev/ttyACM0")?;
    let runner = runner_for(&bin);

    let handle = runner.start(
        RequestBuilder::new("lerobot-find-port", &bin.work_dir()).build(),
        RunCallbacks::new(),
    )?;
    let report = with_timeout(handle.wait()).await?;
    assert_eq!(report.exit_code, 0);

    let started = Instant::now();
    with_timeout(runner.stop()).await;
    assert!(started.elapsed() < GRACE);
    Ok(())
}

#[tokio::test]
async fn stop_reaches_background_helpers_holding_the_pipes() -> TestResult {
    init_tracing();

    // The helper inherits stdout/stderr, so output only ends when it dies.
    let bin = FakeBin::new()?;
    bin.install("lerobot-record", "sleep 30 &\necho ready\nwait")?;
    bin.install("lerobot-find-port", "echo port")?;
    let runner = runner_for(&bin);
    let (callbacks, mut lines) = stdout_channel();

    let handle = runner.start(
        RequestBuilder::new("lerobot-record", &bin.work_dir()).build(),
        callbacks,
    )?;
    assert_eq!(with_timeout(lines.recv()).await.as_deref(), Some("ready\n"));

    with_timeout(runner.stop()).await;

    let report = tokio::time::timeout(Duration::from_secs(3), handle.wait())
        .await
        .map_err(|_| "run did not finish after stop")??;
    assert!(report.exit_code < 0, "exit code was {}", report.exit_code);
    assert_eq!(runner.state(), RunnerState::Idle);

    let next = runner.start(
        RequestBuilder::new("lerobot-find-port", &bin.work_dir()).build(),
        RunCallbacks::new(),
    )?;
    assert_eq!(with_timeout(next.wait()).await?.exit_code, 0);
    Ok(())
}
