// src/exec/runner.rs

//! Single-job process runner.
//!
//! `Runner::start` validates the request, opens a session and hands the job
//! to a dedicated Tokio task (the worker). The worker owns the `Child`; the
//! only state shared with the runner is the active-run slot below, which is
//! guarded by a mutex. `Runner::stop` never touches the child directly: it
//! sends a stop request over a channel and waits for the worker to
//! acknowledge that the process has been reaped.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::{Result, RunnerError};
use crate::exec::callbacks::RunCallbacks;
use crate::exec::env::{merge_environment, process_environment};
use crate::exec::stream::{StreamKind, drain};
use crate::exec::terminate::{exit_code, terminate_gracefully};
use crate::plan::{ExecutionRequest, Planner};
use crate::session::{Session, SessionManager};
use crate::types::RunnerState;

/// How long `stop` waits after the cooperative signal before killing.
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    pub stop_grace: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            stop_grace: DEFAULT_STOP_GRACE,
        }
    }
}

/// Outcome of a run that got as far as launching the process.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub session: Session,
    pub exit_code: i32,
    pub duration: Duration,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Completion future for one run, returned by [`Runner::start`].
#[derive(Debug)]
pub struct RunHandle {
    session: Session,
    report_rx: oneshot::Receiver<Result<RunReport>>,
}

impl RunHandle {
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Wait for the worker to finish.
    ///
    /// Resolves after `on_exit` has run, the logs have been written and the
    /// runner has been released for the next `start`.
    pub async fn wait(self) -> Result<RunReport> {
        self.report_rx.await.map_err(|_| RunnerError::WorkerGone)?
    }
}

/// A stop request carries the sender the worker fires once the child has
/// been reaped.
type StopRequest = oneshot::Sender<()>;

struct ActiveRun {
    run_id: u64,
    state: RunnerState,
    pid: Option<u32>,
    stop_tx: mpsc::Sender<StopRequest>,
    worker: JoinHandle<()>,
}

type Slot = Arc<Mutex<Option<ActiveRun>>>;

fn lock(slot: &Mutex<Option<ActiveRun>>) -> MutexGuard<'_, Option<ActiveRun>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything the worker needs to launch and supervise one process.
struct Job {
    run_id: u64,
    program: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
    env: BTreeMap<OsString, OsString>,
    session: Session,
    started: Instant,
    stop_grace: Duration,
}

/// Runs at most one LeRobot command at a time.
#[derive(Debug)]
pub struct Runner {
    planner: Planner,
    sessions: SessionManager,
    options: RunnerOptions,
    slot: Slot,
    next_run_id: AtomicU64,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(Planner::default(), SessionManager::default())
    }
}

impl std::fmt::Debug for ActiveRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRun")
            .field("run_id", &self.run_id)
            .field("state", &self.state)
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

impl Runner {
    pub fn new(planner: Planner, sessions: SessionManager) -> Self {
        Self {
            planner,
            sessions,
            options: RunnerOptions::default(),
            slot: Arc::new(Mutex::new(None)),
            next_run_id: AtomicU64::new(1),
        }
    }

    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn options(&self) -> RunnerOptions {
        self.options
    }

    /// Current lifecycle state. A worker that has finished but not yet
    /// released its slot counts as `Idle`.
    pub fn state(&self) -> RunnerState {
        match lock(&self.slot).as_ref() {
            Some(active) if !active.worker.is_finished() => active.state,
            _ => RunnerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() != RunnerState::Idle
    }

    /// Pid of the active child, once it has been launched.
    pub fn active_pid(&self) -> Option<u32> {
        match lock(&self.slot).as_ref() {
            Some(active) if !active.worker.is_finished() => active.pid,
            _ => None,
        }
    }

    /// Start `request` in the background.
    ///
    /// Validation errors and [`RunnerError::AlreadyRunning`] are returned
    /// here, before any session directory is created or any process is
    /// spawned. Everything after that (including a failure to launch the
    /// executable) is reported through `callbacks` and the returned
    /// [`RunHandle`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, request: ExecutionRequest, callbacks: RunCallbacks) -> Result<RunHandle> {
        // Held until the new run is installed, so the worker cannot release a
        // slot that does not exist yet and a concurrent `start` cannot slip in
        // between the check and the install. This spans session creation (a
        // mkdir and one small write), during which `state()` and
        // `active_pid()` block.
        let mut slot = lock(&self.slot);
        if let Some(active) = slot.as_ref() {
            if !active.worker.is_finished() {
                warn!(run_id = active.run_id, "start rejected; a run is still active");
                return Err(RunnerError::AlreadyRunning);
            }
        }

        let session = self.sessions.create_session(&request)?;
        let mut args = self.planner.build_args(&request.command_config)?;
        let program = self.planner.program(&args.remove(0));
        let env = merge_environment(process_environment(), &request.environment);

        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let job = Job {
            run_id,
            program,
            args,
            working_dir: request.working_dir,
            env,
            session: session.clone(),
            started: Instant::now(),
            stop_grace: self.options.stop_grace,
        };

        let (stop_tx, stop_rx) = mpsc::channel::<StopRequest>(4);
        let (report_tx, report_rx) = oneshot::channel();
        let worker = tokio::spawn(run_worker(
            job,
            callbacks,
            stop_rx,
            report_tx,
            self.slot.clone(),
            self.sessions.clone(),
        ));

        *slot = Some(ActiveRun {
            run_id,
            state: RunnerState::Starting,
            pid: None,
            stop_tx,
            worker,
        });

        Ok(RunHandle { session, report_rx })
    }

    /// Terminate the active process, if any.
    ///
    /// Sends SIGTERM, waits up to the configured grace period, then kills.
    /// Returns only once the process is gone. Never fails.
    pub async fn stop(&self) {
        let stop_tx = {
            let mut slot = lock(&self.slot);
            match slot.as_mut() {
                Some(active) if !active.worker.is_finished() => {
                    active.state = RunnerState::Stopping;
                    active.stop_tx.clone()
                }
                _ => {
                    debug!("stop requested with no active process");
                    return;
                }
            }
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        if stop_tx.send(ack_tx).await.is_err() {
            debug!("process finished before stop request was delivered");
            return;
        }

        info!("stop requested; waiting for process to exit");
        // An Err here means the worker dropped the request because the
        // process had already been reaped.
        let _ = ack_rx.await;
    }
}

/// Clears the runner's slot when the worker ends, however it ends.
struct SlotRelease {
    slot: Slot,
    run_id: u64,
}

impl Drop for SlotRelease {
    fn drop(&mut self) {
        let mut slot = lock(&self.slot);
        if slot.as_ref().is_some_and(|active| active.run_id == self.run_id) {
            *slot = None;
            debug!(run_id = self.run_id, "runner slot released");
        }
    }
}

async fn run_worker(
    job: Job,
    callbacks: RunCallbacks,
    stop_rx: mpsc::Receiver<StopRequest>,
    report_tx: oneshot::Sender<Result<RunReport>>,
    slot: Slot,
    sessions: SessionManager,
) {
    let release = SlotRelease {
        slot: slot.clone(),
        run_id: job.run_id,
    };

    let result = execute(&job, callbacks, stop_rx, &slot, &sessions).await;

    drop(release);
    if report_tx.send(result).is_err() {
        debug!(run_id = job.run_id, "run handle dropped before completion");
    }
}

async fn execute(
    job: &Job,
    callbacks: RunCallbacks,
    stop_rx: mpsc::Receiver<StopRequest>,
    slot: &Slot,
    sessions: &SessionManager,
) -> Result<RunReport> {
    let RunCallbacks {
        on_stdout,
        on_stderr,
        on_exit,
        on_error,
    } = callbacks;
    let report_error = |err: &RunnerError| {
        if let Some(cb) = &on_error {
            cb(err);
        }
    };

    let mut child = match spawn_child(job) {
        Ok(child) => child,
        Err(err) => {
            error!(run_id = job.run_id, error = %err, "failed to start process");
            report_error(&err);
            return Err(err);
        }
    };

    let pid = child.id();
    mark_running(slot, job.run_id, pid);
    info!(
        run_id = job.run_id,
        ?pid,
        program = %job.program.display(),
        args = ?job.args,
        "process started"
    );

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Both pipes are drained concurrently so a chatty stderr cannot block
    // the child while stdout is still open.
    let (stdout_text, stderr_text, status) = tokio::join!(
        drain(stdout, StreamKind::Stdout, on_stdout.as_ref()),
        drain(stderr, StreamKind::Stderr, on_stderr.as_ref()),
        supervise(&mut child, stop_rx, job.stop_grace),
    );

    let status = match status {
        Ok(status) => status,
        Err(e) => {
            let err = RunnerError::Io(e);
            error!(run_id = job.run_id, error = %err, "failed waiting for process");
            report_error(&err);
            return Err(err);
        }
    };

    let duration = job.started.elapsed();
    let code = exit_code(status);
    info!(
        run_id = job.run_id,
        exit_code = code,
        duration_ms = duration.as_millis() as u64,
        "process exited"
    );

    if let Some(cb) = on_exit {
        cb(code, duration);
    }

    // The run itself completed; a failed log write is reported but does not
    // turn the run into an error.
    if let Err(err) = sessions.append_output(
        &job.session,
        Some(stdout_text.as_str()),
        Some(stderr_text.as_str()),
    ) {
        warn!(run_id = job.run_id, error = %err, "failed to write session logs");
        report_error(&err);
    }

    Ok(RunReport {
        session: job.session.clone(),
        exit_code: code,
        duration,
    })
}

fn spawn_child(job: &Job) -> Result<Child> {
    let mut cmd = Command::new(&job.program);
    cmd.args(&job.args)
        .current_dir(&job.working_dir)
        .env_clear()
        .envs(&job.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group, so `stop` can signal everything the job forks.
    #[cfg(unix)]
    cmd.process_group(0);

    cmd.spawn().map_err(|source| RunnerError::Spawn {
        program: job.program.display().to_string(),
        source,
    })
}

fn mark_running(slot: &Slot, run_id: u64, pid: Option<u32>) {
    let mut slot = lock(slot);
    if let Some(active) = slot.as_mut().filter(|a| a.run_id == run_id) {
        active.pid = pid;
        // a stop may already have been requested while starting
        if active.state == RunnerState::Starting {
            active.state = RunnerState::Running;
        }
    }
}

/// Wait for the child to exit on its own, or terminate it on request.
///
/// `stop_rx` is dropped on return, which releases any further stop
/// requests queued behind the first one.
async fn supervise(
    child: &mut Child,
    mut stop_rx: mpsc::Receiver<StopRequest>,
    grace: Duration,
) -> io::Result<ExitStatus> {
    tokio::select! {
        status = child.wait() => status,
        Some(ack) = stop_rx.recv() => {
            let status = terminate_gracefully(child, grace).await;
            let _ = ack.send(());
            status
        }
    }
}
