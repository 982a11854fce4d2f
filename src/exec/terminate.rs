// src/exec/terminate.rs

//! Cooperative-then-forced termination of a child process.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Ask `child` and its process group to exit, give them `grace` to comply,
/// then kill the group.
///
/// The child is expected to lead its own process group (see `spawn_child`),
/// so helpers it forked are signalled too and cannot keep its output pipes
/// open. Returns only once the child has been reaped.
pub async fn terminate_gracefully(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    let pid = child.id();

    let status = if request_termination(pid) {
        match timeout(grace, child.wait()).await {
            Ok(status) => {
                debug!(?pid, "process exited after termination request");
                status
            }
            Err(_elapsed) => {
                warn!(
                    ?pid,
                    grace_ms = grace.as_millis() as u64,
                    "process ignored termination request; killing"
                );
                kill_and_reap(child, pid).await
            }
        }
    } else {
        // Nothing cooperative to send; go straight to the kill.
        kill_and_reap(child, pid).await
    };

    // The leader is gone; anything it left behind in its group goes too.
    kill_group(pid);
    status
}

async fn kill_and_reap(child: &mut Child, pid: Option<u32>) -> io::Result<ExitStatus> {
    kill_group(pid);
    if let Err(e) = child.start_kill() {
        // Usually means it exited on its own in the meantime.
        debug!(error = %e, "kill failed");
    }
    child.wait().await
}

#[cfg(unix)]
fn group_of(pid: Option<u32>) -> Option<nix::unistd::Pid> {
    pid.and_then(|p| i32::try_from(p).ok())
        .map(nix::unistd::Pid::from_raw)
}

/// Deliver SIGTERM to the child's process group. Returns false when no
/// signal could be sent.
#[cfg(unix)]
fn request_termination(pid: Option<u32>) -> bool {
    use nix::sys::signal::{Signal, killpg};

    let Some(pgid) = group_of(pid) else {
        return false;
    };

    match killpg(pgid, Signal::SIGTERM) {
        Ok(()) => {
            info!(pgid = pgid.as_raw(), "sent SIGTERM to process group");
            true
        }
        Err(e) => {
            warn!(pgid = pgid.as_raw(), error = %e, "failed to send SIGTERM");
            false
        }
    }
}

#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};

    let Some(pgid) = group_of(pid) else {
        return;
    };

    match killpg(pgid, Signal::SIGKILL) {
        Ok(()) => debug!(pgid = pgid.as_raw(), "sent SIGKILL to process group"),
        // empty group
        Err(Errno::ESRCH) => {}
        Err(e) => debug!(pgid = pgid.as_raw(), error = %e, "failed to kill process group"),
    }
}

#[cfg(not(unix))]
fn request_termination(_pid: Option<u32>) -> bool {
    false
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

/// Map an exit status to a single integer: the exit code when there is one,
/// `-signal` for a signal-terminated process on Unix, `-1` otherwise.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return -sig;
        }
    }

    -1
}
