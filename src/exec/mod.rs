// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running LeRobot commands with
//! `tokio::process::Command`, streaming their output back to the caller and
//! terminating them on request.
//!
//! - [`runner`] owns the single-job `Runner` and its background worker.
//! - [`callbacks`] defines the hooks a caller subscribes for one run.
//! - [`stream`] drains a child's stdout/stderr pipes chunk by chunk.
//! - [`terminate`] implements SIGTERM-then-kill shutdown and exit-code mapping.
//! - [`env`] builds the child environment from the process environment and
//!   the request's overrides.

pub mod callbacks;
pub mod env;
pub mod runner;
pub mod stream;
pub mod terminate;

pub use callbacks::{ErrorHandler, ExitHandler, OutputHandler, RunCallbacks};
pub use env::merge_environment;
pub use runner::{DEFAULT_STOP_GRACE, RunHandle, RunReport, Runner, RunnerOptions};
