// src/exec/callbacks.rs

use std::fmt;
use std::time::Duration;

use crate::errors::RunnerError;

/// Receives one chunk (a line, newline included) of child output.
pub type OutputHandler = Box<dyn Fn(&str) + Send + Sync>;

/// Receives the exit code and wall-clock duration of a finished run.
pub type ExitHandler = Box<dyn FnOnce(i32, Duration) + Send>;

/// Receives errors raised inside the worker (spawn failures, log writes).
pub type ErrorHandler = Box<dyn Fn(&RunnerError) + Send + Sync>;

/// Caller-supplied hooks for one run. All of them are optional and all of
/// them are invoked from the runner's worker task, never from the caller's
/// context.
#[derive(Default)]
pub struct RunCallbacks {
    pub(crate) on_stdout: Option<OutputHandler>,
    pub(crate) on_stderr: Option<OutputHandler>,
    pub(crate) on_exit: Option<ExitHandler>,
    pub(crate) on_error: Option<ErrorHandler>,
}

impl RunCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_stdout(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_stdout = Some(Box::new(f));
        self
    }

    pub fn on_stderr(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_stderr = Some(Box::new(f));
        self
    }

    /// Called at most once, after both streams are drained and the child has
    /// been reaped. Not called when the process could not be started.
    pub fn on_exit(mut self, f: impl FnOnce(i32, Duration) + Send + 'static) -> Self {
        self.on_exit = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&RunnerError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for RunCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunCallbacks")
            .field("on_stdout", &self.on_stdout.is_some())
            .field("on_stderr", &self.on_stderr.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
