// src/session/manager.rs

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

use crate::errors::Result;
use crate::plan::ExecutionRequest;
use crate::session::{Session, SessionMetadata};

/// Directory name format for session roots. Sorts chronologically; two
/// sessions created within the same second share a directory.
const SESSION_DIR_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Creates session directories and persists their metadata and logs.
#[derive(Debug, Clone)]
pub struct SessionManager {
    base_dir: PathBuf,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new("logs")
    }
}

impl SessionManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Validate `request`, create a fresh session directory and write
    /// `session.json` into it.
    ///
    /// Nothing is created on disk if validation fails.
    pub fn create_session(&self, request: &ExecutionRequest) -> Result<Session> {
        request.validate()?;

        let started_at = Utc::now();
        let root = self.base_dir.join(session_dir_name(started_at));
        fs::create_dir_all(&root)?;

        let session = Session::new(root, started_at);
        self.write_metadata(&session, request)?;

        info!(
            session = %session.root().display(),
            command = %request.command_config.command,
            "session created"
        );
        Ok(session)
    }

    fn write_metadata(&self, session: &Session, request: &ExecutionRequest) -> Result<()> {
        let cfg = &request.command_config;
        let metadata = SessionMetadata {
            command: cfg.command.clone(),
            config: cfg
                .config_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            extra_args: cfg.extra_args.clone(),
            working_dir: request.working_dir.to_string_lossy().into_owned(),
            environment: request.environment.clone(),
            started_at: session
                .started_at()
                .to_rfc3339_opts(SecondsFormat::Micros, false),
        };

        // Serialize fully first so the file is produced by a single write.
        let json = serde_json::to_string_pretty(&metadata)?;
        fs::write(session.metadata_path(), json)?;
        Ok(())
    }

    /// Read `session.json` back from disk.
    pub fn load_metadata(&self, session: &Session) -> Result<SessionMetadata> {
        let raw = fs::read_to_string(session.metadata_path())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write captured output to the session's log files.
    ///
    /// Despite the name this replaces any existing log content: the runner
    /// calls it once per session with the complete buffers, so a fresh
    /// session's logs end up identical either way. Empty or missing blobs
    /// leave the corresponding file untouched.
    pub fn append_output(
        &self,
        session: &Session,
        stdout: Option<&str>,
        stderr: Option<&str>,
    ) -> Result<()> {
        if let Some(text) = stdout.filter(|s| !s.is_empty()) {
            fs::write(session.stdout_path(), text)?;
            debug!(bytes = text.len(), path = %session.stdout_path().display(), "stdout log written");
        }
        if let Some(text) = stderr.filter(|s| !s.is_empty()) {
            fs::write(session.stderr_path(), text)?;
            debug!(bytes = text.len(), path = %session.stderr_path().display(), "stderr log written");
        }
        Ok(())
    }
}

fn session_dir_name(at: DateTime<Utc>) -> String {
    at.format(SESSION_DIR_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn session_dir_name_is_second_granular_and_sortable() {
        let a = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
        let c = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();

        assert_eq!(session_dir_name(a), "20240309-070501");
        assert!(session_dir_name(a) < session_dir_name(b));
        assert!(session_dir_name(b) < session_dir_name(c));
    }
}
