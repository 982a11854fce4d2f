//! Stand-in `lerobot-*` executables for tests.
//!
//! Each fake is a `/bin/sh` script written into a temporary directory that
//! tests hand to `Planner::with_bin_dir`, so no real LeRobot install is
//! needed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Temporary bin directory plus a scratch working directory and a session
/// base directory, all removed on drop.
pub struct FakeBin {
    root: TempDir,
}

impl FakeBin {
    pub fn new() -> Result<Self> {
        let root = tempfile::tempdir().context("creating fake bin tempdir")?;
        fs::create_dir_all(root.path().join("bin"))?;
        fs::create_dir_all(root.path().join("work"))?;
        Ok(Self { root })
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.path().join("bin")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.path().join("work")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.path().join("logs")
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Install `command` as an executable shell script with `body`.
    pub fn install(&self, command: &str, body: &str) -> Result<PathBuf> {
        let path = self.bin_dir().join(command);
        fs::write(&path, format!("#!/bin/sh\n{body}\n"))
            .with_context(|| format!("writing fake {command}"))?;
        make_executable(&path)?;
        Ok(path)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
