//! Scoped change of the process working directory
//!
//! Build scripts resolve paths against the current directory, so each
//! extension build runs with the process inside its descriptor's
//! directory. The working directory is process-global; one lock serializes
//! every guard so concurrent installs cannot interleave directory changes.

use rgem_errors::{BuildError, Error};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Holds the process inside a directory until dropped
#[must_use = "the previous directory is restored when the guard is dropped"]
pub struct WorkingDirGuard {
    previous: PathBuf,
    // Released after `drop` has restored `previous`
    _lock: MutexGuard<'static, ()>,
}

impl WorkingDirGuard {
    /// Enter `dir`, remembering the current directory
    ///
    /// # Errors
    ///
    /// Returns `BuildError::WorkingDirectory` if the current directory cannot
    /// be read or `dir` cannot be entered.
    pub fn enter(dir: &Path) -> Result<Self, Error> {
        let lock = CWD_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let failed = |e: std::io::Error| BuildError::WorkingDirectory {
            path: dir.display().to_string(),
            message: e.to_string(),
        };
        let previous = std::env::current_dir().map_err(failed)?;
        std::env::set_current_dir(dir).map_err(failed)?;

        tracing::trace!(from = %previous.display(), to = %dir.display(), "entered build directory");
        Ok(Self {
            previous,
            _lock: lock,
        })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            tracing::warn!(
                path = %self.previous.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}
