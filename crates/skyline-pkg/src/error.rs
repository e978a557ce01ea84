//! Error types for skyline-pkg

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during package operations
#[derive(Error, Debug, Clone)]
pub enum PackageError {
    /// Package manager not found on system
    #[error("package manager not found: {0}")]
    ManagerNotFound(String),

    /// Lock file conflict (another process running)
    #[error("lock file conflict: {0}")]
    LockConflict(String),

    /// Command exited unsuccessfully
    #[error("command failed: {status} - {message}")]
    CommandFailed {
        /// Exit status
        status: i32,
        /// Error message
        message: String,
    },

    /// Command did not finish in time
    #[error("package manager timed out after {0:?}")]
    Timeout(Duration),

    /// Execution error from the command executor
    #[error("execution error: {0}")]
    ExecutionError(String),
}
