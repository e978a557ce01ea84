//! Core error types for skyline-core

use thiserror::Error;

use skyline_client::ClientError;
use skyline_pkg::PackageError;

/// Errors that can occur during reconciliation
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// The local package manager could not produce its upgrade simulation
    #[error("package manager error: {0}")]
    LocalCapability(String),

    /// A call to the inventory service failed
    #[error("inventory service error: {0}")]
    Remote(String),

    /// Actor communication error
    #[error("actor communication error: {0}")]
    ActorError(String),
}

impl CoreError {
    /// Whether this error should stop the agent under the default policy
    #[must_use]
    pub fn is_local_failure(&self) -> bool {
        matches!(self, CoreError::LocalCapability(_))
    }
}

impl From<PackageError> for CoreError {
    fn from(err: PackageError) -> Self {
        CoreError::LocalCapability(err.to_string())
    }
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        CoreError::Remote(err.to_string())
    }
}
