//! APT package manager (Debian/Ubuntu)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use skyline_exec::error::ExecError;
use skyline_exec::traits::CommandExecutor;
use tracing::{debug, instrument};

use crate::error::PackageError;
use crate::traits::PackageManager;
use crate::types::PackageManagerType;

const APT_GET: &str = "apt-get";

/// Default upper bound for a simulated upgrade
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// APT package manager implementation
pub struct AptManager {
    /// Executor for running apt commands
    executor: Arc<dyn CommandExecutor>,
    /// Upper bound for each apt invocation
    timeout: Duration,
}

impl AptManager {
    /// Create a new APT manager
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Set the command timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn map_exec_error(err: ExecError) -> PackageError {
    match err {
        ExecError::Timeout { timeout } => PackageError::Timeout(timeout),
        ExecError::SpawnError { program, message } => {
            PackageError::ManagerNotFound(format!("{program}: {message}"))
        }
        other => PackageError::ExecutionError(other.to_string()),
    }
}

#[async_trait]
impl PackageManager for AptManager {
    #[instrument(skip(self))]
    async fn simulate_upgrade(&self) -> Result<String, PackageError> {
        debug!("simulating apt upgrade");

        let result = self
            .executor
            .run_with_timeout(APT_GET, &["--just-print", "upgrade"], self.timeout)
            .await
            .map_err(map_exec_error)?;

        if !result.success() {
            if result.stderr.contains("Could not get lock") {
                return Err(PackageError::LockConflict(
                    result.stderr_summary().to_string(),
                ));
            }

            return Err(PackageError::CommandFailed {
                status: result.status,
                message: result.stderr_summary().to_string(),
            });
        }

        debug!(duration = ?result.duration, "apt simulation finished");

        Ok(result.stdout)
    }

    fn manager_type(&self) -> PackageManagerType {
        PackageManagerType::Apt
    }

    async fn is_available(&self) -> bool {
        match self.executor.run("which", &[APT_GET]).await {
            Ok(result) => result.success(),
            Err(_) => false,
        }
    }
}
