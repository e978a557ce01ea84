//! Construction of the agent's collaborators

use std::sync::Arc;

use eyre::Result;
use skyline_client::HttpClient;
use skyline_core::Reconciler;
use skyline_exec::{CommandExecutor, LocalExecutor};
use skyline_pkg::{AptManager, PackageManager};
use tracing::info;

use crate::config::Settings;

/// Detect the package manager by probing the host
pub async fn detect_package_manager(
    executor: Arc<dyn CommandExecutor>,
    settings: &Settings,
) -> Result<Arc<dyn PackageManager>> {
    let apt = AptManager::new(executor).with_timeout(settings.command_timeout);
    if apt.is_available().await {
        info!(manager = %apt.manager_type(), "detected package manager");
        return Ok(Arc::new(apt));
    }

    eyre::bail!("no supported package manager found (tried apt-get)")
}

/// HTTP client for the configured inventory service
pub fn create_client(settings: &Settings) -> Result<HttpClient> {
    HttpClient::with_timeout(
        settings.base_url.as_str(),
        settings.host_token.as_str(),
        settings.request_timeout,
    )
    .map_err(|e| eyre::eyre!("failed to create inventory client: {e}"))
}

/// Reconciler bound to the local package manager and the inventory service
pub async fn create_reconciler(settings: &Settings, client: HttpClient) -> Result<Reconciler> {
    let executor: Arc<dyn CommandExecutor> = Arc::new(LocalExecutor::new());
    let package_manager = detect_package_manager(executor, settings).await?;
    Ok(Reconciler::new(package_manager, Arc::new(client)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use skyline_core::SchedulerConfig;
    use skyline_exec::{CommandOutput, ExecError};

    use super::*;

    struct StubExecutor {
        status: i32,
    }

    #[async_trait]
    impl CommandExecutor for StubExecutor {
        async fn run(&self, _program: &str, _args: &[&str]) -> Result<CommandOutput, ExecError> {
            Ok(CommandOutput {
                status: self.status,
                stdout: String::new(),
                stderr: String::new(),
                duration: Duration::ZERO,
            })
        }

        async fn run_with_timeout(
            &self,
            program: &str,
            args: &[&str],
            _timeout: Duration,
        ) -> Result<CommandOutput, ExecError> {
            self.run(program, args).await
        }
    }

    fn settings() -> Settings {
        Settings {
            base_url: "http://localhost:8080/".parse().unwrap(),
            host_token: "token".to_string(),
            request_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(120),
            scheduler: SchedulerConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_detects_apt() {
        let manager = detect_package_manager(Arc::new(StubExecutor { status: 0 }), &settings())
            .await
            .unwrap();

        assert_eq!(manager.manager_type().to_string(), "apt");
    }

    #[tokio::test]
    async fn test_no_package_manager() {
        let result = detect_package_manager(Arc::new(StubExecutor { status: 1 }), &settings()).await;

        assert!(result.is_err());
    }

    #[test]
    fn test_create_client() {
        let client = create_client(&settings()).unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8080/");
    }
}
