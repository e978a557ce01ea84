//! Package manager traits

use async_trait::async_trait;
use skyline_api::UpdateRecord;

use crate::error::PackageError;
use crate::types::PackageManagerType;

#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Full textual output of a simulated upgrade
    async fn simulate_upgrade(&self) -> Result<String, PackageError>;

    /// Pending upgrades parsed from a simulated upgrade
    async fn list_upgradable(&self) -> Result<Vec<UpdateRecord>, PackageError> {
        let output = self.simulate_upgrade().await?;
        Ok(crate::parser::parse_simulation(&output).collect())
    }

    fn manager_type(&self) -> PackageManagerType;

    async fn is_available(&self) -> bool;
}
