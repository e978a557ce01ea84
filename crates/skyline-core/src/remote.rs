//! Remote inventory service seam

use async_trait::async_trait;
use skyline_api::UpdateRecord;
use skyline_client::HttpClient;

use crate::error::CoreError;

/// Update records stored by the inventory service for this host
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Create or refresh the record for `update.package_name`
    async fn create_update(&self, update: &UpdateRecord) -> Result<(), CoreError>;

    /// Every record currently held for this host
    async fn list_updates(&self) -> Result<Vec<UpdateRecord>, CoreError>;

    /// Remove the record for `update.package_name`
    async fn delete_update(&self, update: &UpdateRecord) -> Result<(), CoreError>;
}

#[async_trait]
impl InventoryService for HttpClient {
    async fn create_update(&self, update: &UpdateRecord) -> Result<(), CoreError> {
        Ok(HttpClient::create_update(self, update).await?)
    }

    async fn list_updates(&self) -> Result<Vec<UpdateRecord>, CoreError> {
        Ok(HttpClient::list_updates(self).await?)
    }

    async fn delete_update(&self, update: &UpdateRecord) -> Result<(), CoreError> {
        Ok(HttpClient::delete_update(self, update).await?)
    }
}
