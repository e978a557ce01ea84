//! One reconciliation cycle: detect, publish, prune

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::sync::Arc;
use std::time::{Duration, Instant};

use skyline_api::UpdateRecord;
use skyline_pkg::parser::parse_simulation;
use skyline_pkg::traits::PackageManager;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::error::CoreError;
use crate::remote::InventoryService;

/// Local snapshot of pending updates, keyed by package name
///
/// Versions play no part in identity: inserting a record for a package that is
/// already present replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSet {
    updates: BTreeMap<String, UpdateRecord>,
}

impl UpdateSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the one it replaced
    pub fn insert(&mut self, update: UpdateRecord) -> Option<UpdateRecord> {
        self.updates.insert(update.package_name.clone(), update)
    }

    /// Check whether a package is pending
    #[must_use]
    pub fn contains(&self, package_name: &str) -> bool {
        self.updates.contains_key(package_name)
    }

    #[must_use]
    pub fn get(&self, package_name: &str) -> Option<&UpdateRecord> {
        self.updates.get(package_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Records in package name order
    pub fn iter(&self) -> btree_map::Values<'_, String, UpdateRecord> {
        self.updates.values()
    }

    /// Number of pending security updates
    #[must_use]
    pub fn security_count(&self) -> usize {
        self.iter().filter(|u| u.is_security).count()
    }
}

impl FromIterator<UpdateRecord> for UpdateSet {
    fn from_iter<I: IntoIterator<Item = UpdateRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        for update in iter {
            set.insert(update);
        }
        set
    }
}

impl<'a> IntoIterator for &'a UpdateSet {
    type Item = &'a UpdateRecord;
    type IntoIter = btree_map::Values<'a, String, UpdateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Result of publishing the local set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Records the service accepted
    pub published: usize,
    /// Package names whose create call failed
    pub failed: Vec<String>,
}

/// Result of pruning stale remote records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneOutcome {
    /// Remote records could not be listed; nothing was deleted
    Skipped {
        /// Why the listing failed
        reason: String,
    },
    /// Listing succeeded and stale records were processed
    Completed {
        /// Package names deleted from the service
        deleted: Vec<String>,
        /// Package names whose delete call failed
        failed: Vec<String>,
    },
}

impl PruneOutcome {
    /// Number of records deleted remotely
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        match self {
            PruneOutcome::Skipped { .. } => 0,
            PruneOutcome::Completed { deleted, .. } => deleted.len(),
        }
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, PruneOutcome::Skipped { .. })
    }
}

/// Summary of one reconciliation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Pending updates detected locally
    pub detected: usize,
    /// Of which security updates
    pub security: usize,
    /// Outcome of the publish step
    pub publish: PublishOutcome,
    /// Outcome of the prune step
    pub prune: PruneOutcome,
    /// Wall-clock time of the cycle
    pub duration: Duration,
}

impl SyncReport {
    /// Whether every remote call of the cycle succeeded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.publish.failed.is_empty()
            && matches!(&self.prune, PruneOutcome::Completed { failed, .. } if failed.is_empty())
    }
}

/// Reconciles locally pending updates with the inventory service
///
/// Holds no state between cycles; every call re-detects and re-lists.
#[derive(Clone)]
pub struct Reconciler {
    package_manager: Arc<dyn PackageManager>,
    inventory: Arc<dyn InventoryService>,
}

impl Reconciler {
    pub fn new(
        package_manager: Arc<dyn PackageManager>,
        inventory: Arc<dyn InventoryService>,
    ) -> Self {
        Self {
            package_manager,
            inventory,
        }
    }

    /// Detect pending updates on this host
    ///
    /// # Errors
    /// Returns `CoreError::LocalCapability` if the package manager fails.
    #[instrument(skip(self))]
    pub async fn collect_local_updates(&self) -> Result<UpdateSet, CoreError> {
        let output = self.package_manager.simulate_upgrade().await.map_err(|e| {
            error!(stage = "collect", error = %e, "failed to simulate upgrade");
            CoreError::from(e)
        })?;

        let updates: UpdateSet = parse_simulation(&output).collect();

        debug!(
            count = updates.len(),
            security = updates.security_count(),
            "collected local updates"
        );

        Ok(updates)
    }

    /// Create or refresh every local record on the service
    ///
    /// Each record is sent independently; failures are logged and counted.
    #[instrument(skip_all, fields(count = local.len()))]
    pub async fn publish(&self, local: &UpdateSet) -> PublishOutcome {
        let mut outcome = PublishOutcome::default();

        for update in local {
            if update.package_name.is_empty() {
                warn!(
                    stage = "publish",
                    new_version = %update.new_version,
                    "skipping update without a package name"
                );
                continue;
            }

            match self.inventory.create_update(update).await {
                Ok(()) => {
                    outcome.published += 1;
                    trace!(
                        stage = "publish",
                        package = %update.package_name,
                        current_version = %update.current_version,
                        new_version = %update.new_version,
                        security = update.is_security,
                        "updated available update on server"
                    );
                }
                Err(e) => {
                    warn!(
                        stage = "publish",
                        package = %update.package_name,
                        error = %e,
                        "failed to publish update"
                    );
                    outcome.failed.push(update.package_name.clone());
                }
            }
        }

        outcome
    }

    /// Delete remote records whose package is no longer pending locally
    ///
    /// If the remote listing fails the step is skipped for this cycle.
    #[instrument(skip_all, fields(count = local.len()))]
    pub async fn prune(&self, local: &UpdateSet) -> PruneOutcome {
        let remote = match self.inventory.list_updates().await {
            Ok(remote) => remote,
            Err(e) => {
                error!(
                    stage = "prune",
                    error = %e,
                    "failed to get list of existing updates from server"
                );
                return PruneOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        let mut deleted = Vec::new();
        let mut failed = Vec::new();

        for update in remote.iter().filter(|u| !local.contains(&u.package_name)) {
            if update.package_name.is_empty() {
                warn!(
                    stage = "prune",
                    "remote update has no package name, not deleting"
                );
                continue;
            }

            info!(
                stage = "prune",
                package = %update.package_name,
                "deleting update from server"
            );

            match self.inventory.delete_update(update).await {
                Ok(()) => deleted.push(update.package_name.clone()),
                Err(e) => {
                    warn!(
                        stage = "prune",
                        package = %update.package_name,
                        error = %e,
                        "failed to delete update"
                    );
                    failed.push(update.package_name.clone());
                }
            }
        }

        PruneOutcome::Completed { deleted, failed }
    }

    /// Run collect, publish and prune in that order
    ///
    /// # Errors
    /// Only a local detection failure is returned; remote failures are
    /// reported in the [`SyncReport`].
    #[instrument(skip(self))]
    pub async fn sync_once(&self) -> Result<SyncReport, CoreError> {
        let start = Instant::now();

        let local = self.collect_local_updates().await?;

        info!(count = local.len(), "posting new updates to the server");
        let publish = self.publish(&local).await;

        info!("pruning updates from the server");
        let prune = self.prune(&local).await;

        let report = SyncReport {
            detected: local.len(),
            security: local.security_count(),
            publish,
            prune,
            duration: start.elapsed(),
        };

        info!(
            detected = report.detected,
            security = report.security,
            published = report.publish.published,
            publish_failures = report.publish.failed.len(),
            deleted = report.prune.deleted_count(),
            prune_skipped = report.prune.is_skipped(),
            duration = ?report.duration,
            "sync cycle finished"
        );

        Ok(report)
    }
}
