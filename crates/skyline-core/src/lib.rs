//! skyline-core: Reconciliation of local package upgrades with the inventory service
//!
//! The [`Reconciler`] detects pending upgrades, publishes them and prunes stale
//! remote records. [`AgentActor`] serialises reconciliation cycles and the
//! [`Scheduler`] drives it on a fixed interval until shut down.

pub mod actor;
pub mod config;
pub mod error;
pub mod message;
pub mod reconcile;
pub mod remote;
pub mod scheduler;

pub use actor::agent::{AgentActor, AgentActorArgs};
pub use config::{LocalFailurePolicy, SchedulerConfig};
pub use error::CoreError;
pub use message::{AgentStatus, GetStatus, SyncOnce};
pub use reconcile::{PruneOutcome, PublishOutcome, Reconciler, SyncReport, UpdateSet};
pub use remote::InventoryService;
pub use scheduler::{Scheduler, ShutdownHandle};
