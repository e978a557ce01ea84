//! Message types for actor communication
//!
//! Message handlers are implemented in their respective actor modules.

use chrono::{DateTime, Utc};
use kameo_macros::Reply;

use crate::reconcile::SyncReport;

/// Run one reconciliation cycle
#[derive(Debug)]
pub struct SyncOnce;

/// Get the agent's cycle history summary
#[derive(Debug)]
pub struct GetStatus;

/// Agent status response
#[derive(Debug, Clone, Reply)]
pub struct AgentStatus {
    /// Cycles attempted since start
    pub cycles: u64,
    /// Cycles that ended with an error
    pub failed_cycles: u64,
    /// Report of the last successful cycle
    pub last_report: Option<SyncReport>,
    /// Error of the last cycle, if it failed
    pub last_error: Option<String>,
    /// When the last cycle finished
    pub last_sync: Option<DateTime<Utc>>,
}
