//! Configuration types for the reconciliation loop

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default time between reconciliation cycles
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// What to do when the package manager cannot be queried
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalFailurePolicy {
    /// Stop the scheduler and report the error
    #[default]
    Exit,
    /// Log the error and wait for the next tick
    SkipCycle,
}

/// Scheduler settings
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between cycle starts
    pub interval: Duration,
    /// Reaction to package manager failures
    pub on_local_failure: LocalFailurePolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            on_local_failure: LocalFailurePolicy::default(),
        }
    }
}
