//! `AgentActor`: Serialised reconciliation for this host
//!
//! The mailbox handles one message at a time, so two cycles never run
//! concurrently even if several callers ask for one.

use chrono::{DateTime, Utc};
use kameo::actor::{ActorRef, WeakActorRef};
use kameo::error::ActorStopReason;
use kameo::message::{Context, Message};
use kameo::prelude::*;
use tracing::{error, info};

use crate::error::CoreError;
use crate::message::{AgentStatus, GetStatus, SyncOnce};
use crate::reconcile::{Reconciler, SyncReport};

/// Arguments for spawning an `AgentActor`
pub struct AgentActorArgs {
    /// Reconciler bound to the local package manager and remote service
    pub reconciler: Reconciler,
}

/// Actor owning the reconciler and the history of its cycles
pub struct AgentActor {
    reconciler: Reconciler,
    cycles: u64,
    failed_cycles: u64,
    last_report: Option<SyncReport>,
    last_error: Option<String>,
    last_sync: Option<DateTime<Utc>>,
}

impl AgentActor {
    fn record_success(&mut self, report: &SyncReport) {
        self.last_report = Some(report.clone());
        self.last_error = None;
        self.last_sync = Some(Utc::now());
    }

    fn record_failure(&mut self, err: &CoreError) {
        self.failed_cycles += 1;
        self.last_error = Some(err.to_string());
        self.last_sync = Some(Utc::now());
    }
}

impl Actor for AgentActor {
    type Args = AgentActorArgs;
    type Error = CoreError;

    async fn on_start(args: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!(id = %actor_ref.id(), "AgentActor starting");

        Ok(Self {
            reconciler: args.reconciler,
            cycles: 0,
            failed_cycles: 0,
            last_report: None,
            last_error: None,
            last_sync: None,
        })
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!(
            cycles = self.cycles,
            failed_cycles = self.failed_cycles,
            reason = ?reason,
            "AgentActor stopping"
        );

        Ok(())
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<SyncOnce> for AgentActor {
    type Reply = Result<SyncReport, CoreError>;

    async fn handle(
        &mut self,
        _msg: SyncOnce,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.cycles += 1;

        match self.reconciler.sync_once().await {
            Ok(report) => {
                self.record_success(&report);
                Ok(report)
            }
            Err(e) => {
                error!(cycle = self.cycles, error = %e, "sync cycle failed");
                self.record_failure(&e);
                Err(e)
            }
        }
    }
}

impl Message<GetStatus> for AgentActor {
    type Reply = AgentStatus;

    async fn handle(
        &mut self,
        _msg: GetStatus,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        AgentStatus {
            cycles: self.cycles,
            failed_cycles: self.failed_cycles,
            last_report: self.last_report.clone(),
            last_error: self.last_error.clone(),
            last_sync: self.last_sync,
        }
    }
}
