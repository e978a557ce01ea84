//! Fixed-interval driver for the agent actor

use kameo::actor::ActorRef;
use kameo::error::SendError;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::actor::agent::AgentActor;
use crate::config::{LocalFailurePolicy, SchedulerConfig};
use crate::error::CoreError;
use crate::message::SyncOnce;

/// Handle used to stop a running [`Scheduler`]
///
/// Dropping the handle also stops the scheduler.
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    /// Ask the scheduler to stop after the current cycle
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

/// Runs a reconciliation cycle on every tick until shut down
///
/// Each cycle is awaited before the next tick is taken; ticks that elapse
/// while a cycle is running are skipped rather than queued.
pub struct Scheduler {
    config: SchedulerConfig,
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    /// Create a scheduler and the handle that stops it
    #[must_use]
    pub fn new(config: SchedulerConfig) -> (Self, ShutdownHandle) {
        let (tx, shutdown) = watch::channel(false);
        (Self { config, shutdown }, ShutdownHandle { tx })
    }

    /// Drive `agent` until shutdown
    ///
    /// Returns the number of cycles run.
    ///
    /// # Errors
    /// Returns the cycle error if the package manager fails under
    /// [`LocalFailurePolicy::Exit`], or if the actor can no longer be reached.
    pub async fn run(mut self, agent: ActorRef<AgentActor>) -> Result<u64, CoreError> {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval = ?self.config.interval,
            policy = ?self.config.on_local_failure,
            "scheduler started"
        );

        let mut cycles = 0u64;

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        debug!("shutdown handle dropped");
                    }
                    break;
                }
                _ = ticker.tick() => {}
            }

            cycles += 1;
            match agent.ask(SyncOnce).await {
                Ok(_) => {}
                Err(SendError::HandlerError(e)) => self.handle_cycle_error(e)?,
                Err(e) => return Err(CoreError::ActorError(e.to_string())),
            }
        }

        info!(cycles, "scheduler stopped");
        Ok(cycles)
    }

    fn handle_cycle_error(&self, err: CoreError) -> Result<(), CoreError> {
        if err.is_local_failure() && self.config.on_local_failure == LocalFailurePolicy::Exit {
            error!(error = %err, "package manager failure, stopping agent");
            return Err(err);
        }

        warn!(error = %err, "skipping failed cycle");
        Ok(())
    }
}
