//! skyline agent
//!
//! Reports pending package upgrades of this host to the skyline inventory
//! service and removes records for upgrades that are no longer pending.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use kameo::actor::Spawn;
use skyline_core::{AgentActor, AgentActorArgs, Scheduler, SyncOnce};
use tracing::{error, info};

mod config;
mod factory;
mod telemetry;

use config::{Config, LogFormat};

/// skyline host agent
#[derive(Parser, Debug)]
#[command(name = "skyline-agent", version, about)]
struct Args {
    /// Configuration file
    #[arg(short, long, env = "SKYLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Run a single reconciliation cycle and exit
    #[arg(long)]
    once: bool,

    /// Validate configuration, check the inventory service and exit
    #[arg(long, conflicts_with = "once")]
    check: bool,

    /// Seconds between cycles
    #[arg(long, value_name = "SECONDS")]
    interval: Option<u64>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(interval) = self.interval {
            config.agent.interval_secs = interval;
        }
        if let Some(format) = self.log_format {
            config.log.format = format;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let mut config = Config::load_default(args.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    args.apply(&mut config);

    telemetry::init(&config.log);

    let settings = config.validate().inspect_err(|e| {
        error!(stage = "initialization", error = %e, "invalid configuration");
    })?;
    let client = factory::create_client(&settings)?;

    if args.check {
        let health = client.health().await?;
        info!(status = %health.status, base_url = %settings.base_url, "inventory service reachable");
        return Ok(());
    }

    let reconciler = factory::create_reconciler(&settings, client).await?;
    let agent = AgentActor::spawn(AgentActorArgs { reconciler });

    let result = if args.once {
        match agent.ask(SyncOnce).await {
            Ok(_) => Ok(()),
            Err(e) => Err(eyre::eyre!("sync cycle failed: {e}")),
        }
    } else {
        run_scheduler(&settings, &agent).await
    };

    agent.stop_gracefully().await.ok();

    result
}

/// Drive the agent until a shutdown signal or a fatal cycle error
async fn run_scheduler(
    settings: &config::Settings,
    agent: &kameo::actor::ActorRef<AgentActor>,
) -> Result<()> {
    let (scheduler, shutdown) = Scheduler::new(settings.scheduler.clone());
    let mut running = tokio::spawn(scheduler.run(agent.clone()));

    let cycles = tokio::select! {
        finished = &mut running => finished??,
        () = shutdown_signal() => {
            info!("shutdown requested, finishing current cycle");
            shutdown.shutdown();
            running.await??
        }
    };

    info!(cycles, "agent stopped");
    Ok(())
}

/// Wait for ctrl-c or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
