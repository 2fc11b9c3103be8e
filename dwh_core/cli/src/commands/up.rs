use super::{aws_clients, runtime, ConfigPaths};
use clap::Args;
use common::error::DwhError;
use log::{info, warn};
use orchestrator::decision::{AutoAnswer, AutoDecisions, DecisionProvider, StdinDecisions};
use orchestrator::{Collaborators, Orchestrator, RunOutcome};
use provisioner::waiter::{AvailabilityWaiter, DEFAULT_POLL_INTERVAL};
use shared_clients::PostgresAdapterFactory;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 128 + SIGINT, as a shell reports a process killed by Ctrl-C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Args, Debug)]
pub struct UpArgs {
    /// Answer every prompt affirmatively (wait, then run the ETL)
    #[arg(long, conflicts_with = "no")]
    pub yes: bool,
    /// Answer every prompt negatively (do not wait, do not run the ETL)
    #[arg(long)]
    pub no: bool,
    /// Seconds between two cluster status checks
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub poll_interval_secs: u64,
    /// Give up waiting for the cluster after this many seconds
    #[arg(long)]
    pub wait_timeout_secs: Option<u64>,
}

impl Default for UpArgs {
    fn default() -> Self {
        Self {
            yes: false,
            no: false,
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            wait_timeout_secs: None,
        }
    }
}

impl UpArgs {
    fn decisions(&self) -> Box<dyn DecisionProvider> {
        if self.yes {
            Box::new(AutoDecisions::new(AutoAnswer::Affirmative))
        } else if self.no {
            Box::new(AutoDecisions::new(AutoAnswer::Negative))
        } else {
            Box::new(StdinDecisions::stdin())
        }
    }

    fn waiter(&self) -> AvailabilityWaiter {
        AvailabilityWaiter::new(Duration::from_secs(self.poll_interval_secs))
            .with_timeout(self.wait_timeout_secs.map(Duration::from_secs))
    }
}

pub fn handle_up(args: &UpArgs, paths: &ConfigPaths) -> Result<(), DwhError> {
    let config = paths.load_config()?;
    let runtime = runtime()?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupt received, stopping the run. Press Ctrl-C again to exit immediately.");
        on_interrupt.cancel();
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });

    let outcome = runtime.block_on(async {
        let (iam, redshift) = aws_clients(&config, paths).await?;
        let clients = Collaborators {
            iam: Arc::new(iam),
            redshift: Arc::new(redshift),
            adapters: Arc::new(PostgresAdapterFactory),
        };

        Orchestrator::new(config, clients, args.decisions())
            .with_waiter(args.waiter())
            .with_cancellation(cancel)
            .run()
            .await
    })?;

    match outcome {
        RunOutcome::Completed(report) => info!(
            "Warehouse loaded: {} statements over {} pipelines.",
            report.statements(),
            report.executed.len()
        ),
        RunOutcome::Quit => info!("Exiting while the cluster is still being created."),
        RunOutcome::EtlDeclined => info!("Exiting without touching the tables."),
    }
    Ok(())
}
