//! End-to-end sequencing: provision the role and cluster, wait for the
//! cluster, record the values the control plane assigned, then (once the
//! operator agrees) rebuild and load the warehouse.

pub mod decision;

use crate::decision::{DecisionProvider, QUIT, WAIT_OR_QUIT, YES, YES_OR_NO};
use common::config::components::global::DwhConfig;
use common::config::components::{
    CLUSTER_ENDPOINT_KEY, CLUSTER_SECTION, IAM_ROLE_SECTION, ROLE_ARN_KEY,
};
use common::config::store;
use common::error::DwhError;
use common::types::{ClusterStatus, Lookup};
use executor::sql::{CopySources, SqlCatalog};
use executor::{EtlExecutor, ExecutorError, PipelineReport, ETL_PIPELINES, RECREATE_PIPELINES};
use log::info;
use provisioner::inspector;
use provisioner::provision;
use provisioner::waiter::AvailabilityWaiter;
use shared_clients::aws::{IamControlPlane, RedshiftControlPlane};
use shared_clients::{AdapterFactory, AsyncDbAdapter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(PipelineReport),
    /// The operator chose not to wait for a cluster still being created.
    Quit,
    EtlDeclined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterReadiness {
    Ready { endpoint: String },
    Quit,
}

/// The external systems the orchestrator drives.
#[derive(Clone)]
pub struct Collaborators {
    pub iam: Arc<dyn IamControlPlane>,
    pub redshift: Arc<dyn RedshiftControlPlane>,
    pub adapters: Arc<dyn AdapterFactory>,
}

pub struct Orchestrator {
    config: DwhConfig,
    clients: Collaborators,
    decisions: Box<dyn DecisionProvider>,
    waiter: AvailabilityWaiter,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        config: DwhConfig,
        clients: Collaborators,
        decisions: Box<dyn DecisionProvider>,
    ) -> Self {
        Self {
            config,
            clients,
            decisions,
            waiter: AvailabilityWaiter::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_waiter(mut self, waiter: AvailabilityWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &DwhConfig {
        &self.config
    }

    /// Ensure the role exists and record its ARN, attach the storage policy,
    /// then ensure the cluster exists.
    pub async fn provision(&mut self) -> Result<(), DwhError> {
        let role_name = self.config.iam_role.name.clone();
        let arn = provision::ensure_role(self.clients.iam.as_ref(), &role_name)
            .await
            .map_err(DwhError::provision)?
            .into_inner();

        store::update(self.config.path(), IAM_ROLE_SECTION, ROLE_ARN_KEY, &arn)?;
        self.config.set_role_arn(arn.clone());
        info!("Config file '{}' updated with role arn.", self.config.path().display());

        let policy_arn = self.config.iam_role.policy_arn.clone();
        provision::attach_policy(self.clients.iam.as_ref(), &role_name, &policy_arn)
            .await
            .map_err(DwhError::provision)?;

        provision::ensure_cluster(
            self.clients.redshift.as_ref(),
            &self.config.cluster,
            &arn,
        )
        .await
        .map_err(DwhError::provision)?;
        Ok(())
    }

    /// Bring the cluster to `available` and record its endpoint.
    pub async fn await_cluster(&mut self) -> Result<ClusterReadiness, DwhError> {
        let cluster_id = self.config.cluster.identifier.clone();
        let redshift = self.clients.redshift.clone();

        let mut status = match inspector::cluster_status(redshift.as_ref(), &cluster_id)
            .await
            .map_err(DwhError::provision)?
        {
            Lookup::Found(status) => status,
            Lookup::NotFound => {
                return Err(DwhError::provision_msg(format!(
                    "cluster '{cluster_id}' cannot be found"
                )))
            }
        };

        if status.is_creating() {
            let prompt = format!(
                "Cluster '{cluster_id}' is being created.\n\
                 This can take several minutes. Do you want to Wait (W) or Exit (Q)?"
            );
            let choice = self
                .decisions
                .choose(&prompt, &WAIT_OR_QUIT)
                .map_err(DwhError::prompt)?;
            self.check_cancelled("at the wait prompt")?;
            if choice == QUIT {
                info!("Leaving cluster '{cluster_id}' to finish creating.");
                return Ok(ClusterReadiness::Quit);
            }

            status = self
                .waiter
                .wait(redshift.as_ref(), &cluster_id, status, &self.cancel)
                .await
                .map_err(DwhError::wait)?
                .status;
        }

        if status != ClusterStatus::Available {
            return Err(DwhError::cluster_unavailable(&cluster_id, status.as_str()));
        }

        let endpoint = inspector::cluster_details(redshift.as_ref(), &cluster_id)
            .await
            .map_err(DwhError::provision)?
            .found()
            .and_then(|cluster| cluster.endpoint)
            .ok_or_else(|| {
                DwhError::provision_msg(format!(
                    "cluster '{cluster_id}' is available but reports no endpoint"
                ))
            })?;

        store::update(
            self.config.path(),
            CLUSTER_SECTION,
            CLUSTER_ENDPOINT_KEY,
            &endpoint,
        )?;
        self.config.set_endpoint(endpoint.clone());
        Ok(ClusterReadiness::Ready { endpoint })
    }

    /// Ask before wiping and reloading the warehouse.
    pub fn confirm_etl(&mut self) -> Result<bool, DwhError> {
        let prompt = format!(
            "Cluster '{}' is available. Drop and recreate every table, then load the data? (Y/N)",
            self.config.cluster.identifier
        );
        let choice = self
            .decisions
            .choose(&prompt, &YES_OR_NO)
            .map_err(DwhError::prompt)?;
        self.check_cancelled("at the ETL prompt")?;
        Ok(choice == YES)
    }

    /// Prompts block the thread, so an interrupt raised while one is open is
    /// only seen once the answer comes back.
    fn check_cancelled(&self, step: &str) -> Result<(), DwhError> {
        if self.cancel.is_cancelled() {
            return Err(DwhError::interrupted(step));
        }
        Ok(())
    }

    /// The whole run stops at its next await point once the cancellation
    /// token fires; statements already executed stay committed.
    pub async fn run(&mut self) -> Result<RunOutcome, DwhError> {
        let cancel = self.cancel.clone();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DwhError::interrupted("while the run was in progress")),
            outcome = self.run_steps() => outcome,
        }
    }

    async fn run_steps(&mut self) -> Result<RunOutcome, DwhError> {
        self.provision().await?;

        if let ClusterReadiness::Quit = self.await_cluster().await? {
            return Ok(RunOutcome::Quit);
        }

        if !self.confirm_etl()? {
            info!("ETL declined; no table was touched.");
            return Ok(RunOutcome::EtlDeclined);
        }

        let mut executor = open_executor(&self.config, self.clients.adapters.as_ref()).await?;
        let mut report = PipelineReport::default();
        for pipeline in RECREATE_PIPELINES.iter().chain(ETL_PIPELINES.iter()) {
            self.check_cancelled(&format!("before the {pipeline} pipeline"))?;
            report.merge(
                executor
                    .run_pipeline(*pipeline)
                    .await
                    .map_err(DwhError::etl)?,
            );
        }
        info!("The End.");
        Ok(RunOutcome::Completed(report))
    }
}

/// Connect to the warehouse described by `config` and prepare its statements.
pub async fn open_executor(
    config: &DwhConfig,
    adapters: &dyn AdapterFactory,
) -> Result<EtlExecutor<AsyncDbAdapter>, DwhError> {
    let sources = CopySources::from_config(config)?;
    let conn_details = config.connection_details()?;
    let adapter = adapters
        .connect(&conn_details)
        .await
        .map_err(|err| DwhError::etl(ExecutorError::failed_to_connect(err)))?;
    info!("Connection established with {}.", conn_details.host);
    Ok(EtlExecutor::new(adapter, SqlCatalog::new(sources)))
}
