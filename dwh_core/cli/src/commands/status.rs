use super::{aws_clients, runtime, ConfigPaths};
use clap::Args;
use common::error::DwhError;
use common::types::Lookup;
use log::info;
use provisioner::inspector;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the full role and cluster reports
    #[arg(long)]
    pub details: bool,
}

pub fn handle_status(args: &StatusArgs, paths: &ConfigPaths) -> Result<(), DwhError> {
    let config = paths.load_config()?;
    let runtime = runtime()?;

    runtime.block_on(async {
        let (iam, redshift) = aws_clients(&config, paths).await?;

        let role = &config.iam_role.name;
        let role_exists = inspector::role_exists(&iam, role, args.details)
            .await
            .map_err(DwhError::provision)?;
        info!("Role '{role}' exists: {role_exists}.");

        let cluster = &config.cluster.identifier;
        match inspector::cluster_status(&redshift, cluster)
            .await
            .map_err(DwhError::provision)?
        {
            Lookup::Found(status) => {
                if args.details {
                    inspector::cluster_exists(&redshift, cluster, true)
                        .await
                        .map_err(DwhError::provision)?;
                }
                info!("Cluster '{cluster}' status: {status}.");
            }
            Lookup::NotFound => info!("Cluster '{cluster}' does not exist."),
        }
        Ok(())
    })
}
