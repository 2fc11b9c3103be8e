use super::{runtime, ConfigPaths};
use common::error::DwhError;
use log::info;
use orchestrator::open_executor;
use shared_clients::PostgresAdapterFactory;

/// Needs the endpoint and role ARN recorded by a previous `dwh up`.
pub fn handle_create_tables(paths: &ConfigPaths) -> Result<(), DwhError> {
    let config = paths.load_config()?;
    let runtime = runtime()?;

    runtime.block_on(async {
        let mut executor = open_executor(&config, &PostgresAdapterFactory).await?;
        let report = executor.recreate_tables().await.map_err(DwhError::etl)?;
        info!("{} statements executed.", report.statements());
        Ok(())
    })
}

pub fn handle_etl(paths: &ConfigPaths) -> Result<(), DwhError> {
    let config = paths.load_config()?;
    let runtime = runtime()?;

    runtime.block_on(async {
        let mut executor = open_executor(&config, &PostgresAdapterFactory).await?;
        let report = executor.run_etl().await.map_err(DwhError::etl)?;
        info!("{} statements executed.", report.statements());
        Ok(())
    })
}
