mod status;
mod tables;
mod up;

pub use status::{handle_status, StatusArgs};
pub use tables::{handle_create_tables, handle_etl};
pub use up::{handle_up, UpArgs};

use common::config::components::global::DwhConfig;
use common::config::loader::{read_config, read_credentials};
use common::error::DwhError;
use shared_clients::aws::{sdk_config, AwsIamClient, AwsRedshiftClient};
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// Where the two configuration files live.
pub struct ConfigPaths {
    config_dir: Option<PathBuf>,
    secrets_path: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn new(config_dir: Option<PathBuf>, secrets_path: Option<PathBuf>) -> Self {
        Self {
            config_dir,
            secrets_path,
        }
    }

    fn load_config(&self) -> Result<DwhConfig, DwhError> {
        let config = read_config(self.config_dir.clone())?;
        log::info!("Config data extracted from '{}'.", config.path().display());
        Ok(config)
    }
}

fn runtime() -> Result<Runtime, DwhError> {
    Runtime::new().map_err(DwhError::config)
}

async fn aws_clients(
    config: &DwhConfig,
    paths: &ConfigPaths,
) -> Result<(AwsIamClient, AwsRedshiftClient), DwhError> {
    let credentials = read_credentials(paths.secrets_path.clone(), paths.config_dir.as_deref())?;
    let sdk = sdk_config(&credentials, &config.aws.region).await;
    Ok((AwsIamClient::new(&sdk), AwsRedshiftClient::new(&sdk)))
}
