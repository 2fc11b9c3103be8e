use crate::config::components::aws::AwsSettings;
use crate::config::components::cluster::ClusterParams;
use crate::config::components::connections::ConnectionDetails;
use crate::config::components::iam_role::IamRoleSettings;
use crate::config::components::s3::S3Settings;
use crate::config::error::ConfigError;
use std::path::{Path, PathBuf};

// ---------------- global config ----------------
/// Parsed `dwh.toml` plus the path it was read from, so that values assigned
/// by the control plane can be written back to the same file.
#[derive(Debug, Clone)]
pub struct DwhConfig {
    pub path: PathBuf,
    pub aws: AwsSettings,
    pub iam_role: IamRoleSettings,
    pub cluster: ClusterParams,
    pub s3: S3Settings,
}

impl DwhConfig {
    pub fn new(
        path: PathBuf,
        aws: AwsSettings,
        iam_role: IamRoleSettings,
        cluster: ClusterParams,
        s3: S3Settings,
    ) -> Self {
        Self {
            path,
            aws,
            iam_role,
            cluster,
            s3,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn role_arn(&self) -> Result<&str, ConfigError> {
        self.iam_role.arn.as_deref().ok_or_else(|| {
            ConfigError::not_found(format!(
                "role '{}' has no ARN recorded; provision the role first",
                self.iam_role.name
            ))
        })
    }

    pub fn set_role_arn(&mut self, arn: impl Into<String>) {
        self.iam_role.arn = Some(arn.into());
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.cluster.endpoint = Some(endpoint.into());
    }

    /// Region handed to `COPY`; the bucket region wins over the AWS region.
    pub fn copy_region(&self) -> &str {
        self.s3.region.as_deref().unwrap_or(&self.aws.region)
    }

    pub fn connection_details(&self) -> Result<ConnectionDetails, ConfigError> {
        let host = self.cluster.endpoint.as_deref().ok_or_else(|| {
            ConfigError::not_found(format!(
                "cluster '{}' has no endpoint recorded; wait for it to become available",
                self.cluster.identifier
            ))
        })?;

        Ok(ConnectionDetails::new(
            host,
            self.cluster.port,
            &self.cluster.db_name,
            &self.cluster.master_username,
            &self.cluster.master_password,
        ))
    }
}
