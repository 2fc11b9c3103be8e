//! Control-plane clients for the two AWS services this system talks to.
//!
//! The traits are the seam the provisioner works against; the `Aws*`
//! implementations wrap the official SDK clients.

mod iam;
mod redshift;

pub use iam::AwsIamClient;
pub use redshift::AwsRedshiftClient;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use chrono::{DateTime, Utc};
use common::config::components::aws::Credentials;
use common::error::diagnostics::DiagnosticMessage;
use common::types::{ClusterDetails, RoleDetails};
use thiserror::Error;

const CREDENTIALS_PROVIDER_NAME: &str = "dwh-secrets-file";

#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("resource not found: {context}")]
    NotFound { context: DiagnosticMessage },
    #[error("request rejected: {context}")]
    Rejected { context: DiagnosticMessage },
    #[error("unexpected control-plane failure: {context}")]
    Unexpected { context: DiagnosticMessage },
}

impl ControlPlaneError {
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ControlPlaneError::NotFound { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRoleRequest {
    pub role_name: String,
    pub path: String,
    pub description: String,
    pub assume_role_policy_document: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateClusterRequest {
    pub cluster_type: String,
    pub node_type: String,
    pub number_of_nodes: i32,
    pub db_name: String,
    pub cluster_identifier: String,
    pub master_username: String,
    pub master_user_password: String,
    pub port: i32,
    pub iam_roles: Vec<String>,
}

#[async_trait]
pub trait IamControlPlane: Send + Sync {
    /// Fails with [`ControlPlaneError::NotFound`] when the role is absent.
    async fn get_role(&self, role_name: &str) -> Result<RoleDetails, ControlPlaneError>;
    async fn create_role(
        &self,
        request: &CreateRoleRequest,
    ) -> Result<RoleDetails, ControlPlaneError>;
    async fn attach_role_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<(), ControlPlaneError>;
}

#[async_trait]
pub trait RedshiftControlPlane: Send + Sync {
    /// Fails with [`ControlPlaneError::NotFound`] when the identifier is unknown.
    async fn describe_cluster(&self, identifier: &str)
        -> Result<ClusterDetails, ControlPlaneError>;
    async fn create_cluster(
        &self,
        request: &CreateClusterRequest,
    ) -> Result<ClusterDetails, ControlPlaneError>;
}

/// Shared SDK configuration pinned to the secrets-file credentials.
pub async fn sdk_config(credentials: &Credentials, region: &str) -> SdkConfig {
    let provider = aws_sdk_iam::config::Credentials::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.clone(),
        None,
        None,
        CREDENTIALS_PROVIDER_NAME,
    );

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .credentials_provider(provider)
        .load()
        .await
}

/// Service errors become `Rejected`; transport, timeout and response
/// failures become `Unexpected`.
pub(crate) fn classify_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> ControlPlaneError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    match err.as_service_error() {
        Some(service) => ControlPlaneError::rejected(format!(
            "{} rejected ({}): {}",
            operation,
            service.code().unwrap_or("unknown"),
            service.message().unwrap_or("no message"),
        )),
        None => ControlPlaneError::unexpected(format!(
            "{} failed: {}",
            operation,
            DisplayErrorContext(&err)
        )),
    }
}

pub(crate) fn to_utc(value: &aws_sdk_iam::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}
