use super::{
    classify_sdk_error, to_utc, ControlPlaneError, CreateClusterRequest, RedshiftControlPlane,
};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_redshift::types::Cluster;
use aws_sdk_redshift::Client;
use common::types::{ClusterDetails, ClusterStatus};
use log::debug;

#[derive(Debug, Clone)]
pub struct AwsRedshiftClient {
    client: Client,
}

impl AwsRedshiftClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn cluster_details(fallback_identifier: &str, cluster: &Cluster) -> ClusterDetails {
    let endpoint = cluster.endpoint();
    ClusterDetails {
        identifier: cluster
            .cluster_identifier()
            .unwrap_or(fallback_identifier)
            .to_string(),
        status: ClusterStatus::from(cluster.cluster_status().unwrap_or("unknown")),
        db_name: cluster.db_name().map(str::to_string),
        master_username: cluster.master_username().map(str::to_string),
        endpoint: endpoint.and_then(|e| e.address()).map(str::to_string),
        port: endpoint
            .and_then(|e| e.port())
            .and_then(|p| u16::try_from(p).ok()),
        created: cluster.cluster_create_time().and_then(to_utc),
        availability_zone: cluster.availability_zone().map(str::to_string),
    }
}

#[async_trait]
impl RedshiftControlPlane for AwsRedshiftClient {
    async fn describe_cluster(
        &self,
        identifier: &str,
    ) -> Result<ClusterDetails, ControlPlaneError> {
        debug!("redshift describe-clusters {identifier}");
        let output = self
            .client
            .describe_clusters()
            .cluster_identifier(identifier)
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_cluster_not_found_fault())
                {
                    ControlPlaneError::not_found(format!(
                        "cluster '{identifier}' cannot be found"
                    ))
                } else {
                    classify_sdk_error("describe-clusters", err)
                }
            })?;

        output
            .clusters()
            .first()
            .map(|cluster| cluster_details(identifier, cluster))
            .ok_or_else(|| ControlPlaneError::not_found(format!("cluster '{identifier}' cannot be found")))
    }

    async fn create_cluster(
        &self,
        request: &CreateClusterRequest,
    ) -> Result<ClusterDetails, ControlPlaneError> {
        debug!("redshift create-cluster {}", request.cluster_identifier);
        let mut builder = self
            .client
            .create_cluster()
            .cluster_type(&request.cluster_type)
            .node_type(&request.node_type)
            .number_of_nodes(request.number_of_nodes)
            .db_name(&request.db_name)
            .cluster_identifier(&request.cluster_identifier)
            .master_username(&request.master_username)
            .master_user_password(&request.master_user_password)
            .port(request.port);
        for role in &request.iam_roles {
            builder = builder.iam_roles(role);
        }

        let output = builder
            .send()
            .await
            .map_err(|err| classify_sdk_error("create-cluster", err))?;

        output
            .cluster()
            .map(|cluster| cluster_details(&request.cluster_identifier, cluster))
            .ok_or_else(|| {
                ControlPlaneError::unexpected("create-cluster response carried no cluster")
            })
    }
}
