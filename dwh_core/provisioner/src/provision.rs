use crate::inspector;
use crate::ProvisionError;
use common::config::components::cluster::ClusterParams;
use common::types::{ClusterDetails, Lookup};
use log::{error, info};
use serde_json::json;
use shared_clients::aws::{
    CreateClusterRequest, CreateRoleRequest, IamControlPlane, RedshiftControlPlane,
};

pub const ROLE_PATH: &str = "/";
pub const ROLE_DESCRIPTION: &str = "Allows Redshift clusters to call AWS services on your behalf.";
const POLICY_VERSION: &str = "2012-10-17";
const WAREHOUSE_SERVICE_PRINCIPAL: &str = "redshift.amazonaws.com";

/// Whether a resource was created by this call or was already there.
#[derive(Debug, Clone, PartialEq)]
pub enum Provisioned<T> {
    Created(T),
    Existing(T),
}

impl<T> Provisioned<T> {
    pub fn into_inner(self) -> T {
        match self {
            Provisioned::Created(value) | Provisioned::Existing(value) => value,
        }
    }
}

/// Trust policy letting the warehouse service assume the role.
pub fn trust_policy() -> String {
    json!({
        "Statement": [{
            "Action": "sts:AssumeRole",
            "Effect": "Allow",
            "Principal": { "Service": WAREHOUSE_SERVICE_PRINCIPAL }
        }],
        "Version": POLICY_VERSION
    })
    .to_string()
}

/// Create `role_name` and return its ARN. Does not check for an existing
/// role first; the control plane rejects duplicates.
pub async fn create_role<I>(iam: &I, role_name: &str) -> Result<String, ProvisionError>
where
    I: IamControlPlane + ?Sized,
{
    info!("Creating a new IAM Role");
    let request = CreateRoleRequest {
        role_name: role_name.to_string(),
        path: ROLE_PATH.to_string(),
        description: ROLE_DESCRIPTION.to_string(),
        assume_role_policy_document: trust_policy(),
    };

    match iam.create_role(&request).await {
        Ok(role) => {
            info!("Role {} created successfully, ARN: {}", role_name, role.arn);
            Ok(role.arn)
        }
        Err(err) => {
            error!("Failed to create role {role_name}: {err}");
            Err(err.into())
        }
    }
}

pub async fn attach_policy<I>(iam: &I, role_name: &str, policy_arn: &str) -> Result<(), ProvisionError>
where
    I: IamControlPlane + ?Sized,
{
    iam.attach_role_policy(role_name, policy_arn).await?;
    info!("Policy {policy_arn} attached to role {role_name}");
    Ok(())
}

/// Build the creation request from the `CLUSTER` section.
pub fn cluster_request(
    params: &ClusterParams,
    role_arn: &str,
) -> Result<CreateClusterRequest, ProvisionError> {
    let number_of_nodes = i32::try_from(params.num_nodes).map_err(|_| {
        ProvisionError::invalid_parameter(format!(
            "num_nodes {} is out of range",
            params.num_nodes
        ))
    })?;

    Ok(CreateClusterRequest {
        cluster_type: params.cluster_type.clone(),
        node_type: params.node_type.clone(),
        number_of_nodes,
        db_name: params.db_name.clone(),
        cluster_identifier: params.identifier.clone(),
        master_username: params.master_username.clone(),
        master_user_password: params.master_password.clone(),
        port: i32::from(params.port),
        iam_roles: vec![role_arn.to_string()],
    })
}

/// Issue a single creation call. No polling and no validation of the
/// node type / node count combination.
pub async fn create_cluster<R>(
    redshift: &R,
    params: &ClusterParams,
    role_arn: &str,
) -> Result<ClusterDetails, ProvisionError>
where
    R: RedshiftControlPlane + ?Sized,
{
    let request = cluster_request(params, role_arn)?;
    match redshift.create_cluster(&request).await {
        Ok(cluster) => {
            info!(
                "Cluster {} creation requested ({} x {})",
                cluster.identifier, request.number_of_nodes, request.node_type
            );
            Ok(cluster)
        }
        Err(err) => {
            error!("Failed to create cluster {}: {err}", params.identifier);
            Err(err.into())
        }
    }
}

/// Return the ARN of `role_name`, creating the role when it is absent.
pub async fn ensure_role<I>(iam: &I, role_name: &str) -> Result<Provisioned<String>, ProvisionError>
where
    I: IamControlPlane + ?Sized,
{
    match inspector::role_details(iam, role_name).await? {
        Lookup::Found(role) => {
            info!("Role {} already exists.", role_name);
            Ok(Provisioned::Existing(role.arn))
        }
        Lookup::NotFound => {
            let arn = create_role(iam, role_name).await?;
            Ok(Provisioned::Created(arn))
        }
    }
}

pub async fn ensure_cluster<R>(
    redshift: &R,
    params: &ClusterParams,
    role_arn: &str,
) -> Result<Provisioned<ClusterDetails>, ProvisionError>
where
    R: RedshiftControlPlane + ?Sized,
{
    match inspector::cluster_details(redshift, &params.identifier).await? {
        Lookup::Found(cluster) => {
            info!("Cluster {} already exists.", params.identifier);
            Ok(Provisioned::Existing(cluster))
        }
        Lookup::NotFound => {
            let cluster = create_cluster(redshift, params, role_arn).await?;
            Ok(Provisioned::Created(cluster))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::components::cluster::DEFAULT_REDSHIFT_PORT;
    use common::types::ClusterStatus;
    use serde_json::Value;
    use test_utils::{FakeIam, FakeRedshift, CLUSTER_ID, ROLE_NAME};

    fn params() -> ClusterParams {
        ClusterParams {
            cluster_type: "multi-node".into(),
            node_type: "dc2.large".into(),
            num_nodes: 4,
            db_name: "dwh".into(),
            master_username: "dwhuser".into(),
            master_password: "Passw0rd".into(),
            identifier: CLUSTER_ID.into(),
            endpoint: None,
            port: DEFAULT_REDSHIFT_PORT,
        }
    }

    #[test]
    fn trust_policy_lets_redshift_assume_the_role() {
        let policy: Value = serde_json::from_str(&trust_policy()).unwrap();
        assert_eq!(policy["Version"], "2012-10-17");
        let statement = &policy["Statement"][0];
        assert_eq!(statement["Action"], "sts:AssumeRole");
        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Principal"]["Service"], "redshift.amazonaws.com");
    }

    #[test]
    fn cluster_request_is_populated_from_params() {
        let request = cluster_request(&params(), "arn:aws:iam::1:role/dwhRole").unwrap();
        assert_eq!(request.cluster_identifier, CLUSTER_ID);
        assert_eq!(request.number_of_nodes, 4);
        assert_eq!(request.port, 5439);
        assert_eq!(request.iam_roles, vec!["arn:aws:iam::1:role/dwhRole".to_string()]);
    }

    #[test]
    fn oversized_node_count_is_rejected_before_any_call() {
        let mut params = params();
        params.num_nodes = u32::MAX;
        let err = cluster_request(&params, "arn").expect_err("does not fit an i32");
        assert!(matches!(err, ProvisionError::InvalidParameter { .. }));
    }

    #[tokio::test]
    async fn create_role_returns_the_assigned_arn() {
        let iam = FakeIam::empty();
        let arn = create_role(&iam, ROLE_NAME).await.unwrap();

        assert_eq!(arn, FakeIam::arn_for(ROLE_NAME));
        let requests = iam.create_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, ROLE_PATH);
        assert_eq!(requests[0].description, ROLE_DESCRIPTION);
    }

    #[tokio::test]
    async fn create_role_surfaces_rejection_as_error() {
        let iam = FakeIam::rejecting_create("LimitExceeded");
        let err = create_role(&iam, ROLE_NAME).await.expect_err("rejected");
        assert!(matches!(err, ProvisionError::Rejected { .. }));
    }

    #[tokio::test]
    async fn ensure_role_reuses_an_existing_role() {
        let iam = FakeIam::with_role(ROLE_NAME);
        let arn = ensure_role(&iam, ROLE_NAME).await.unwrap();

        assert_eq!(arn, Provisioned::Existing(FakeIam::arn_for(ROLE_NAME)));
        assert!(iam.create_requests().is_empty());
    }

    #[tokio::test]
    async fn attach_policy_records_the_attachment() {
        let iam = FakeIam::with_role(ROLE_NAME);
        attach_policy(&iam, ROLE_NAME, "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess")
            .await
            .unwrap();
        assert_eq!(
            iam.attached_policies(),
            vec![(
                ROLE_NAME.to_string(),
                "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn ensure_cluster_creates_only_when_absent() {
        let absent = FakeRedshift::absent();
        let created = ensure_cluster(&absent, &params(), "arn").await.unwrap();
        match created {
            Provisioned::Created(cluster) => assert_eq!(cluster.status, ClusterStatus::Creating),
            other => panic!("expected a new cluster, got {other:?}"),
        }
        assert_eq!(absent.create_requests().len(), 1);

        let present = FakeRedshift::with_cluster(CLUSTER_ID, ClusterStatus::Available);
        let existing = ensure_cluster(&present, &params(), "arn").await.unwrap();
        assert!(matches!(existing, Provisioned::Existing(_)));
        assert!(present.create_requests().is_empty());
    }

    #[tokio::test]
    async fn cluster_rejection_is_not_retried() {
        let redshift = FakeRedshift::rejecting_create("InvalidClusterType");
        let err = create_cluster(&redshift, &params(), "arn")
            .await
            .expect_err("rejected");
        assert!(matches!(err, ProvisionError::Rejected { .. }));
        assert_eq!(redshift.create_requests().len(), 1);
    }
}
