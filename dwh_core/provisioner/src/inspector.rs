//! Read-only existence and status checks against the control plane.
//!
//! Each call maps to exactly one control-plane query. A missing role or
//! cluster is an answer (`false` / [`Lookup::NotFound`]), not an error.

use crate::ProvisionError;
use common::types::{ClusterDetails, ClusterStatus, Lookup, RoleDetails};
use log::info;
use shared_clients::aws::{ControlPlaneError, IamControlPlane, RedshiftControlPlane};

fn lookup<T>(result: Result<T, ControlPlaneError>) -> Result<Lookup<T>, ProvisionError> {
    match result {
        Ok(value) => Ok(Lookup::Found(value)),
        Err(err) if err.is_not_found() => Ok(Lookup::NotFound),
        Err(err) => Err(err.into()),
    }
}

pub async fn role_details<I>(iam: &I, role_name: &str) -> Result<Lookup<RoleDetails>, ProvisionError>
where
    I: IamControlPlane + ?Sized,
{
    lookup(iam.get_role(role_name).await)
}

/// `details` logs the role report, or a not-found notice.
pub async fn role_exists<I>(iam: &I, role_name: &str, details: bool) -> Result<bool, ProvisionError>
where
    I: IamControlPlane + ?Sized,
{
    match role_details(iam, role_name).await? {
        Lookup::Found(role) => {
            if details {
                info!("{role}");
            }
            Ok(true)
        }
        Lookup::NotFound => {
            if details {
                info!("Role {role_name} cannot be found.");
            }
            Ok(false)
        }
    }
}

pub async fn cluster_details<R>(
    redshift: &R,
    cluster_id: &str,
) -> Result<Lookup<ClusterDetails>, ProvisionError>
where
    R: RedshiftControlPlane + ?Sized,
{
    lookup(redshift.describe_cluster(cluster_id).await)
}

/// `details` logs the cluster report, or a not-found notice.
pub async fn cluster_exists<R>(
    redshift: &R,
    cluster_id: &str,
    details: bool,
) -> Result<bool, ProvisionError>
where
    R: RedshiftControlPlane + ?Sized,
{
    match cluster_details(redshift, cluster_id).await? {
        Lookup::Found(cluster) => {
            if details {
                info!("{cluster}");
            }
            Ok(true)
        }
        Lookup::NotFound => {
            if details {
                info!("Cluster {cluster_id} cannot be found.");
            }
            Ok(false)
        }
    }
}

pub async fn cluster_status<R>(
    redshift: &R,
    cluster_id: &str,
) -> Result<Lookup<ClusterStatus>, ProvisionError>
where
    R: RedshiftControlPlane + ?Sized,
{
    let status = cluster_details(redshift, cluster_id)
        .await?
        .map(|cluster| cluster.status);
    if !status.is_found() {
        info!("Cluster {cluster_id} cannot be found.");
    }
    Ok(status)
}

pub async fn cluster_available<R>(
    redshift: &R,
    cluster_id: &str,
) -> Result<Lookup<bool>, ProvisionError>
where
    R: RedshiftControlPlane + ?Sized,
{
    Ok(cluster_status(redshift, cluster_id)
        .await?
        .map(|status| status.is_available()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{FakeIam, FakeRedshift, CLUSTER_ID, ROLE_NAME};

    #[tokio::test]
    async fn role_exists_is_false_only_when_not_found() {
        let present = FakeIam::with_role(ROLE_NAME);
        let absent = FakeIam::empty();

        for details in [false, true] {
            assert!(role_exists(&present, ROLE_NAME, details).await.unwrap());
            assert!(!role_exists(&absent, ROLE_NAME, details).await.unwrap());
        }
    }

    #[tokio::test]
    async fn role_details_carry_the_arn() {
        let iam = FakeIam::with_role(ROLE_NAME);
        let role = role_details(&iam, ROLE_NAME).await.unwrap().found().unwrap();
        assert_eq!(role.arn, FakeIam::arn_for(ROLE_NAME));
    }

    #[tokio::test]
    async fn cluster_exists_is_independent_of_details_flag() {
        let present = FakeRedshift::with_cluster(CLUSTER_ID, ClusterStatus::Creating);
        let absent = FakeRedshift::absent();

        for details in [false, true] {
            assert!(cluster_exists(&present, CLUSTER_ID, details).await.unwrap());
            assert!(!cluster_exists(&absent, CLUSTER_ID, details).await.unwrap());
        }
    }

    #[tokio::test]
    async fn unknown_cluster_status_is_not_found() {
        let redshift = FakeRedshift::absent();
        assert_eq!(
            cluster_status(&redshift, CLUSTER_ID).await.unwrap(),
            Lookup::NotFound
        );
        assert_eq!(
            cluster_available(&redshift, CLUSTER_ID).await.unwrap(),
            Lookup::NotFound
        );
    }

    #[tokio::test]
    async fn status_literal_is_passed_through() {
        let redshift = FakeRedshift::with_cluster(
            CLUSTER_ID,
            ClusterStatus::Other("incompatible-network".into()),
        );
        let status = cluster_status(&redshift, CLUSTER_ID).await.unwrap();
        assert_eq!(
            status,
            Lookup::Found(ClusterStatus::Other("incompatible-network".into()))
        );
        assert_eq!(
            cluster_available(&redshift, CLUSTER_ID).await.unwrap(),
            Lookup::Found(false)
        );
    }

    #[tokio::test]
    async fn available_iff_status_is_available() {
        let creating = FakeRedshift::with_cluster(CLUSTER_ID, ClusterStatus::Creating);
        let available = FakeRedshift::with_cluster(CLUSTER_ID, ClusterStatus::Available);

        assert_eq!(
            cluster_available(&creating, CLUSTER_ID).await.unwrap(),
            Lookup::Found(false)
        );
        assert_eq!(
            cluster_available(&available, CLUSTER_ID).await.unwrap(),
            Lookup::Found(true)
        );
    }

    #[tokio::test]
    async fn each_check_is_a_single_describe_call() {
        let redshift = FakeRedshift::with_cluster(CLUSTER_ID, ClusterStatus::Available);
        cluster_exists(&redshift, CLUSTER_ID, true).await.unwrap();
        cluster_status(&redshift, CLUSTER_ID).await.unwrap();
        assert_eq!(redshift.describe_calls(), 2);
    }
}
