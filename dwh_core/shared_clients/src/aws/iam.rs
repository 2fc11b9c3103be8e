use super::{classify_sdk_error, to_utc, ControlPlaneError, CreateRoleRequest, IamControlPlane};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_iam::types::Role;
use aws_sdk_iam::Client;
use common::types::RoleDetails;
use log::debug;

#[derive(Debug, Clone)]
pub struct AwsIamClient {
    client: Client,
}

impl AwsIamClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn role_details(role: &Role) -> RoleDetails {
    RoleDetails {
        name: role.role_name().to_string(),
        role_id: role.role_id().to_string(),
        arn: role.arn().to_string(),
        created: to_utc(role.create_date()),
        description: role.description().map(str::to_string),
    }
}

#[async_trait]
impl IamControlPlane for AwsIamClient {
    async fn get_role(&self, role_name: &str) -> Result<RoleDetails, ControlPlaneError> {
        debug!("iam get-role {role_name}");
        let output = self
            .client
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_no_such_entity_exception())
                {
                    ControlPlaneError::not_found(format!("role '{role_name}' cannot be found"))
                } else {
                    classify_sdk_error("get-role", err)
                }
            })?;

        output
            .role()
            .map(role_details)
            .ok_or_else(|| ControlPlaneError::unexpected("get-role response carried no role"))
    }

    async fn create_role(
        &self,
        request: &CreateRoleRequest,
    ) -> Result<RoleDetails, ControlPlaneError> {
        debug!("iam create-role {}", request.role_name);
        let output = self
            .client
            .create_role()
            .path(&request.path)
            .role_name(&request.role_name)
            .description(&request.description)
            .assume_role_policy_document(&request.assume_role_policy_document)
            .send()
            .await
            .map_err(|err| classify_sdk_error("create-role", err))?;

        output
            .role()
            .map(role_details)
            .ok_or_else(|| ControlPlaneError::unexpected("create-role response carried no role"))
    }

    async fn attach_role_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<(), ControlPlaneError> {
        debug!("iam attach-role-policy {policy_arn} -> {role_name}");
        self.client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_no_such_entity_exception())
                {
                    ControlPlaneError::not_found(format!(
                        "role '{role_name}' or policy '{policy_arn}' cannot be found"
                    ))
                } else {
                    classify_sdk_error("attach-role-policy", err)
                }
            })?;
        Ok(())
    }
}
