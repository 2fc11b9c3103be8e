use super::serde_helpers::empty_string_as_none;
use serde::Deserialize;

pub const DEFAULT_POLICY_ARN: &str = "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess";

// ---------------- IAM_ROLE section ----------------
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct IamRoleSettings {
    #[serde(rename = "iam_role_name")]
    pub name: String,
    /// Assigned by the control plane and written back after creation.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub arn: Option<String>,
    #[serde(default = "default_policy_arn")]
    pub policy_arn: String,
}

fn default_policy_arn() -> String {
    DEFAULT_POLICY_ARN.to_string()
}
