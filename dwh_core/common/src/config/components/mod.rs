pub mod aws;
pub mod cluster;
pub mod connections;
pub mod global;
pub mod iam_role;
pub mod s3;
mod serde_helpers;

pub const AWS_SECTION: &str = "AWS";
pub const IAM_ROLE_SECTION: &str = "IAM_ROLE";
pub const CLUSTER_SECTION: &str = "CLUSTER";
pub const S3_SECTION: &str = "S3";

/// Keys this system writes back into `dwh.toml`.
pub const ROLE_ARN_KEY: &str = "arn";
pub const CLUSTER_ENDPOINT_KEY: &str = "cl_endpoint";
