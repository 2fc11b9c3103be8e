use crate::config::components::aws::{AwsSettings, Credentials};
use crate::config::components::cluster::ClusterParams;
use crate::config::components::global::DwhConfig;
use crate::config::components::iam_role::IamRoleSettings;
use crate::config::components::s3::S3Settings;
use crate::config::error::ConfigError;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "dwh.toml";
pub const SECRETS_FILE_NAME: &str = "aws-secret.toml";

#[derive(Deserialize)]
struct RawDwhConfig {
    #[serde(rename = "AWS")]
    aws: AwsSettings,
    #[serde(rename = "IAM_ROLE")]
    iam_role: IamRoleSettings,
    #[serde(rename = "CLUSTER")]
    cluster: ClusterParams,
    #[serde(rename = "S3")]
    s3: S3Settings,
}

#[derive(Deserialize)]
struct RawSecrets {
    #[serde(rename = "AWS")]
    aws: Credentials,
}

/// Path of `dwh.toml` inside `config_dir`, or in the working directory.
pub fn config_file_path(config_dir: Option<&Path>) -> PathBuf {
    match config_dir {
        Some(dir) => dir.join(CONFIG_FILE_NAME),
        None => PathBuf::from(CONFIG_FILE_NAME),
    }
}

pub fn read_config(config_dir: Option<PathBuf>) -> Result<DwhConfig, ConfigError> {
    let path = config_file_path(config_dir.as_deref());
    if !path.exists() {
        return Err(ConfigError::incorrect_path(&path));
    }

    let contents = fs::read_to_string(&path)?;
    let raw: RawDwhConfig = toml::from_str(&contents)?;
    debug!("loaded warehouse configuration from {}", path.display());

    Ok(DwhConfig::new(
        path,
        raw.aws,
        raw.iam_role,
        raw.cluster,
        raw.s3,
    ))
}

/// Read the access key pair. Defaults to `aws-secret.toml` next to `dwh.toml`.
pub fn read_credentials(
    secrets_path: Option<PathBuf>,
    config_dir: Option<&Path>,
) -> Result<Credentials, ConfigError> {
    let path = secrets_path.unwrap_or_else(|| match config_dir {
        Some(dir) => dir.join(SECRETS_FILE_NAME),
        None => PathBuf::from(SECRETS_FILE_NAME),
    });
    if !path.exists() {
        return Err(ConfigError::incorrect_path(&path));
    }

    let contents = fs::read_to_string(&path)?;
    let raw: RawSecrets = toml::from_str(&contents)?;
    debug!("loaded credentials from {}", path.display());
    Ok(raw.aws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::components::cluster::DEFAULT_REDSHIFT_PORT;
    use crate::config::components::iam_role::DEFAULT_POLICY_ARN;
    use tempfile::TempDir;

    const DWH: &str = r#"
[AWS]
region = "us-west-2"

[IAM_ROLE]
iam_role_name = "dwhRole"
arn = ""

[CLUSTER]
cl_type = "multi-node"
node_type = "dc2.large"
num_nodes = "4"
cl_db_name = "dwh"
cl_user = "dwhuser"
cl_password = "Passw0rd"
cl_identifier = "cl-sparkify"
cl_endpoint = ""

[S3]
log_data = "'s3://udacity-dend/log_data'"
log_jsonpath = "'s3://udacity-dend/log_json_path.json'"
song_data = "'s3://udacity-dend/song_data'"
"#;

    const SECRETS: &str = r#"
[AWS]
key = "AKIAEXAMPLE"
secret = "s3cr3t"
"#;

    fn project() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), DWH).unwrap();
        fs::write(dir.path().join(SECRETS_FILE_NAME), SECRETS).unwrap();
        dir
    }

    #[test]
    fn reads_typed_config_with_defaults() {
        let dir = project();
        let config = read_config(Some(dir.path().to_path_buf())).expect("config loads");

        assert_eq!(config.aws.region, "us-west-2");
        assert_eq!(config.iam_role.name, "dwhRole");
        assert_eq!(config.iam_role.arn, None);
        assert_eq!(config.iam_role.policy_arn, DEFAULT_POLICY_ARN);
        assert_eq!(config.cluster.num_nodes, 4);
        assert_eq!(config.cluster.port, DEFAULT_REDSHIFT_PORT);
        assert_eq!(config.cluster.endpoint, None);
        assert_eq!(config.copy_region(), "us-west-2");
        assert_eq!(config.path(), dir.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn connection_details_require_an_endpoint() {
        let dir = project();
        let mut config = read_config(Some(dir.path().to_path_buf())).unwrap();

        let err = config.connection_details().expect_err("no endpoint yet");
        assert!(matches!(err, ConfigError::NotFound { .. }));

        config.set_endpoint("cl-sparkify.example.redshift.amazonaws.com");
        let details = config.connection_details().unwrap();
        assert_eq!(details.host, "cl-sparkify.example.redshift.amazonaws.com");
        assert_eq!(details.port, 5439);
        assert_eq!(details.database, "dwh");
    }

    #[test]
    fn reads_credentials_next_to_config() {
        let dir = project();
        let creds = read_credentials(None, Some(dir.path())).expect("secrets load");
        assert_eq!(creds.access_key_id, "AKIAEXAMPLE");
        assert_eq!(creds.secret_access_key, "s3cr3t");
    }

    #[test]
    fn missing_config_dir_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = read_config(Some(dir.path().to_path_buf())).expect_err("nothing to read");
        assert!(matches!(err, ConfigError::IncorrectPath { .. }));
    }

    #[test]
    fn missing_cluster_key_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let broken = DWH.replace("node_type = \"dc2.large\"\n", "");
        fs::write(dir.path().join(CONFIG_FILE_NAME), broken).unwrap();

        let err = read_config(Some(dir.path().to_path_buf())).expect_err("node_type missing");
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
