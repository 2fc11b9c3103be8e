//! Fixtures and in-memory collaborators shared by the workspace's tests.

mod fakes;
mod postgres;

pub use fakes::{
    FakeIam, FakeRedshift, RecordingAdapter, RecordingAdapterFactory, FAKE_ACCOUNT_ID,
};
pub use postgres::{setup_postgres, PgTestContainer, PG_DB, PG_PASSWORD, PG_USER};

use common::config::loader::{CONFIG_FILE_NAME, SECRETS_FILE_NAME};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const CLUSTER_ID: &str = "cl-sparkify";
pub const ROLE_NAME: &str = "dwhRole";

pub const DWH_TOML: &str = r#"[AWS]
region = "us-west-2"
aws_user = "dwhadmin"

[IAM_ROLE]
iam_role_name = "dwhRole"
arn = ""

[CLUSTER]
cl_type = "multi-node"
node_type = "dc2.large"
num_nodes = 4
cl_db_name = "dwh"
cl_user = "dwhuser"
cl_password = "Passw0rd"
cl_identifier = "cl-sparkify"
cl_endpoint = ""
cl_port = 5439

[S3]
log_data = "'s3://udacity-dend/log_data'"
log_jsonpath = "'s3://udacity-dend/log_json_path.json'"
song_data = "'s3://udacity-dend/song_data'"
"#;

pub const SECRETS_TOML: &str = r#"[AWS]
key = "AKIAEXAMPLEKEY"
secret = "example-secret"
"#;

/// A throwaway project directory holding `dwh.toml` and `aws-secret.toml`.
pub struct ConfigFixture {
    dir: TempDir,
}

impl ConfigFixture {
    pub fn new() -> std::io::Result<Self> {
        Self::with_contents(DWH_TOML)
    }

    pub fn with_contents(dwh_toml: &str) -> std::io::Result<Self> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join(CONFIG_FILE_NAME), dwh_toml)?;
        fs::write(dir.path().join(SECRETS_FILE_NAME), SECRETS_TOML)?;
        Ok(Self { dir })
    }

    pub fn dir_buf(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(CONFIG_FILE_NAME)
    }
}
