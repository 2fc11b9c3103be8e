use super::serde_helpers::{empty_string_as_none, number_from_any};
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_REDSHIFT_PORT: u16 = 5439;

// ---------------- CLUSTER section ----------------
#[derive(Deserialize, Clone, PartialEq)]
pub struct ClusterParams {
    #[serde(rename = "cl_type")]
    pub cluster_type: String,
    pub node_type: String,
    #[serde(deserialize_with = "number_from_any")]
    pub num_nodes: u32,
    #[serde(rename = "cl_db_name")]
    pub db_name: String,
    #[serde(rename = "cl_user")]
    pub master_username: String,
    #[serde(rename = "cl_password")]
    pub master_password: String,
    #[serde(rename = "cl_identifier")]
    pub identifier: String,
    /// Filled in once the cluster becomes available.
    #[serde(
        rename = "cl_endpoint",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub endpoint: Option<String>,
    #[serde(
        rename = "cl_port",
        default = "default_port",
        deserialize_with = "number_from_any"
    )]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_REDSHIFT_PORT
}

impl fmt::Debug for ClusterParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterParams")
            .field("cluster_type", &self.cluster_type)
            .field("node_type", &self.node_type)
            .field("num_nodes", &self.num_nodes)
            .field("db_name", &self.db_name)
            .field("master_username", &self.master_username)
            .field("master_password", &"<redacted>")
            .field("identifier", &self.identifier)
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .finish()
    }
}
