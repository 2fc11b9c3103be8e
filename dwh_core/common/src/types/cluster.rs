use chrono::{DateTime, Utc};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Cluster state as reported by the control plane. Only `creating` and
/// `available` drive decisions; every other literal is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterStatus {
    Creating,
    Available,
    Other(String),
}

impl ClusterStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ClusterStatus::Creating => "creating",
            ClusterStatus::Available => "available",
            ClusterStatus::Other(status) => status.as_str(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ClusterStatus::Available)
    }

    pub fn is_creating(&self) -> bool {
        matches!(self, ClusterStatus::Creating)
    }
}

impl From<&str> for ClusterStatus {
    fn from(value: &str) -> Self {
        match value {
            "creating" => ClusterStatus::Creating,
            "available" => ClusterStatus::Available,
            other => ClusterStatus::Other(other.to_string()),
        }
    }
}

impl FromStr for ClusterStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ClusterStatus::from(s))
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterDetails {
    pub identifier: String,
    pub status: ClusterStatus,
    pub db_name: Option<String>,
    pub master_username: Option<String>,
    /// Not populated by the control plane until the cluster is available.
    pub endpoint: Option<String>,
    pub port: Option<u16>,
    pub created: Option<DateTime<Utc>>,
    pub availability_zone: Option<String>,
}

impl fmt::Display for ClusterDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNKNOWN: &str = "unknown";

        if self.status.is_creating() {
            writeln!(f, "Cluster {} being created.", self.identifier)?;
        } else {
            let created = self
                .created
                .map(|c| c.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string());
            writeln!(f, "Cluster {} exists, created on {}.", self.identifier, created)?;
            writeln!(
                f,
                "Cluster endpoint: '{}'.",
                self.endpoint.as_deref().unwrap_or(UNKNOWN)
            )?;
        }
        writeln!(
            f,
            "Cluster DB name: {}.",
            self.db_name.as_deref().unwrap_or(UNKNOWN)
        )?;
        writeln!(
            f,
            "Cluster username: {}.",
            self.master_username.as_deref().unwrap_or(UNKNOWN)
        )?;
        writeln!(f, "Cluster status: {}.", self.status)?;
        write!(
            f,
            "Cluster zone: {}.",
            self.availability_zone.as_deref().unwrap_or(UNKNOWN)
        )
    }
}
