pub mod diagnostics;
pub use crate::config::error::ConfigError;
pub use diagnostics::DiagnosticMessage;

use std::error::Error as StdError;
use thiserror::Error;

/// Top level error surfaced by the `dwh` binary.
#[derive(Debug, Error)]
pub enum DwhError {
    #[error("configuration failed: {context}")]
    Config {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    #[error("provisioning failed: {context}")]
    Provision {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    #[error("waiting for cluster failed: {context}")]
    Wait {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    #[error("etl failed: {context}")]
    Etl {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    #[error("operator prompt failed: {context}")]
    Prompt {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    #[error("cluster unusable: {context}")]
    ClusterUnavailable { context: DiagnosticMessage },
    #[error("interrupted: {context}")]
    Interrupted { context: DiagnosticMessage },
}

impl DwhError {
    #[track_caller]
    pub fn config<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DwhError::Config {
            context: DiagnosticMessage::new(err.to_string()),
            source: Some(Box::new(err)),
        }
    }

    #[track_caller]
    pub fn provision<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DwhError::Provision {
            context: DiagnosticMessage::new(err.to_string()),
            source: Some(Box::new(err)),
        }
    }

    #[track_caller]
    pub fn provision_msg(message: impl Into<String>) -> Self {
        DwhError::Provision {
            context: DiagnosticMessage::new(message.into()),
            source: None,
        }
    }

    #[track_caller]
    pub fn wait<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DwhError::Wait {
            context: DiagnosticMessage::new(err.to_string()),
            source: Some(Box::new(err)),
        }
    }

    #[track_caller]
    pub fn etl<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DwhError::Etl {
            context: DiagnosticMessage::new(err.to_string()),
            source: Some(Box::new(err)),
        }
    }

    #[track_caller]
    pub fn prompt<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DwhError::Prompt {
            context: DiagnosticMessage::new(err.to_string()),
            source: Some(Box::new(err)),
        }
    }

    #[track_caller]
    pub fn cluster_unavailable(cluster: &str, status: &str) -> Self {
        DwhError::ClusterUnavailable {
            context: DiagnosticMessage::new(format!(
                "cluster '{cluster}' current status: '{status}'. \
                 Please activate or repair the cluster and relaunch the program"
            )),
        }
    }

    #[track_caller]
    pub fn interrupted(step: &str) -> Self {
        DwhError::Interrupted {
            context: DiagnosticMessage::new(format!("run cancelled by the operator {step}")),
        }
    }
}

impl From<ConfigError> for DwhError {
    #[track_caller]
    fn from(err: ConfigError) -> Self {
        DwhError::config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn stage_errors_expose_their_source() {
        let err = DwhError::etl(io::Error::other("connection reset"));

        assert!(err.to_string().starts_with("etl failed: connection reset (at "));
        let source = StdError::source(&err).expect("source is kept");
        assert_eq!(source.to_string(), "connection reset");
    }

    #[test]
    fn config_errors_convert_and_chain() {
        let err: DwhError = ConfigError::incorrect_path("/nowhere/dwh.toml").into();

        assert!(matches!(err, DwhError::Config { .. }));
        let source = StdError::source(&err).expect("config error is the source");
        assert!(source.to_string().contains("/nowhere/dwh.toml"));
    }

    #[test]
    fn interrupted_and_unavailable_have_no_source() {
        let err = DwhError::interrupted("at the ETL gate");
        assert!(StdError::source(&err).is_none());
        assert!(err.to_string().contains("cancelled by the operator at the ETL gate"));

        let err = DwhError::cluster_unavailable("cl-sparkify", "paused");
        assert!(StdError::source(&err).is_none());
        assert!(err.to_string().contains("'paused'"));
    }
}
