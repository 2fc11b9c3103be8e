pub mod inspector;
pub mod provision;
pub mod waiter;

use common::error::diagnostics::DiagnosticMessage;
use shared_clients::aws::ControlPlaneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("resource not found: {context}")]
    NotFound { context: DiagnosticMessage },
    #[error("control plane rejected the request: {context}")]
    Rejected { context: DiagnosticMessage },
    #[error("invalid parameter: {context}")]
    InvalidParameter { context: DiagnosticMessage },
    #[error("unexpected error: {context}")]
    Unexpected { context: DiagnosticMessage },
}

impl ProvisionError {
    #[track_caller]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            context: DiagnosticMessage::new(message.into()),
        }
    }
}

impl From<ControlPlaneError> for ProvisionError {
    #[track_caller]
    fn from(value: ControlPlaneError) -> Self {
        match value {
            ControlPlaneError::NotFound { context } => ProvisionError::NotFound { context },
            ControlPlaneError::Rejected { context } => ProvisionError::Rejected { context },
            ControlPlaneError::Unexpected { context } => ProvisionError::Unexpected { context },
        }
    }
}
