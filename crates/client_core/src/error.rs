use shared::{
    domain::{Operation, SubmitKind},
    error::ApiError,
    protocol::FieldErrors,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("no `{operation}` operation registered for {kind:?} submissions")]
    MissingOperation {
        kind: SubmitKind,
        operation: Operation,
    },
    #[error("{} field(s) failed validation", errors.len())]
    Rejected { errors: FieldErrors },
    #[error("form unmounted before the submission completed")]
    Detached,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid api url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("{endpoint} rejected with status {status}: {source}")]
    Api {
        endpoint: String,
        status: u16,
        source: ApiError,
    },
    #[error("{endpoint} returned unexpected status {status}")]
    Status { endpoint: String, status: u16 },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::InvalidUrl { .. } | Self::Transport { .. } => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Api { source, .. } if !source.fields.is_empty() => Some(&source.fields),
            _ => None,
        }
    }
}
