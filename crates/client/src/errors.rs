use maintflow_core::{Action, EntityType, Resource, Role, TransitionError};
use thiserror::Error;

use crate::backend::{ApiResponse, TransportError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("not authorized (HTTP {status})")]
    Unauthorized { status: u16 },
    #[error("resource not found")]
    NotFound,
    #[error("backend error (HTTP {0})")]
    ServerError(u16),
    #[error("malformed backend response: {0}")]
    Malformed(String),
    #[error("{operation} is not exposed for {resource}")]
    NotSupported { resource: Resource, operation: &'static str },
    #[error("`{0}` is not a usable record id")]
    InvalidId(String),
}

impl FetchError {
    /// Maps a non-2xx response; 2xx callers never reach this.
    pub fn from_response(response: &ApiResponse) -> Self {
        match response.status {
            401 | 403 => Self::Unauthorized { status: response.status },
            404 => Self::NotFound,
            status => Self::ServerError(status),
        }
    }

    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn class(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout => "timeout",
            Self::Unauthorized { .. } => "unauthorized",
            Self::NotFound => "not_found",
            Self::ServerError(_) => "server_error",
            Self::Malformed(_) => "malformed",
            Self::NotSupported { .. } => "not_supported",
            Self::InvalidId(_) => "invalid_id",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) | Self::Timeout => {
                "The server could not be reached. Check the connection and try again."
            }
            Self::Unauthorized { .. } => "Your session has expired. Please sign in again.",
            Self::NotFound => "The requested record no longer exists.",
            Self::ServerError(_) | Self::Malformed(_) => {
                "The server returned an unexpected response. Please retry shortly."
            }
            Self::NotSupported { .. } => "This operation is not available for this record.",
            Self::InvalidId(_) => "The record identifier is not valid.",
        }
    }
}

impl From<TransportError> for FetchError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::Timeout(_) => Self::Timeout,
            TransportError::Network(message) => Self::Network(message),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("not authorized (HTTP {status})")]
    Unauthorized { status: u16 },
    #[error("entity not found")]
    NotFound,
    #[error("backend rejected the transition (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    #[error("role {role} may not {action} a {entity} in status `{status}`")]
    NotAllowed { entity: EntityType, status: String, action: Action, role: Role },
    #[error("malformed backend response: {0}")]
    Malformed(String),
    #[error("`{0}` is not a usable record id")]
    InvalidId(String),
}

impl WorkflowError {
    pub fn from_response(response: &ApiResponse) -> Self {
        match response.status {
            401 | 403 => Self::Unauthorized { status: response.status },
            404 => Self::NotFound,
            status => Self::Rejected { status, message: response.backend_message() },
        }
    }

    /// True when the failure happened before any state-changing request was sent.
    pub fn is_refused_locally(&self) -> bool {
        matches!(self, Self::InvalidTransition(_) | Self::NotAllowed { .. } | Self::InvalidId(_))
    }

    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn class(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Unauthorized { .. } => "unauthorized",
            Self::NotFound => "not_found",
            Self::Rejected { .. } => "rejected",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::NotAllowed { .. } => "not_allowed",
            Self::Malformed(_) => "malformed",
            Self::InvalidId(_) => "invalid_id",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "The server could not be reached. Check the connection and try again.".to_string()
            }
            Self::Unauthorized { .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            Self::NotFound => "The record no longer exists.".to_string(),
            Self::Rejected { message, .. } => message.clone(),
            Self::InvalidTransition(_) | Self::NotAllowed { .. } => {
                "This action is not available for the record's current status.".to_string()
            }
            Self::Malformed(_) => {
                "The server returned an unexpected response. Please retry shortly.".to_string()
            }
            Self::InvalidId(_) => "The record identifier is not valid.".to_string(),
        }
    }
}

impl From<TransportError> for WorkflowError {
    fn from(value: TransportError) -> Self {
        Self::Network(value.to_string())
    }
}

impl From<FetchError> for WorkflowError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Network(message) => Self::Network(message),
            FetchError::Timeout => Self::Network("request timed out".to_string()),
            FetchError::Unauthorized { status } => Self::Unauthorized { status },
            FetchError::NotFound => Self::NotFound,
            FetchError::ServerError(status) => {
                Self::Rejected { status, message: format!("HTTP {status}") }
            }
            FetchError::Malformed(message) => Self::Malformed(message),
            other @ FetchError::NotSupported { .. } => Self::Malformed(other.to_string()),
            FetchError::InvalidId(id) => Self::InvalidId(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::{FetchError, WorkflowError};
    use crate::backend::{ApiResponse, TransportError};

    #[test]
    fn fetch_errors_follow_status_taxonomy() {
        assert_eq!(
            FetchError::from_response(&ApiResponse::new(401, "")),
            FetchError::Unauthorized { status: 401 }
        );
        assert_eq!(
            FetchError::from_response(&ApiResponse::new(403, "")),
            FetchError::Unauthorized { status: 403 }
        );
        assert_eq!(FetchError::from_response(&ApiResponse::new(404, "")), FetchError::NotFound);
        assert_eq!(FetchError::from_response(&ApiResponse::new(503, "")), FetchError::ServerError(503));
        assert_eq!(
            FetchError::from(TransportError::Timeout(Duration::from_secs(15))),
            FetchError::Timeout
        );
    }

    #[test]
    fn workflow_rejections_carry_backend_message() {
        let error = WorkflowError::from_response(&ApiResponse::json_body(
            409,
            &json!({"message": "Commande déjà validée"}),
        ));
        assert_eq!(
            error,
            WorkflowError::Rejected { status: 409, message: "Commande déjà validée".to_string() }
        );
        assert_eq!(error.user_message(), "Commande déjà validée");
        assert!(!error.is_refused_locally());
    }

    #[test]
    fn unauthorized_errors_ask_for_reauthentication() {
        assert!(FetchError::Unauthorized { status: 401 }.requires_reauthentication());
        assert!(WorkflowError::from_response(&ApiResponse::new(403, "")).requires_reauthentication());
        assert!(!FetchError::NotFound.requires_reauthentication());
    }

    #[test]
    fn timeouts_surface_as_network_failures_in_workflows() {
        let error = WorkflowError::from(FetchError::Timeout);
        assert!(matches!(error, WorkflowError::Network(_)));
        let error = WorkflowError::from(TransportError::Timeout(Duration::from_secs(15)));
        assert_eq!(error.class(), "network");
    }
}
