//! Error taxonomy shared by every layer of the client.
//!
//! - `Unauthenticated` is raised locally before any network I/O.
//! - `Timeout` and `Transport` cover requests that never produced a response.
//! - `Api` carries the HTTP status and the server-supplied `detail`, if any.

use thiserror::Error;

/// Message shown when an API error carries no server detail and the caller
/// did not supply an operation-specific fallback.
pub const GENERIC_FAILURE: &str = "Request failed";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{method} {path} timed out")]
    Timeout { method: String, path: String },

    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("{}", .message.as_deref().unwrap_or(GENERIC_FAILURE))]
    Api { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("Title cannot be empty")]
    EmptyTitle,

    /// An edit was attempted on a note that never loaded. Carries the load
    /// failure's status (if it was an API error) and message.
    #[error("{message}")]
    NotLoaded {
        status: Option<u16>,
        message: String,
    },
}

impl ClientError {
    /// Fill in `fallback` when an API error came back without a server detail.
    /// Every other variant passes through unchanged.
    pub fn with_fallback(self, fallback: &str) -> Self {
        match self {
            Self::Api {
                status,
                message: None,
            } => Self::Api {
                status,
                message: Some(fallback.to_string()),
            },
            other => other,
        }
    }

    /// The text a front end should display for this failure.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotLoaded { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_fills_missing_detail() {
        let err = ClientError::Api {
            status: 404,
            message: None,
        }
        .with_fallback("Failed to delete note");
        assert_eq!(err.message(), "Failed to delete note");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn fallback_keeps_server_detail() {
        let err = ClientError::Api {
            status: 404,
            message: Some("Note not found".into()),
        }
        .with_fallback("Failed to delete note");
        assert_eq!(err.message(), "Note not found");
    }

    #[test]
    fn fallback_leaves_other_variants_alone() {
        let err = ClientError::Unauthenticated.with_fallback("Failed to fetch notes");
        assert!(err.is_unauthenticated());
        assert_eq!(err.message(), "Not authenticated");
    }

    #[test]
    fn api_error_without_detail_uses_generic_text() {
        let err = ClientError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(err.message(), GENERIC_FAILURE);
    }
}
