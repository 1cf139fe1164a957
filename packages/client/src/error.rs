//! Error types for the form-service client

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Rejected by form service ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Not authorized")]
    Unauthorized,

    #[error("Form service error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        ClientError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        ClientError::Rejected {
            status: 409,
            message: message.into(),
        }
    }

    /// The call referenced a version or field id that is no longer valid
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, ClientError::NotFound { .. } | ClientError::Rejected { .. })
    }

    /// Map a non-success HTTP status to an error
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ClientError::Unauthorized,
            404 => ClientError::NotFound { resource: message },
            400 | 409 | 422 => ClientError::Rejected { status, message },
            _ => ClientError::Http { status, message },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ClientError::from_status(status.as_u16(), e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ClientError::from_status(401, String::new()), ClientError::Unauthorized);
        assert!(ClientError::from_status(404, "field f1".to_string()).is_stale_reference());
        assert!(ClientError::from_status(409, "not a draft".to_string()).is_stale_reference());
        assert!(matches!(
            ClientError::from_status(503, "down".to_string()),
            ClientError::Http { status: 503, .. }
        ));
    }

    #[test]
    fn test_transport_is_not_stale() {
        assert!(!ClientError::Transport("reset".to_string()).is_stale_reference());
    }
}
