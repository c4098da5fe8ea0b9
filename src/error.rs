// src/error.rs
use thiserror::Error;

/// Failure taxonomy shared by every collaborator call and core operation.
///
/// None of these are retried. A failure is terminal for the invocation that
/// produced it and leaves previously held state untouched.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad input caught before any network call.
    #[error("{0}")]
    Validation(String),

    /// No usable identity; the caller must authenticate first.
    #[error("Please login to continue")]
    AuthRequired,

    /// Non-2xx or malformed response from a collaborator.
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("Failed to connect to {service} at {endpoint}: {reason}. Make sure it's running.")]
    Transport {
        service: &'static str,
        endpoint: String,
        reason: String,
    },

    #[error("{service} did not answer within {seconds}s ({endpoint})")]
    Timeout {
        service: &'static str,
        endpoint: String,
        seconds: u64,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        ClientError::Upstream {
            status,
            message: message.into(),
        }
    }

    /// HTTP status reported by the collaborator, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_auth_required(&self) -> bool {
        matches!(self, ClientError::AuthRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_is_verbatim() {
        let err = ClientError::upstream(Some(500), "Resume text could not be extracted");
        assert_eq!(err.to_string(), "Resume text could not be extracted");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_transport_names_endpoint() {
        let err = ClientError::Transport {
            service: "matching engine",
            endpoint: "http://localhost:5000/match-jobs".to_string(),
            reason: "connection refused".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("matching engine"));
        assert!(text.contains("http://localhost:5000/match-jobs"));
        assert_eq!(err.status(), None);
    }
}
