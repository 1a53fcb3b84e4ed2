//! Error types for the polling client
//!
//! Failure taxonomy for one poll cycle:
//! - Transport failure (connect, timeout)
//! - Non-success HTTP status
//! - Empty or non-JSON body
//! - Structurally invalid JSON (validator rejection)
//!
//! All four collapse to the same recovery: synthetic fallback.

use gq_validate::ValidationError;

/// Errors raised while fetching a payload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// HTTP client could not be constructed
    #[error("http client error: {0}")]
    Client(String),

    /// Connection or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Server answered with a non-2xx status
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    /// Server answered with an empty body
    #[error("empty response body")]
    EmptyBody,

    /// Body was not JSON
    #[error("response is not JSON: {0}")]
    NotJson(String),
}

impl FetchError {
    /// Whether the server answered at all
    #[inline]
    #[must_use]
    pub fn is_http_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Whether this is a network-level failure
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }
}

impl From<ValidationError> for FetchError {
    /// Only body-level parse failures map to fetch errors
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyBody => Self::EmptyBody,
            ValidationError::NotJson(msg) => Self::NotJson(msg),
            other => Self::NotJson(other.to_string()),
        }
    }
}

/// Why a poll cycle could not commit live data
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PollFailure {
    /// Fetch failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Payload failed validation
    #[error("invalid payload: {0}")]
    Invalid(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_classification() {
        assert!(FetchError::Timeout.is_transport());
        assert!(FetchError::Transport("refused".into()).is_transport());
        assert!(!FetchError::EmptyBody.is_transport());
        assert!(FetchError::Status { status: 500, url: "u".into() }.is_http_status());
    }

    #[test]
    fn body_errors_map_to_fetch_errors() {
        assert_eq!(FetchError::from(ValidationError::EmptyBody), FetchError::EmptyBody);
        assert!(matches!(
            FetchError::from(ValidationError::NotJson("eof".into())),
            FetchError::NotJson(_)
        ));
    }

    #[test]
    fn poll_failure_display() {
        let failure = PollFailure::from(FetchError::Status {
            status: 503,
            url: "https://api.example/gq-core/entities".into(),
        });
        assert!(failure.to_string().contains("503"));

        let failure = PollFailure::from(ValidationError::MissingArray { key: "pairs" });
        assert!(failure.to_string().starts_with("invalid payload"));
    }
}
