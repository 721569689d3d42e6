use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildviewError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Buildbot API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed response from {path}: {reason}")]
    MalformedResponse { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failure of an in-flight fetch that this caller joined rather than started.
    #[error(transparent)]
    Shared(Arc<BuildviewError>),
}

impl BuildviewError {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Recovers the owned error when this is the last handle to it.
    pub(crate) fn from_shared(err: Arc<BuildviewError>) -> Self {
        Arc::try_unwrap(err).unwrap_or_else(Self::Shared)
    }
}

pub type Result<T> = std::result::Result<T, BuildviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_shared_recovers_sole_owner() {
        let err = Arc::new(BuildviewError::malformed("/api/v2/builders", "not an object"));
        let recovered = BuildviewError::from_shared(err);
        assert!(matches!(recovered, BuildviewError::MalformedResponse { .. }));
    }

    #[test]
    fn test_from_shared_keeps_message_when_still_shared() {
        let err = Arc::new(BuildviewError::Status {
            status: 503,
            message: "down".into(),
        });
        let other = err.clone();

        let shared = BuildviewError::from_shared(err);

        assert!(matches!(shared, BuildviewError::Shared(_)));
        assert_eq!(shared.to_string(), other.to_string());
        assert_eq!(shared.to_string(), "Buildbot API error (status 503): down");
    }
}
