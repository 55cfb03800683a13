//! Error types used throughout the client
//!
//! Every failure is reported through `GFormsError`; none abort. A failed
//! request always leaves the client in a state where the next call can
//! re-bootstrap the session and retry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categories of client errors, used for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// No usable bearer token; retry once the credential is ready
    Credential,
    /// Transport could not be used or the connection could not be opened
    Connection,
    /// Certificate or file-storage failure; non-retryable until the
    /// descriptor is corrected
    Trust,
    /// HTTP response received but indicates failure
    Server,
    /// Response could not be read or parsed as HTTP
    Protocol,
}

/// Main error type for gforms operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum GFormsError {
    #[error("credential not ready")]
    CredentialNotReady,

    #[error("no transport configured")]
    TransportUnavailable,

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("request write failed: {0}")]
    WriteFailed(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl GFormsError {
    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CredentialNotReady => ErrorCategory::Credential,
            Self::TransportUnavailable | Self::ConnectionFailed(_) | Self::WriteFailed(_) => {
                ErrorCategory::Connection
            }
            Self::Certificate(_) | Self::Storage(_) => ErrorCategory::Trust,
            Self::Server { .. } => ErrorCategory::Server,
            Self::Protocol(_) => ErrorCategory::Protocol,
        }
    }

    /// Check if retrying the operation as-is can succeed
    ///
    /// Credential and trust failures need external correction first; a
    /// connection, server, or protocol failure leaves the client able to
    /// re-bootstrap and retry immediately.
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Connection | ErrorCategory::Server | ErrorCategory::Protocol
        ) && !matches!(self, Self::TransportUnavailable)
    }
}

/// Result type alias for gforms operations
pub type Result<T> = std::result::Result<T, GFormsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_categories() {
        assert_eq!(GFormsError::CredentialNotReady.category(), ErrorCategory::Credential);
        assert_eq!(
            GFormsError::ConnectionFailed("refused".into()).category(),
            ErrorCategory::Connection
        );
        assert_eq!(
            GFormsError::Certificate("bad pem".into()).category(),
            ErrorCategory::Trust
        );
        assert_eq!(
            GFormsError::Server { status: 400, message: "Invalid argument".into() }.category(),
            ErrorCategory::Server
        );
        assert_eq!(GFormsError::Protocol("truncated".into()).category(), ErrorCategory::Protocol);
    }

    #[test]
    fn retry_policy() {
        assert!(GFormsError::ConnectionFailed("refused".into()).should_retry());
        assert!(GFormsError::Server { status: 500, message: "boom".into() }.should_retry());
        assert!(GFormsError::WriteFailed("broken pipe".into()).should_retry());
        assert!(!GFormsError::CredentialNotReady.should_retry());
        assert!(!GFormsError::TransportUnavailable.should_retry());
        assert!(!GFormsError::Certificate("missing file".into()).should_retry());
    }

    #[test]
    fn serializes_with_tag_and_detail() {
        let err = GFormsError::Server { status: 403, message: "denied".into() };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Server");
        assert_eq!(json["detail"]["status"], 403);
        assert_eq!(json["detail"]["message"], "denied");
    }
}
