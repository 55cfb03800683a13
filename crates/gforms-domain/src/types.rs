//! Common data types used throughout the client

use serde::{Deserialize, Serialize};

use crate::constants::{DRIVE_API_HOST, FORMS_API_HOST};
use crate::errors::GFormsError;

/// Which of the two fixed REST API hosts a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostKind {
    /// `forms.googleapis.com`
    Forms,
    /// `www.googleapis.com`
    Drive,
}

impl HostKind {
    /// The fixed hostname for this API host
    pub fn host(&self) -> &'static str {
        match self {
            Self::Forms => FORMS_API_HOST,
            Self::Drive => DRIVE_API_HOST,
        }
    }
}

/// Lifecycle status of the externally managed OAuth2 credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TokenStatus {
    #[default]
    Uninitialized,
    Generating,
    Ready,
    Error,
}

/// Snapshot of credential state handed to the token status callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub status: TokenStatus,
    /// Populated when `status` is [`TokenStatus::Error`]
    pub error: Option<String>,
}

/// Outcome of the last request, kept out-of-band on the client
///
/// Mirrors the wire-level result: an HTTP status when a response was read,
/// or a negative transport error code when the failure happened below HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastStatus {
    Http(u16),
    Transport(i32),
}

/// A successfully received HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    /// Raw response body; callers re-parse into their own types
    pub body: String,
}

impl ApiResponse {
    /// Parse the raw body as JSON
    pub fn json(&self) -> Result<serde_json::Value, GFormsError> {
        serde_json::from_str(&self.body)
            .map_err(|e| GFormsError::Protocol(format!("response body is not JSON: {e}")))
    }
}

/// Result of the two-phase `create_form` operation
///
/// Phase one creates the form; phase two grants the supplied user write
/// access to it through the Drive API. A phase-two failure never masks a
/// successful creation: it is reported here instead of through the
/// operation's `Result`.
#[derive(Debug, Clone)]
pub struct CreateFormOutcome {
    /// The creation response (phase one)
    pub response: ApiResponse,
    /// Identifier extracted from the creation response; `None` when the
    /// response carried no `formId`, in which case phase two is skipped
    pub form_id: Option<String>,
    /// Failure of the dependent permission grant (phase two), if any
    pub permission_error: Option<GFormsError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_kind_maps_to_fixed_hosts() {
        assert_eq!(HostKind::Forms.host(), "forms.googleapis.com");
        assert_eq!(HostKind::Drive.host(), "www.googleapis.com");
    }

    #[test]
    fn api_response_json_round_trip() {
        let resp = ApiResponse { status: 200, body: r#"{"formId":"abc"}"#.into() };
        let value = resp.json().unwrap();
        assert_eq!(value["formId"], "abc");
    }

    #[test]
    fn api_response_json_rejects_non_json() {
        let resp = ApiResponse { status: 200, body: "not json".into() };
        assert!(matches!(resp.json(), Err(GFormsError::Protocol(_))));
    }
}
