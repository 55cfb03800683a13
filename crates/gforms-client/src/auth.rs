//! Credential capability
//!
//! Token acquisition and refresh live outside this crate; the client only
//! reads the current bearer token and its readiness. The token is read at
//! request-compose time, so a request composed before an external refresh
//! completes carries the stale token and surfaces as an auth failure from
//! the server.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use gforms_domain::{TokenInfo, TokenStatus};
use tracing::debug;

/// Callback invoked on token status transitions
pub type TokenStatusCallback = Arc<dyn Fn(TokenInfo) + Send + Sync>;

/// Read-only view of the externally managed OAuth2 credential
///
/// Implementations must be cheap to call: these methods sit on the request
/// hot path and must not perform I/O or refresh tokens.
pub trait TokenProvider: Send + Sync {
    /// Current credential lifecycle status
    fn status(&self) -> TokenStatus;

    /// Current access token, if one has been generated
    fn access_token(&self) -> Option<String>;

    /// Expiry of the current token, if known
    fn expires_at(&self) -> Option<DateTime<Utc>>;

    /// Clear cached credential fields; the next token must be regenerated
    /// by the external auth manager
    fn reset(&self);

    /// Whether a currently valid bearer token is available
    fn ready(&self) -> bool {
        self.status() == TokenStatus::Ready
    }
}

#[derive(Debug, Default)]
struct TokenState {
    status: TokenStatus,
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

/// Shared credential state driven by an external auth manager
///
/// The integrator's auth manager pushes token updates in via
/// [`set_token`](Self::set_token) / [`set_status`](Self::set_status); the
/// client reads them through [`TokenProvider`]. Status transitions fire the
/// optional callback for observability.
#[derive(Default)]
pub struct SharedTokenState {
    inner: RwLock<TokenState>,
    callback: Option<TokenStatusCallback>,
}

impl SharedTokenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a callback fired on every status transition
    pub fn with_callback(callback: TokenStatusCallback) -> Self {
        Self { inner: RwLock::new(TokenState::default()), callback: Some(callback) }
    }

    /// Install a freshly generated token and mark the credential ready
    pub fn set_token(&self, access_token: impl Into<String>, expires_at: DateTime<Utc>) {
        {
            let mut state = self.write();
            state.access_token = Some(access_token.into());
            state.expires_at = Some(expires_at);
            state.error = None;
        }
        self.transition(TokenStatus::Ready);
    }

    /// Record a status transition (e.g. `Generating`, `Error`)
    pub fn set_status(&self, status: TokenStatus, error: Option<String>) {
        {
            let mut state = self.write();
            state.error = error;
        }
        self.transition(status);
    }

    fn transition(&self, status: TokenStatus) {
        let info = {
            let mut state = self.write();
            if state.status == status {
                return;
            }
            state.status = status;
            TokenInfo { status, error: state.error.clone() }
        };
        debug!(status = ?info.status, "token status transition");
        if let Some(callback) = &self.callback {
            callback(info);
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, TokenState> {
        // a poisoned lock only happens if a writer panicked; the state is
        // plain data, so recover the guard rather than propagate
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, TokenState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenProvider for SharedTokenState {
    fn status(&self) -> TokenStatus {
        self.read().status
    }

    fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.read().expires_at
    }

    fn reset(&self) {
        {
            let mut state = self.write();
            state.access_token = None;
            state.expires_at = None;
            state.error = None;
        }
        self.transition(TokenStatus::Uninitialized);
    }
}
