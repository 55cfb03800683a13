//! The client object
//!
//! One `GFormsClient` owns one transport, one certificate descriptor, and
//! the out-of-band status of the last request. Operations take `&mut self`:
//! exactly one request is in flight per instance, and callers that share an
//! instance across tasks must serialize access themselves.

use std::sync::Arc;

use gforms_domain::{GFormsError, HostKind, LastStatus, Result};

use crate::auth::TokenProvider;
use crate::certs::{CertificateSource, CertificateStore};
use crate::clock::{ClockProvider, SystemClock};
use crate::config::ClientConfig;
use crate::storage::{FileStorage, LocalStorage};
use crate::transport::{SecureTransport, TlsTransport};

/// Google Forms / Drive client over a single secure connection
pub struct GFormsClient {
    pub(crate) config: ClientConfig,
    pub(crate) token: Arc<dyn TokenProvider>,
    pub(crate) clock: Arc<dyn ClockProvider>,
    pub(crate) storage: Arc<dyn FileStorage>,
    pub(crate) certs: CertificateStore,
    pub(crate) transport: Option<Box<dyn SecureTransport>>,
    pub(crate) last_status: Option<LastStatus>,
    pub(crate) last_error: Option<String>,
}

impl GFormsClient {
    /// Start building a client
    pub fn builder() -> GFormsClientBuilder {
        GFormsClientBuilder::default()
    }

    /// Whether a valid bearer token is currently available
    pub fn ready(&self) -> bool {
        self.token.ready()
    }

    /// The current access token, empty until the credential is ready
    pub fn access_token(&self) -> String {
        self.token.access_token().unwrap_or_default()
    }

    /// Set an embedded PEM root certificate for server authorization
    pub fn set_cert(&mut self, pem: &'static str) {
        self.certs.set(CertificateSource::PemStatic(pem));
    }

    /// Set an in-memory PEM root certificate for server authorization
    pub fn set_cert_pem(&mut self, pem: impl Into<String>) {
        self.certs.set(CertificateSource::PemBuffer(pem.into()));
    }

    /// Set a PEM root certificate file, resolved through the storage
    /// capability at the next session bootstrap
    pub fn set_cert_file(&mut self, path: impl Into<String>) {
        self.certs.set(CertificateSource::File { path: path.into() });
    }

    /// Replace the transport; the next request bootstraps a fresh session
    pub fn set_transport(&mut self, transport: Box<dyn SecureTransport>) {
        self.transport = Some(transport);
    }

    /// HTTP status or negative transport code of the last request
    pub fn last_status(&self) -> Option<LastStatus> {
        self.last_status
    }

    /// Error message extracted from the last failed request
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Clear cached credential state and drop the connection
    ///
    /// The next operation starts from a clean session bootstrap once the
    /// external auth manager has produced a fresh token.
    pub async fn reset(&mut self) {
        self.token.reset();
        if let Some(transport) = self.transport.as_deref_mut() {
            transport.close().await;
        }
        self.last_status = None;
        self.last_error = None;
    }

    /// Fail fast when no usable bearer token exists; no I/O is performed
    pub(crate) fn check_credential(&self) -> Result<()> {
        if self.token.ready() {
            Ok(())
        } else {
            Err(GFormsError::CredentialNotReady)
        }
    }

    /// Run the full pipeline for one request: bootstrap, compose, resolve
    pub(crate) async fn execute(
        &mut self,
        host: HostKind,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<gforms_domain::ApiResponse> {
        self.ensure_session(host).await?;

        let endpoint_host = self.config.endpoint(host).host.clone();
        let token = self.access_token();
        let envelope = crate::request::RequestEnvelope::compose(
            method,
            path,
            &endpoint_host,
            &token,
            body.as_deref(),
        );

        self.process_request(envelope).await
    }
}

/// Builder for [`GFormsClient`]
///
/// Only the token provider is required; the other capabilities default to
/// the TLS transport, the system clock, and local file storage.
#[derive(Default)]
pub struct GFormsClientBuilder {
    config: Option<ClientConfig>,
    token: Option<Arc<dyn TokenProvider>>,
    clock: Option<Arc<dyn ClockProvider>>,
    storage: Option<Arc<dyn FileStorage>>,
    transport: Option<Box<dyn SecureTransport>>,
}

impl GFormsClientBuilder {
    /// Set the client configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the credential provider (required)
    pub fn token(mut self, token: Arc<dyn TokenProvider>) -> Self {
        self.token = Some(token);
        self
    }

    /// Override the clock capability
    pub fn clock(mut self, clock: Arc<dyn ClockProvider>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Override the file storage capability
    pub fn storage(mut self, storage: Arc<dyn FileStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Supply an external transport instead of the default TLS socket
    pub fn transport(mut self, transport: Box<dyn SecureTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    ///
    /// Without a token provider the credential stays unready and every
    /// operation reports `CredentialNotReady`.
    pub fn build(self) -> GFormsClient {
        let config = self.config.unwrap_or_default();
        let transport = self
            .transport
            .unwrap_or_else(|| Box::new(TlsTransport::with_timeout(config.io_timeout)));

        GFormsClient {
            token: self.token.unwrap_or_else(|| Arc::new(crate::auth::SharedTokenState::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            storage: self.storage.unwrap_or_else(|| Arc::new(LocalStorage)),
            certs: CertificateStore::new(),
            transport: Some(transport),
            last_status: None,
            last_error: None,
            config,
        }
    }
}
