//! # gforms Client
//!
//! Google Forms and Google Drive REST client over OAuth2 service-account
//! bearer tokens, designed for single-connection, single-outstanding-request
//! deployments.
//!
//! The client owns one secure connection and re-establishes it lazily: each
//! operation bootstraps the session (certificate provisioning, clock gate,
//! connect), composes the raw HTTP/1.1 request with a fixed header layout,
//! and resolves the response into an [`ApiResponse`] or a classified
//! [`GFormsError`].
//!
//! External concerns are injected as trait capabilities:
//! - [`auth::TokenProvider`] — bearer token state (acquisition is external)
//! - [`transport::SecureTransport`] — TCP/TLS byte transport
//! - [`clock::ClockProvider`] — wall-clock sync for certificate validation
//! - [`storage::FileStorage`] — certificate file loading
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gforms_client::auth::SharedTokenState;
//! use gforms_client::GFormsClient;
//!
//! # async fn run() -> gforms_domain::Result<()> {
//! let token = Arc::new(SharedTokenState::new());
//! // token state is driven by an external auth manager
//! let mut client = GFormsClient::builder().token(token).build();
//! let form = client.get_form("my-form-id").await?;
//! println!("{}", form.body);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod certs;
pub mod client;
pub mod clock;
pub mod config;
mod drive;
pub mod forms;
mod request;
mod response;
mod session;
pub mod storage;
pub mod transport;

// Re-export commonly used items
pub use certs::{CertificateSource, TrustPolicy};
pub use client::{GFormsClient, GFormsClientBuilder};
pub use config::{ClientConfig, Endpoint};
pub use forms::ListResponsesQuery;
pub use gforms_domain::{
    ApiResponse, CreateFormOutcome, GFormsError, HostKind, LastStatus, Result, TokenInfo,
    TokenStatus,
};
