//! Certificate provisioning
//!
//! Trust material is described once and reapplied to the transport only when
//! it changes. Change detection is an explicit version counter bumped on
//! every replacement; the descriptor is "dirty" while the applied version
//! lags behind. At most one descriptor is active: setting a file clears a
//! PEM descriptor and vice versa (last set wins).

use std::time::Duration;

use gforms_domain::{GFormsError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{ensure_clock_ready, ClockProvider};
use crate::storage::FileStorage;
use crate::transport::{AppliedTrust, CertState, SecureTransport};

/// Where the root certificate comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateSource {
    /// PEM data embedded in the binary
    PemStatic(&'static str),
    /// PEM data held in memory
    PemBuffer(String),
    /// PEM file resolved through the [`FileStorage`] capability
    File { path: String },
}

/// What to do when a certificate file cannot be loaded
///
/// Proceeding with reduced trust is a policy decision for the integrator,
/// never a hidden default; the default fails the connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrustPolicy {
    /// A load failure aborts the connection attempt
    #[default]
    FailClosed,
    /// A load failure falls back to the platform trust roots (logged as a
    /// degraded-trust condition, never silent)
    FailOpen,
}

/// Active certificate descriptor with dirty tracking
#[derive(Debug, Default)]
pub struct CertificateStore {
    source: Option<CertificateSource>,
    version: u64,
    applied_version: u64,
}

impl CertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active descriptor; the previous one is discarded
    pub fn set(&mut self, source: CertificateSource) {
        self.source = Some(source);
        self.version += 1;
    }

    pub fn source(&self) -> Option<&CertificateSource> {
        self.source.as_ref()
    }

    /// Whether the descriptor changed since it was last applied
    pub fn is_dirty(&self) -> bool {
        self.version != self.applied_version
    }

    /// Apply the descriptor to the transport if needed
    ///
    /// No-op when the descriptor is clean and the transport already carries
    /// known trust material. When certificate material is present and the
    /// platform requires wall-clock-anchored validation, the clock gate runs
    /// first; an unsynchronized clock degrades but does not abort.
    pub(crate) async fn provision(
        &mut self,
        transport: &mut dyn SecureTransport,
        clock: &dyn ClockProvider,
        storage: &dyn FileStorage,
        policy: TrustPolicy,
        require_clock: bool,
        clock_timeout: Duration,
    ) -> Result<()> {
        if !self.is_dirty() && transport.cert_state() == CertState::Applied {
            return Ok(());
        }

        if require_clock && self.source.is_some() && !ensure_clock_ready(clock, clock_timeout).await
        {
            warn!("proceeding with certificate application without verified time");
        }

        let trust = match &self.source {
            None => AppliedTrust::SystemRoots,
            Some(CertificateSource::PemStatic(pem)) => AppliedTrust::Custom((*pem).to_string()),
            Some(CertificateSource::PemBuffer(pem)) => AppliedTrust::Custom(pem.clone()),
            Some(CertificateSource::File { path }) => match storage.read(path).await {
                Ok(bytes) => {
                    let pem = String::from_utf8(bytes).map_err(|_| {
                        GFormsError::Certificate(format!("certificate file {path} is not PEM text"))
                    })?;
                    AppliedTrust::Custom(pem)
                }
                Err(err) => match policy {
                    TrustPolicy::FailClosed => {
                        return Err(GFormsError::Certificate(format!(
                            "failed to load certificate file {path}: {err}"
                        )));
                    }
                    TrustPolicy::FailOpen => {
                        warn!(path = %path, error = %err, "certificate file unavailable, falling back to system trust roots");
                        AppliedTrust::SystemRoots
                    }
                },
            },
        };

        debug!(dirty = self.is_dirty(), "applying trust material to transport");
        transport.set_trust(trust);
        self.applied_version = self.version;
        Ok(())
    }
}
