//! Client configuration

use std::time::Duration;

use gforms_domain::constants::{
    DEFAULT_CLOCK_SYNC_TIMEOUT_MS, DEFAULT_IO_TIMEOUT_SECS, HTTPS_PORT,
};
use gforms_domain::HostKind;
use serde::{Deserialize, Serialize};

use crate::certs::TrustPolicy;

/// Network endpoint for one API host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

/// Configuration for [`GFormsClient`](crate::GFormsClient)
///
/// The endpoints default to the fixed Google API hosts. Overriding one
/// redirects both the connection and the `Host` header — the escape hatch
/// for constrained network stacks that need pre-resolved addresses, and for
/// tests against local servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub forms_endpoint: Endpoint,
    pub drive_endpoint: Endpoint,
    /// Behavior when a certificate file cannot be loaded
    pub trust_policy: TrustPolicy,
    /// Require a synchronized clock before applying certificate material
    pub require_clock_for_tls: bool,
    /// Upper bound on the clock gate's wait
    pub clock_sync_timeout: Duration,
    /// Per-operation I/O timeout applied by the default transport
    pub io_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            forms_endpoint: Endpoint::new(HostKind::Forms.host(), HTTPS_PORT),
            drive_endpoint: Endpoint::new(HostKind::Drive.host(), HTTPS_PORT),
            trust_policy: TrustPolicy::default(),
            require_clock_for_tls: true,
            clock_sync_timeout: Duration::from_millis(DEFAULT_CLOCK_SYNC_TIMEOUT_MS),
            io_timeout: Duration::from_secs(DEFAULT_IO_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Endpoint for the given host kind
    pub fn endpoint(&self, host: HostKind) -> &Endpoint {
        match host {
            HostKind::Forms => &self.forms_endpoint,
            HostKind::Drive => &self.drive_endpoint,
        }
    }
}
