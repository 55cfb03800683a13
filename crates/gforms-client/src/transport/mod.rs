//! Secure transport capability
//!
//! The client drives one byte transport through this seam. The variant is
//! chosen at construction time: the default TLS socket ([`TlsTransport`]),
//! the plaintext socket for local development servers
//! ([`PlainTransport`]), or any integrator-supplied implementation.

mod plain;
mod tls;

use async_trait::async_trait;

pub use plain::PlainTransport;
pub use tls::TlsTransport;

/// Trust material staged on a transport, consumed at the next connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedTrust {
    /// Validate the server against the platform's trust roots
    SystemRoots,
    /// Validate the server against this root certificate only
    Custom(String),
}

/// Whether trust material has ever been applied to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertState {
    Undefined,
    Applied,
}

/// A single client-owned TCP/TLS connection
///
/// Implementations hold at most one live connection. `set_trust` stages
/// material for the next `connect`; reconfiguring trust does not disturb an
/// established connection.
#[async_trait]
pub trait SecureTransport: Send {
    /// Whether a connection is currently established
    fn is_connected(&self) -> bool;

    /// Whether trust material has been applied since construction
    fn cert_state(&self) -> CertState;

    /// Stage trust material for subsequent connections
    fn set_trust(&mut self, trust: AppliedTrust);

    /// Open a connection to `host:port`
    async fn connect(&mut self, host: &str, port: u16) -> std::io::Result<()>;

    /// Write the full buffer to the connection
    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()>;

    /// Read available bytes into `buf`; `Ok(0)` signals end of stream
    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Tear the connection down; subsequent requests re-connect
    async fn close(&mut self);
}

/// Negative code for a transport-level failure, for out-of-band reporting
pub(crate) fn transport_code(err: &std::io::Error) -> i32 {
    -err.raw_os_error().unwrap_or(1)
}
