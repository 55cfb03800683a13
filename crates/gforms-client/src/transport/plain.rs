//! Plaintext TCP transport
//!
//! No TLS: for local development servers and test harnesses only. Trust
//! material staged on this transport is accepted and ignored.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use gforms_domain::constants::DEFAULT_IO_TIMEOUT_SECS;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use super::{AppliedTrust, CertState, SecureTransport};

/// TCP transport without TLS
pub struct PlainTransport {
    io_timeout: Duration,
    trust_applied: bool,
    stream: Option<TcpStream>,
}

impl PlainTransport {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_IO_TIMEOUT_SECS))
    }

    pub fn with_timeout(io_timeout: Duration) -> Self {
        Self { io_timeout, trust_applied: false, stream: None }
    }
}

impl Default for PlainTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecureTransport for PlainTransport {
    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn cert_state(&self) -> CertState {
        if self.trust_applied {
            CertState::Applied
        } else {
            CertState::Undefined
        }
    }

    fn set_trust(&mut self, _trust: AppliedTrust) {
        // nothing to verify on a plaintext socket
        self.trust_applied = true;
    }

    async fn connect(&mut self, host: &str, port: u16) -> io::Result<()> {
        let stream = tokio::time::timeout(self.io_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;
        debug!(host, port, "plaintext connection established");
        self.stream = Some(stream);
        Ok(())
    }

    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let timeout = self.io_timeout;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "not connected"))?;
        tokio::time::timeout(timeout, stream.write_all(buf))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "write timed out"))?
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let timeout = self.io_timeout;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "not connected"))?;
        tokio::time::timeout(timeout, stream.read(buf))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "read timed out"))?
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
    }
}
