//! Default TLS transport
//!
//! `tokio` TCP with `native-tls` for the handshake. Trust material staged
//! via [`SecureTransport::set_trust`] is applied when the next connection is
//! opened: a custom root certificate replaces the built-in roots entirely,
//! matching the pinned-CA model of constrained deployments.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use gforms_domain::constants::DEFAULT_IO_TIMEOUT_SECS;
use native_tls::{Certificate, TlsConnector};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use super::{AppliedTrust, CertState, SecureTransport};

/// TCP + TLS transport backed by the platform TLS implementation
pub struct TlsTransport {
    trust: Option<AppliedTrust>,
    io_timeout: Duration,
    stream: Option<tokio_native_tls::TlsStream<TcpStream>>,
}

impl TlsTransport {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_IO_TIMEOUT_SECS))
    }

    /// Create with a custom per-operation I/O timeout
    pub fn with_timeout(io_timeout: Duration) -> Self {
        Self { trust: None, io_timeout, stream: None }
    }

    fn connector(&self) -> io::Result<TlsConnector> {
        let mut builder = TlsConnector::builder();
        if let Some(AppliedTrust::Custom(pem)) = &self.trust {
            let cert = Certificate::from_pem(pem.as_bytes())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            builder.add_root_certificate(cert);
            builder.disable_built_in_roots(true);
        }
        builder.build().map_err(io::Error::other)
    }

    async fn timed<T>(
        &self,
        fut: impl std::future::Future<Output = io::Result<T>>,
    ) -> io::Result<T> {
        tokio::time::timeout(self.io_timeout, fut)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "transport I/O timed out"))?
    }
}

impl Default for TlsTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecureTransport for TlsTransport {
    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn cert_state(&self) -> CertState {
        if self.trust.is_some() {
            CertState::Applied
        } else {
            CertState::Undefined
        }
    }

    fn set_trust(&mut self, trust: AppliedTrust) {
        self.trust = Some(trust);
    }

    async fn connect(&mut self, host: &str, port: u16) -> io::Result<()> {
        let connector = tokio_native_tls::TlsConnector::from(self.connector()?);

        let tcp = self.timed(TcpStream::connect((host, port))).await?;
        let stream = self
            .timed(async {
                connector
                    .connect(host, tcp)
                    .await
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            })
            .await?;

        debug!(host, port, "TLS connection established");
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
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "transport I/O timed out"))?
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let timeout = self.io_timeout;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "not connected"))?;
        tokio::time::timeout(timeout, stream.read(buf))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "transport I/O timed out"))?
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
    }
}
