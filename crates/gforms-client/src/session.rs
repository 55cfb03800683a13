//! Session bootstrap
//!
//! Guarantees exactly one usable secure connection before a request goes
//! out: certificate provisioning (with its clock gate) runs first, then the
//! connection is opened only if the transport is not already connected.
//! Repeated calls while connected reapply nothing but a dirty certificate
//! delta and never open a duplicate connection.

use gforms_domain::{GFormsError, HostKind, LastStatus, Result};
use tracing::debug;

use crate::client::GFormsClient;
use crate::transport::transport_code;

impl GFormsClient {
    /// Ensure a usable secure connection to the given host exists
    pub(crate) async fn ensure_session(&mut self, host: HostKind) -> Result<()> {
        let transport =
            self.transport.as_deref_mut().ok_or(GFormsError::TransportUnavailable)?;

        self.certs
            .provision(
                transport,
                self.clock.as_ref(),
                self.storage.as_ref(),
                self.config.trust_policy,
                self.config.require_clock_for_tls,
                self.config.clock_sync_timeout,
            )
            .await?;

        if !transport.is_connected() {
            let endpoint = self.config.endpoint(host);
            debug!(host = %endpoint.host, port = endpoint.port, "opening connection");

            if let Err(err) = transport.connect(&endpoint.host, endpoint.port).await {
                self.last_status = Some(LastStatus::Transport(transport_code(&err)));
                let message = format!("connect to {}:{}: {err}", endpoint.host, endpoint.port);
                self.last_error = Some(message.clone());
                return Err(GFormsError::ConnectionFailed(message));
            }
        }

        if transport.is_connected() {
            Ok(())
        } else {
            Err(GFormsError::ConnectionFailed("transport reports disconnected".into()))
        }
    }
}
