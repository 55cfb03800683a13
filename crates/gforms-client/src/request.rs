//! Request composition
//!
//! Requests are hand-composed HTTP/1.1: the target service is sensitive to
//! the exact request-line and header layout, so the block below is emitted
//! byte-for-byte in a fixed order. An envelope is built fresh per call and
//! consumed by the send path, so the payload is dropped as soon as it has
//! been written.

/// A composed request: head (request line + headers + blank line) and body
#[derive(Debug)]
pub(crate) struct RequestEnvelope {
    head: String,
    body: Option<Vec<u8>>,
}

impl RequestEnvelope {
    /// Compose a request for `method path` against `host`
    ///
    /// `body: None` omits the entity headers entirely; `Some("")` emits
    /// `Content-Length: 0` with a JSON content type (used by bodyless POST
    /// endpoints such as watch renewal). The bearer token is whatever the
    /// credential state holds at compose time.
    pub(crate) fn compose(
        method: &str,
        path: &str,
        host: &str,
        token: &str,
        body: Option<&str>,
    ) -> Self {
        let mut head = String::with_capacity(256 + path.len() + token.len());
        head.push_str(method);
        head.push(' ');
        head.push_str(path);
        head.push_str(" HTTP/1.1\r\n");
        head.push_str("Host: ");
        head.push_str(host);
        head.push_str("\r\n");
        head.push_str("Authorization: Bearer ");
        head.push_str(token);
        head.push_str("\r\n");

        if let Some(body) = body {
            head.push_str("Content-Length: ");
            head.push_str(&body.len().to_string());
            head.push_str("\r\n");
            head.push_str("Content-Type: application/json\r\n");
        }

        head.push_str("Connection: keep-alive\r\n");
        head.push_str("Keep-Alive: timeout=30, max=100\r\n");
        head.push_str("Accept-Encoding: identity;q=1,chunked;q=0.1,*;q=0\r\n");
        head.push_str("\r\n");

        Self { head, body: body.map(|b| b.as_bytes().to_vec()) }
    }

    /// Consume the envelope into the bytes to put on the wire
    pub(crate) fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.head.into_bytes();
        if let Some(body) = self.body {
            bytes.extend_from_slice(&body);
        }
        bytes
    }

    #[cfg(test)]
    pub(crate) fn head(&self) -> &str {
        &self.head
    }
}
