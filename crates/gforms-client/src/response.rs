//! Response resolution
//!
//! Drives a composed request over the established connection and turns the
//! raw HTTP response into a classified result. Any failure closes the
//! connection so the next request starts from a clean session bootstrap
//! instead of reusing a possibly desynchronized stream.

use gforms_domain::{ApiResponse, GFormsError, LastStatus, Result};
use tracing::{debug, warn};

use crate::client::GFormsClient;
use crate::request::RequestEnvelope;
use crate::transport::{transport_code, SecureTransport};

const READ_CHUNK: usize = 2048;

/// A fully read HTTP response before classification
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: u16,
    pub body: String,
    pub close: bool,
}

impl GFormsClient {
    /// Write the envelope, read the response, classify the outcome
    pub(crate) async fn process_request(&mut self, envelope: RequestEnvelope) -> Result<ApiResponse> {
        let transport =
            self.transport.as_deref_mut().ok_or(GFormsError::TransportUnavailable)?;

        let bytes = envelope.into_bytes();
        let write_result = transport.write_all(&bytes).await;
        drop(bytes); // the payload is not held past the write

        if let Err(err) = write_result {
            self.last_status = Some(LastStatus::Transport(transport_code(&err)));
            self.last_error = Some(err.to_string());
            transport.close().await;
            return Err(GFormsError::WriteFailed(err.to_string()));
        }

        match read_response(transport).await {
            Ok(raw) => {
                self.last_status = Some(LastStatus::Http(raw.status));
                if (200..300).contains(&raw.status) {
                    self.last_error = None;
                    if raw.close {
                        transport.close().await;
                    }
                    debug!(status = raw.status, "request resolved");
                    Ok(ApiResponse { status: raw.status, body: raw.body })
                } else {
                    let message = extract_error_message(&raw.body);
                    warn!(status = raw.status, message = %message, "server reported failure");
                    self.last_error = Some(message.clone());
                    transport.close().await;
                    Err(GFormsError::Server { status: raw.status, message })
                }
            }
            Err(err) => {
                self.last_status = Some(LastStatus::Transport(-1));
                self.last_error = Some(err.to_string());
                transport.close().await;
                Err(err)
            }
        }
    }
}

/// Extract a server-supplied error message from a failure body
///
/// Google error documents carry `error.message`; anything else (non-JSON,
/// field missing) falls back to the raw body verbatim.
pub(crate) fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str().map(str::to_owned)))
        .unwrap_or_else(|| body.to_string())
}

/// Read one HTTP/1.1 response from the transport
pub(crate) async fn read_response(transport: &mut dyn SecureTransport) -> Result<RawResponse> {
    let mut reader = TransportReader::new(transport);

    let status_line = reader
        .read_line()
        .await?
        .ok_or_else(|| GFormsError::Protocol("connection closed before status line".into()))?;
    let status = parse_status_line(&status_line)?;

    let mut content_length: Option<usize> = None;
    let mut chunked = false;
    let mut close = false;
    loop {
        let line = reader
            .read_line()
            .await?
            .ok_or_else(|| GFormsError::Protocol("connection closed inside headers".into()))?;
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(GFormsError::Protocol(format!("malformed header line: {line}")));
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        match name.as_str() {
            "content-length" => {
                let parsed = value.parse::<usize>().map_err(|_| {
                    GFormsError::Protocol(format!("invalid Content-Length: {value}"))
                })?;
                content_length = Some(parsed);
            }
            "transfer-encoding" => {
                chunked = value.to_ascii_lowercase().contains("chunked");
            }
            "connection" => {
                close = value.eq_ignore_ascii_case("close");
            }
            _ => {}
        }
    }

    let body = if chunked {
        read_chunked_body(&mut reader).await?
    } else if let Some(len) = content_length {
        reader.read_exact(len).await?
    } else {
        reader.read_to_end().await?
    };

    Ok(RawResponse {
        status,
        body: String::from_utf8_lossy(&body).into_owned(),
        close,
    })
}

fn parse_status_line(line: &str) -> Result<u16> {
    if !line.starts_with("HTTP/") {
        return Err(GFormsError::Protocol(format!("not an HTTP status line: {line}")));
    }
    line.split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| GFormsError::Protocol(format!("unparsable status line: {line}")))
}

async fn read_chunked_body(reader: &mut TransportReader<'_>) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let size_line = reader
            .read_line()
            .await?
            .ok_or_else(|| GFormsError::Protocol("connection closed inside chunked body".into()))?;
        let size_field = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_field, 16)
            .map_err(|_| GFormsError::Protocol(format!("invalid chunk size: {size_line}")))?;

        if size == 0 {
            // consume trailers up to the terminating blank line
            while let Some(line) = reader.read_line().await? {
                if line.is_empty() {
                    break;
                }
            }
            return Ok(body);
        }

        body.extend_from_slice(&reader.read_exact(size).await?);
        // chunk data is followed by CRLF
        reader.read_exact(2).await?;
    }
}

/// Buffered line/byte reader over the transport capability
struct TransportReader<'a> {
    transport: &'a mut dyn SecureTransport,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl<'a> TransportReader<'a> {
    fn new(transport: &'a mut dyn SecureTransport) -> Self {
        Self { transport, buf: Vec::new(), pos: 0, eof: false }
    }

    /// Pull more bytes from the transport; returns false at end of stream
    async fn fill(&mut self) -> Result<bool> {
        if self.eof {
            return Ok(false);
        }
        let mut chunk = [0u8; READ_CHUNK];
        let n = self
            .transport
            .read(&mut chunk)
            .await
            .map_err(|e| GFormsError::Protocol(format!("read failed: {e}")))?;
        if n == 0 {
            self.eof = true;
            return Ok(false);
        }
        self.buf.extend_from_slice(&chunk[..n]);
        Ok(true)
    }

    /// Read one line, stripping the trailing CRLF; `None` at a clean end of
    /// stream with no pending bytes
    async fn read_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(offset) = self.buf[self.pos..].iter().position(|&b| b == b'\n') {
                let end = self.pos + offset;
                let mut line = &self.buf[self.pos..end];
                if line.last() == Some(&b'\r') {
                    line = &line[..line.len() - 1];
                }
                let text = String::from_utf8_lossy(line).into_owned();
                self.pos = end + 1;
                return Ok(Some(text));
            }
            if !self.fill().await? {
                if self.pos < self.buf.len() {
                    return Err(GFormsError::Protocol("truncated line at end of stream".into()));
                }
                return Ok(None);
            }
        }
    }

    async fn read_exact(&mut self, len: usize) -> Result<Vec<u8>> {
        while self.buf.len() - self.pos < len {
            if !self.fill().await? {
                return Err(GFormsError::Protocol(format!(
                    "body truncated: expected {len} bytes, got {}",
                    self.buf.len() - self.pos
                )));
            }
        }
        let bytes = self.buf[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(bytes)
    }

    async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        while self.fill().await? {}
        let bytes = self.buf[self.pos..].to_vec();
        self.pos = self.buf.len();
        Ok(bytes)
    }
}
