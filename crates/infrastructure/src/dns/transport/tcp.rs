//! TCP transport (RFC 1035 §4.2.2): every message carries a two byte
//! big-endian length prefix.

use super::DnsTransport;
use async_trait::async_trait;
use dns_proxy_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn connect(&self, timeout: Duration) -> Result<TcpStream, DomainError> {
        let server = self.server_addr.to_string();

        let stream = tokio::time::timeout(timeout, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: server.clone(),
            })?
            .map_err(|_| DomainError::TransportConnectionRefused { server })?;

        stream.set_nodelay(true).map_err(|e| {
            DomainError::IoError(format!(
                "Failed to set TCP_NODELAY on {}: {}",
                self.server_addr, e
            ))
        })?;

        Ok(stream)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(&self, message_bytes: &[u8], timeout: Duration) -> Result<Vec<u8>, DomainError> {
        let mut stream = self.connect(timeout).await?;
        let server = self.server_addr.to_string();

        tokio::time::timeout(timeout, send_with_length_prefix(&mut stream, message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: server.clone(),
            })??;

        debug!(
            server = %self.server_addr,
            message_len = message_bytes.len(),
            "TCP query sent"
        );

        let response = tokio::time::timeout(timeout, read_with_length_prefix(&mut stream))
            .await
            .map_err(|_| DomainError::TransportTimeout { server })??;

        debug!(
            server = %self.server_addr,
            response_len = response.len(),
            "TCP response received"
        );

        Ok(response)
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DomainError::InvalidDnsResponse(format!(
            "Message too large for TCP framing: {} bytes",
            message_bytes.len()
        ))
    })?;

    let mut framed = Vec::with_capacity(message_bytes.len() + 2);
    framed.extend_from_slice(&length.to_be_bytes());
    framed.extend_from_slice(message_bytes);

    stream
        .write_all(&framed)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to write DNS message: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to flush stream: {}", e)))?;

    Ok(())
}

/// Reads one framed message. `Ok(None)` when the peer closed the stream
/// cleanly before a new frame started.
pub(crate) async fn read_frame<S>(stream: &mut S) -> Result<Option<Vec<u8>>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => {
            return Err(DomainError::IoError(format!(
                "Failed to read message length: {}",
                e
            )))
        }
    }

    let message_len = u16::from_be_bytes(len_buf) as usize;
    let mut message = vec![0u8; message_len];
    stream
        .read_exact(&mut message)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to read message body: {}", e)))?;

    Ok(Some(message))
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    read_frame(stream).await?.ok_or_else(|| {
        DomainError::InvalidDnsResponse("Connection closed before a response arrived".to_string())
    })
}
