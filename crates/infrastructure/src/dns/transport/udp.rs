//! UDP transport for upstream queries (RFC 1035 §4.2.1).
//!
//! Messages are sent as-is, without framing. When the answer has the TC
//! bit set the caller retries over TCP.

use super::DnsTransport;
use async_trait::async_trait;
use dns_proxy_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP answer accepted from an upstream.
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(&self, message_bytes: &[u8], timeout: Duration) -> Result<Vec<u8>, DomainError> {
        let server = self.server_addr.to_string();

        let socket = UdpSocket::bind(self.bind_addr())
            .await
            .map_err(|e| DomainError::IoError(format!("Failed to bind UDP socket: {}", e)))?;

        // A connected socket drops datagrams from other sources.
        socket
            .connect(self.server_addr)
            .await
            .map_err(|_| DomainError::TransportConnectionRefused {
                server: server.clone(),
            })?;

        let bytes_sent = tokio::time::timeout(timeout, socket.send(message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: server.clone(),
            })?
            .map_err(|_| DomainError::TransportConnectionRefused {
                server: server.clone(),
            })?;

        debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let bytes_received = tokio::time::timeout(timeout, socket.recv(&mut recv_buf))
                .await
                .map_err(|_| DomainError::TransportTimeout {
                    server: server.clone(),
                })?
                .map_err(|_| DomainError::TransportConnectionRefused {
                    server: server.clone(),
                })?;

            let response = &recv_buf[..bytes_received];
            match validate_response_id(message_bytes, response, self.server_addr) {
                Ok(()) => {
                    debug!(server = %self.server_addr, bytes_received, "UDP response received");
                    return Ok(response.to_vec());
                }
                Err(e) => {
                    warn!(error = %e, "Discarding UDP response");
                }
            }
        }
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}

/// Checks that `response` answers `query` by comparing transaction ids.
pub(crate) fn validate_response_id(
    query: &[u8],
    response: &[u8],
    server: SocketAddr,
) -> Result<(), DomainError> {
    if query.len() < 2 || response.len() < 2 {
        return Err(DomainError::InvalidDnsResponse(format!(
            "Message from {} too short to carry an id",
            server
        )));
    }

    let query_id = u16::from_be_bytes([query[0], query[1]]);
    let response_id = u16::from_be_bytes([response[0], response[1]]);
    if query_id != response_id {
        return Err(DomainError::InvalidDnsResponse(format!(
            "Transaction id mismatch from {}: sent {}, got {}",
            server, query_id, response_id
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "udp_test.rs"]
mod tests;
