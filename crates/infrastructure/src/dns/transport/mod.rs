pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use dns_proxy_domain::DomainError;
use std::time::Duration;

pub use tcp::TcpTransport;
pub use udp::UdpTransport;

#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Sends one wire-format query and returns the raw answer.
    async fn send(&self, message_bytes: &[u8], timeout: Duration) -> Result<Vec<u8>, DomainError>;

    fn protocol_name(&self) -> &'static str;
}
