use async_trait::async_trait;
use dns_proxy_domain::DomainError;
use hickory_proto::op::Message;

/// A finalized answer ready for the wire.
#[derive(Debug, Clone)]
pub struct DnsReply {
    pub message: Message,
    /// Whether names may be compressed when encoding.
    pub compress: bool,
}

/// Emits the answer for one request.
///
/// `write_reply` consumes the writer, so a dispatch cycle can emit at most
/// one reply.
#[async_trait]
pub trait ResponseWriter: Send {
    async fn write_reply(self, reply: DnsReply) -> Result<(), DomainError>;
}
