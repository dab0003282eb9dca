use super::message_builder::MessageBuilder;
use crate::dns::transport::{DnsTransport, TcpTransport, UdpTransport};
use crate::dns::wire::decode_message;
use dns_proxy_domain::{DomainError, Question};
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Sends one question to one upstream server.
pub struct DnsForwarder {
    timeout: Duration,
}

impl DnsForwarder {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Queries `server` over UDP and repeats the query over TCP when the
    /// UDP answer comes back truncated.
    pub async fn query(&self, server: SocketAddr, question: &Question) -> Result<Message, DomainError> {
        let (id, request) = MessageBuilder::build_query(question)?;

        let udp = UdpTransport::new(server);
        let response = self.exchange(&udp, &request, id).await?;
        if !response.truncated() {
            return Ok(response);
        }

        debug!(server = %server, question = %question, "Truncated UDP answer, retrying over TCP");
        let tcp = TcpTransport::new(server);
        self.exchange(&tcp, &request, id).await
    }

    async fn exchange(
        &self,
        transport: &dyn DnsTransport,
        request: &[u8],
        id: u16,
    ) -> Result<Message, DomainError> {
        let bytes = transport.send(request, self.timeout).await?;
        let response = decode_message(&bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!(
                "{} answer could not be decoded: {}",
                transport.protocol_name(),
                e
            ))
        })?;

        if response.id() != id {
            return Err(DomainError::InvalidDnsResponse(format!(
                "{} answer id {} does not match query id {}",
                transport.protocol_name(),
                response.id(),
                id
            )));
        }

        Ok(response)
    }
}
