use crate::dns::forwarding::DnsForwarder;
use async_trait::async_trait;
use dns_proxy_application::ports::DnsSolver;
use dns_proxy_domain::{DomainError, Question, SolverId};
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Forwards questions to the configured upstream servers, in order.
pub struct UpstreamSolver {
    servers: Vec<SocketAddr>,
    forwarder: DnsForwarder,
}

impl UpstreamSolver {
    pub fn new(servers: Vec<SocketAddr>, timeout: Duration) -> Self {
        Self {
            servers,
            forwarder: DnsForwarder::new(timeout),
        }
    }

    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }
}

#[async_trait]
impl DnsSolver for UpstreamSolver {
    fn id(&self) -> SolverId {
        SolverId::Upstream
    }

    async fn solve(&self, question: &Question) -> Result<Message, DomainError> {
        for server in &self.servers {
            match self.forwarder.query(*server, question).await {
                Ok(response) => {
                    debug!(
                        server = %server,
                        rcode = %response.response_code(),
                        answers = response.answers().len(),
                        "Upstream answered"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    debug!(server = %server, error = %e, "Upstream failed, trying next");
                }
            }
        }

        Err(DomainError::TransportAllServersUnreachable)
    }
}
