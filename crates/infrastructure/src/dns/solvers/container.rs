use crate::dns::response::AnswerBuilder;
use async_trait::async_trait;
use dns_proxy_application::ports::{ContainerRegistry, DnsSolver};
use dns_proxy_domain::{DomainError, Question, RecordType, SolverId};
use hickory_proto::op::Message;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// TTL of answers synthesized from container addresses.
const CONTAINER_TTL: u32 = 30;

/// Answers A/AAAA questions for names of running containers.
pub struct ContainerSolver {
    registry: Arc<dyn ContainerRegistry>,
}

impl ContainerSolver {
    pub fn new(registry: Arc<dyn ContainerRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl DnsSolver for ContainerSolver {
    fn id(&self) -> SolverId {
        SolverId::Container
    }

    async fn solve(&self, question: &Question) -> Result<Message, DomainError> {
        let want_v4 = match question.known_type() {
            Some(RecordType::A) => true,
            Some(RecordType::AAAA) => false,
            _ => return Err(DomainError::UnsupportedRecordType(question.type_name().into_owned())),
        };

        let hostname = question.hostname();
        let addresses = self
            .registry
            .lookup(&hostname)
            .ok_or_else(|| DomainError::HostnameNotFound(hostname.clone()))?;

        let mut builder = AnswerBuilder::new(question)?;
        let mut matched = 0;
        for ip in addresses
            .into_iter()
            .filter(|ip| matches!(ip, IpAddr::V4(_)) == want_v4)
        {
            builder = builder.address(ip, CONTAINER_TTL);
            matched += 1;
        }

        debug!(hostname = %hostname, answers = matched, "Container name matched");
        Ok(builder.build())
    }
}
