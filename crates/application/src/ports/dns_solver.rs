use async_trait::async_trait;
use dns_proxy_domain::{DomainError, Question, SolverId};
use hickory_proto::op::Message;

/// A resolution strategy.
///
/// `Ok` is authoritative: the chain stops there even when the message
/// carries no answer records. Any `Err` lets the next strategy try.
#[async_trait]
pub trait DnsSolver: Send + Sync {
    fn id(&self) -> SolverId;

    async fn solve(&self, question: &Question) -> Result<Message, DomainError>;
}
