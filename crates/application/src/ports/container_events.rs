use async_trait::async_trait;
use dns_proxy_domain::{ContainerEvent, ContainerInfo, DomainError};

#[async_trait]
pub trait ContainerEventSource: Send {
    /// Containers already running when watching starts.
    async fn snapshot(&mut self) -> Result<Vec<ContainerInfo>, DomainError>;

    /// Next lifecycle event; `None` once the stream has ended.
    async fn next_event(&mut self) -> Result<Option<ContainerEvent>, DomainError>;
}
