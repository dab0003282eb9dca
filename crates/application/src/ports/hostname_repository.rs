use async_trait::async_trait;
use dns_proxy_domain::{DomainError, HostnameEntry};

#[async_trait]
pub trait HostnameRepository: Send + Sync {
    /// Entries answering for `hostname` (lowercased, no trailing dot):
    /// exact entries when any exist, otherwise the most specific wildcard.
    fn lookup(&self, hostname: &str) -> Vec<HostnameEntry>;

    fn list(&self) -> Vec<HostnameEntry>;

    async fn create(&self, entry: HostnameEntry) -> Result<HostnameEntry, DomainError>;

    async fn update(&self, id: u64, entry: HostnameEntry) -> Result<HostnameEntry, DomainError>;

    async fn delete(&self, id: u64) -> Result<HostnameEntry, DomainError>;
}
