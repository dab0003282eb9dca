use dns_proxy_domain::ContainerInfo;
use std::net::IpAddr;

/// Shared hostname -> address view of running containers. Written by the
/// container watcher, read concurrently by the container solver.
pub trait ContainerRegistry: Send + Sync {
    fn upsert(&self, container: ContainerInfo);

    fn remove(&self, id: &str) -> Option<ContainerInfo>;

    /// Addresses registered for `hostname` (lowercased, no trailing dot).
    /// `None` when no container claims the name.
    fn lookup(&self, hostname: &str) -> Option<Vec<IpAddr>>;

    fn list(&self) -> Vec<ContainerInfo>;
}
