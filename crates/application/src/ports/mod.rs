mod container_events;
mod container_registry;
mod dns_solver;
mod host_dns;
mod hostname_repository;
mod response_writer;

pub use container_events::ContainerEventSource;
pub use container_registry::ContainerRegistry;
pub use dns_solver::DnsSolver;
pub use host_dns::HostDnsConfigurator;
pub use hostname_repository::HostnameRepository;
pub use response_writer::{DnsReply, ResponseWriter};

// Re-export for convenience
pub use dns_proxy_domain::Question;
