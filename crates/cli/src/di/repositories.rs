use dns_proxy_domain::{Config, DomainError};
use dns_proxy_infrastructure::container::ContainerCache;
use dns_proxy_infrastructure::repositories::JsonHostnameStore;
use std::sync::Arc;
use tracing::info;

pub struct Repositories {
    pub hostnames: Arc<JsonHostnameStore>,
    pub containers: Arc<ContainerCache>,
}

impl Repositories {
    pub async fn new(config: &Config) -> Result<Self, DomainError> {
        let hostnames = JsonHostnameStore::load(&config.hostnames.store_path).await?;
        info!(
            path = %config.hostnames.store_path,
            entries = hostnames.len(),
            "Hostname store ready"
        );

        Ok(Self {
            hostnames: Arc::new(hostnames),
            containers: Arc::new(ContainerCache::new()),
        })
    }
}
