use std::sync::Arc;

use dns_proxy_domain::{DomainError, HostnameEntry, HostnameRecordType};
use tracing::info;

use crate::ports::HostnameRepository;

pub struct UpdateHostnameUseCase {
    repository: Arc<dyn HostnameRepository>,
}

impl UpdateHostnameUseCase {
    pub fn new(repository: Arc<dyn HostnameRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(
        &self,
        id: u64,
        hostname: &str,
        record_type: &str,
        value: &str,
        ttl: Option<u32>,
    ) -> Result<HostnameEntry, DomainError> {
        let record_type: HostnameRecordType = record_type.parse()?;
        let entry = HostnameEntry::new(hostname, record_type, value, ttl)?;

        let updated = self.repository.update(id, entry).await?;

        info!(id, hostname = %updated.hostname, value = %updated.value, "Hostname updated");

        Ok(updated)
    }
}
