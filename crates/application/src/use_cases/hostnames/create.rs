use std::sync::Arc;

use dns_proxy_domain::{DomainError, HostnameEntry, HostnameRecordType};
use tracing::info;

use crate::ports::HostnameRepository;

pub struct CreateHostnameUseCase {
    repository: Arc<dyn HostnameRepository>,
}

impl CreateHostnameUseCase {
    pub fn new(repository: Arc<dyn HostnameRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(
        &self,
        hostname: &str,
        record_type: &str,
        value: &str,
        ttl: Option<u32>,
    ) -> Result<HostnameEntry, DomainError> {
        let record_type: HostnameRecordType = record_type.parse()?;
        let entry = HostnameEntry::new(hostname, record_type, value, ttl)?;

        let created = self.repository.create(entry).await?;

        info!(
            id = created.id,
            hostname = %created.hostname,
            record_type = %created.record_type,
            value = %created.value,
            "Hostname created"
        );

        Ok(created)
    }
}
