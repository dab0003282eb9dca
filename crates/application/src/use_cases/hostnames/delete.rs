use std::sync::Arc;

use dns_proxy_domain::{DomainError, HostnameEntry};
use tracing::info;

use crate::ports::HostnameRepository;

pub struct DeleteHostnameUseCase {
    repository: Arc<dyn HostnameRepository>,
}

impl DeleteHostnameUseCase {
    pub fn new(repository: Arc<dyn HostnameRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: u64) -> Result<HostnameEntry, DomainError> {
        let removed = self.repository.delete(id).await?;
        info!(id, hostname = %removed.hostname, "Hostname deleted");
        Ok(removed)
    }
}
