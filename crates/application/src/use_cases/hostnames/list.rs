use std::sync::Arc;

use dns_proxy_domain::HostnameEntry;

use crate::ports::HostnameRepository;

pub struct ListHostnamesUseCase {
    repository: Arc<dyn HostnameRepository>,
}

impl ListHostnamesUseCase {
    pub fn new(repository: Arc<dyn HostnameRepository>) -> Self {
        Self { repository }
    }

    pub fn execute(&self) -> Vec<HostnameEntry> {
        let mut entries = self.repository.list();
        entries.sort_by_key(|entry| entry.id);
        entries
    }
}
