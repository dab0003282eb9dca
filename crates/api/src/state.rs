use dns_proxy_application::ports::{ContainerRegistry, HostnameRepository};
use dns_proxy_application::services::ServiceLifecycle;
use dns_proxy_application::use_cases::{
    CreateHostnameUseCase, DeleteHostnameUseCase, ListHostnamesUseCase, UpdateHostnameUseCase,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub hostnames: Arc<HostnameUseCases>,
    pub containers: Arc<dyn ContainerRegistry>,
    pub lifecycle: Arc<ServiceLifecycle>,
}

pub struct HostnameUseCases {
    pub list: ListHostnamesUseCase,
    pub create: CreateHostnameUseCase,
    pub update: UpdateHostnameUseCase,
    pub delete: DeleteHostnameUseCase,
}

impl HostnameUseCases {
    pub fn new(repository: Arc<dyn HostnameRepository>) -> Self {
        Self {
            list: ListHostnamesUseCase::new(repository.clone()),
            create: CreateHostnameUseCase::new(repository.clone()),
            update: UpdateHostnameUseCase::new(repository.clone()),
            delete: DeleteHostnameUseCase::new(repository),
        }
    }
}
