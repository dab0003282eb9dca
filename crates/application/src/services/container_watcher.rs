use crate::ports::{ContainerEventSource, ContainerRegistry};
use dns_proxy_domain::{ContainerEvent, DomainError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keeps the container registry in step with the container runtime.
pub struct ContainerWatcher<S> {
    source: S,
    registry: Arc<dyn ContainerRegistry>,
}

impl<S: ContainerEventSource> ContainerWatcher<S> {
    pub fn new(source: S, registry: Arc<dyn ContainerRegistry>) -> Self {
        Self { source, registry }
    }

    /// Loads the running containers, then follows events until the stream
    /// ends. Returns the number of events applied.
    pub async fn run(mut self) -> Result<usize, DomainError> {
        let containers = self.source.snapshot().await?;
        info!(count = containers.len(), "Loaded running containers");
        for container in containers {
            self.registry.upsert(container);
        }

        let mut applied = 0;
        while let Some(event) = self.source.next_event().await? {
            self.apply(event);
            applied += 1;
        }

        warn!(applied, "Container event stream ended");
        Ok(applied)
    }

    fn apply(&self, event: ContainerEvent) {
        match event {
            ContainerEvent::Started(container) => {
                debug!(
                    id = %container.id,
                    name = %container.name,
                    hostnames = ?container.hostnames,
                    addresses = ?container.addresses,
                    "Container started"
                );
                self.registry.upsert(container);
            }
            ContainerEvent::Stopped { id } => match self.registry.remove(&id) {
                Some(container) => debug!(id = %id, name = %container.name, "Container stopped"),
                None => debug!(id = %id, "Stopped container was not registered"),
            },
        }
    }
}
