use dashmap::DashMap;
use dns_proxy_application::ports::ContainerRegistry;
use dns_proxy_domain::ContainerInfo;
use std::net::IpAddr;
use tracing::debug;

/// Lock-free container view shared by the watcher and the container
/// solver.
#[derive(Default)]
pub struct ContainerCache {
    containers: DashMap<String, ContainerInfo>,
    /// hostname -> container id; the most recently started container wins.
    by_hostname: DashMap<String, String>,
}

impl ContainerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

impl ContainerRegistry for ContainerCache {
    fn upsert(&self, container: ContainerInfo) {
        if let Some(previous) = self.containers.get(&container.id).map(|c| c.clone()) {
            for hostname in &previous.hostnames {
                self.by_hostname
                    .remove_if(hostname, |_, owner| owner == &previous.id);
            }
        }

        for hostname in &container.hostnames {
            self.by_hostname
                .insert(hostname.clone(), container.id.clone());
        }
        debug!(
            id = %container.id,
            hostnames = container.hostnames.len(),
            "Container registered"
        );
        self.containers.insert(container.id.clone(), container);
    }

    fn remove(&self, id: &str) -> Option<ContainerInfo> {
        let (_, removed) = self.containers.remove(id)?;
        for hostname in &removed.hostnames {
            self.by_hostname.remove_if(hostname, |_, owner| owner == id);
        }
        Some(removed)
    }

    fn lookup(&self, hostname: &str) -> Option<Vec<IpAddr>> {
        let id = self.by_hostname.get(hostname)?.clone();
        self.containers.get(&id).map(|c| c.addresses.clone())
    }

    fn list(&self) -> Vec<ContainerInfo> {
        let mut containers: Vec<ContainerInfo> =
            self.containers.iter().map(|c| c.value().clone()).collect();
        containers.sort_by(|a, b| a.name.cmp(&b.name));
        containers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: &str, names: &[&str], ip: &str) -> ContainerInfo {
        ContainerInfo::new(
            id,
            names[0],
            names.iter().map(|n| n.to_string()).collect(),
            vec![ip.parse().unwrap()],
        )
    }

    #[test]
    fn test_lookup_by_any_registered_hostname() {
        let cache = ContainerCache::new();
        cache.upsert(info("a", &["web", "web.docker"], "172.17.0.2"));

        assert_eq!(cache.lookup("web"), Some(vec!["172.17.0.2".parse().unwrap()]));
        assert_eq!(cache.lookup("web.docker"), cache.lookup("web"));
        assert_eq!(cache.lookup("db"), None);
    }

    #[test]
    fn test_remove_forgets_hostnames() {
        let cache = ContainerCache::new();
        cache.upsert(info("a", &["web"], "172.17.0.2"));

        assert!(cache.remove("a").is_some());
        assert!(cache.lookup("web").is_none());
        assert!(cache.is_empty());
        assert!(cache.remove("a").is_none());
    }

    #[test]
    fn test_removing_old_owner_keeps_newer_claim() {
        let cache = ContainerCache::new();
        cache.upsert(info("old", &["web"], "172.17.0.2"));
        cache.upsert(info("new", &["web"], "172.17.0.3"));

        cache.remove("old");

        assert_eq!(cache.lookup("web"), Some(vec!["172.17.0.3".parse().unwrap()]));
    }

    #[test]
    fn test_upsert_replaces_stale_hostnames() {
        let cache = ContainerCache::new();
        cache.upsert(info("a", &["before"], "172.17.0.2"));
        cache.upsert(info("a", &["after"], "172.17.0.2"));

        assert!(cache.lookup("before").is_none());
        assert!(cache.lookup("after").is_some());
        assert_eq!(cache.len(), 1);
    }
}
