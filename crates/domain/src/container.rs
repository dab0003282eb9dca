use serde::Serialize;
use std::net::IpAddr;

/// Addressing data for one running container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    /// Lowercased names without trailing dot.
    pub hostnames: Vec<String>,
    pub addresses: Vec<IpAddr>,
}

impl ContainerInfo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        hostnames: Vec<String>,
        addresses: Vec<IpAddr>,
    ) -> Self {
        let mut hostnames: Vec<String> = hostnames
            .into_iter()
            .map(|h| h.trim().trim_end_matches('.').to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        hostnames.sort();
        hostnames.dedup();

        Self {
            id: id.into(),
            name: name.into(),
            hostnames,
            addresses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerEvent {
    Started(ContainerInfo),
    Stopped { id: String },
}
