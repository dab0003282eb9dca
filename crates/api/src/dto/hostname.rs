use dns_proxy_domain::HostnameEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HostnameResponse {
    pub id: u64,
    pub hostname: String,
    pub record_type: String,
    pub value: String,
    pub ttl: u32,
    pub wildcard: bool,
}

impl From<HostnameEntry> for HostnameResponse {
    fn from(entry: HostnameEntry) -> Self {
        Self {
            id: entry.id,
            wildcard: entry.is_wildcard(),
            hostname: entry.hostname,
            record_type: entry.record_type.to_string(),
            value: entry.value,
            ttl: entry.ttl,
        }
    }
}

/// Body of both create and update requests.
#[derive(Debug, Deserialize)]
pub struct HostnameRequest {
    pub hostname: String,
    #[serde(default = "default_record_type")]
    pub record_type: String,
    /// IP address for A/AAAA, target for CNAME. `ip` is accepted as an alias.
    #[serde(alias = "ip")]
    pub value: String,
    pub ttl: Option<u32>,
}

fn default_record_type() -> String {
    "A".to_string()
}
