use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostnamesConfig {
    /// JSON file holding locally configured hostnames.
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

impl Default for HostnamesConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "dns-proxy-hostnames.json".to_string()
}
