use serde::{Deserialize, Serialize};

/// Host resolver override.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolvConfConfig {
    /// Point the host at the proxy on startup (restored on exit).
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_path")]
    pub path: String,

    /// Address written as the active nameserver.
    #[serde(default = "default_nameserver")]
    pub nameserver: String,
}

impl Default for ResolvConfConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_path(),
            nameserver: default_nameserver(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_path() -> String {
    "/etc/resolv.conf".to_string()
}

fn default_nameserver() -> String {
    "127.0.0.1".to_string()
}
