use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DockerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Docker CLI used to follow container events.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Extra suffix registered for every container name, e.g. `docker`
    /// makes `web` reachable as `web.docker`.
    #[serde(default)]
    pub domain: Option<String>,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            binary: default_binary(),
            domain: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_binary() -> String {
    "docker".to_string()
}
