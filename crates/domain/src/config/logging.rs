use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to this file instead of stdout.
    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub json: bool,

    /// Write a CPU profile (flamegraph SVG) here on exit.
    #[serde(default)]
    pub cpu_profile: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            json: false,
            cpu_profile: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
