use anyhow::Context;
use dns_proxy_domain::config::LoggingConfig;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            let builder = builder.with_ansi(false).with_writer(Mutex::new(file));
            if config.json {
                builder.json().try_init()
            } else {
                builder.try_init()
            }
        }
        None if config.json => builder.json().try_init(),
        None => builder.try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}
