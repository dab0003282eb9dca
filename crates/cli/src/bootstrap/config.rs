use anyhow::Context;
use dns_proxy_domain::{CliOverrides, Config};

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides).context("Failed to load configuration")?;

    config
        .server
        .bind_address
        .parse::<std::net::IpAddr>()
        .with_context(|| {
            format!(
                "server.bind_address '{}' is not an IP address",
                config.server.bind_address
            )
        })?;

    Ok(config)
}
