use serde::{Deserialize, Serialize};

use super::dns::DnsConfig;
use super::docker::DockerConfig;
use super::errors::ConfigError;
use super::hostnames::HostnamesConfig;
use super::logging::LoggingConfig;
use super::resolv_conf::ResolvConfConfig;
use super::server::ServerConfig;

/// Main configuration structure for dns-proxy
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener ports and bind address
    #[serde(default)]
    pub server: ServerConfig,

    /// Resolution and wire options
    #[serde(default)]
    pub dns: DnsConfig,

    /// Host resolver override
    #[serde(default)]
    pub resolv_conf: ResolvConfConfig,

    /// Container name resolution
    #[serde(default)]
    pub docker: DockerConfig,

    /// Locally configured hostnames
    #[serde(default)]
    pub hostnames: HostnamesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dns-proxy.toml in current directory
    /// 3. /etc/dns-proxy/config.toml
    /// 4. Default configuration
    ///
    /// Command-line overrides are applied last and the result is validated.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("dns-proxy.toml").exists() {
            Self::from_file("dns-proxy.toml")?
        } else if std::path::Path::new("/etc/dns-proxy/config.toml").exists() {
            Self::from_file("/etc/dns-proxy/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(port) = overrides.web_port {
            self.server.web_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(tsig) = overrides.tsig {
            self.dns.tsig = tsig;
        }
        if let Some(compress) = overrides.compress {
            self.dns.compress = compress;
        }
        if let Some(enabled) = overrides.resolv_conf_enabled {
            self.resolv_conf.enabled = enabled;
        }
        if let Some(enabled) = overrides.docker_enabled {
            self.docker.enabled = enabled;
        }
        if let Some(path) = overrides.hostnames_path {
            self.hostnames.store_path = path;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(file) = overrides.log_file {
            self.logging.file = Some(file);
        }
        if let Some(profile) = overrides.cpu_profile {
            self.logging.cpu_profile = Some(profile);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.server.web_port == 0 {
            return Err(ConfigError::Validation("Web port cannot be 0".to_string()));
        }

        if self.dns.upstream_servers.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream servers configured".to_string(),
            ));
        }

        self.dns.upstream_addrs()?;
        self.dns.tsig_key()?;

        if self.resolv_conf.enabled
            && self
                .resolv_conf
                .nameserver
                .parse::<std::net::IpAddr>()
                .is_err()
        {
            return Err(ConfigError::Validation(format!(
                "resolv_conf.nameserver '{}' is not an IP address",
                self.resolv_conf.nameserver
            )));
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub web_port: Option<u16>,
    pub bind_address: Option<String>,
    pub tsig: Option<String>,
    pub compress: Option<bool>,
    pub resolv_conf_enabled: Option<bool>,
    pub docker_enabled: Option<bool>,
    pub hostnames_path: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub cpu_profile: Option<String>,
}
