use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use super::errors::ConfigError;
use super::tsig::TsigKey;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Servers the upstream solver forwards to, tried in order.
    /// `host:port`, port defaults to 53.
    #[serde(default = "default_upstream_servers")]
    pub upstream_servers: Vec<String>,

    /// Per-upstream timeout in milliseconds.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Transaction authentication key in `name:secret` form; empty disables it.
    #[serde(default)]
    pub tsig: String,

    /// Compress names in emitted answers.
    #[serde(default)]
    pub compress: bool,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            upstream_servers: default_upstream_servers(),
            query_timeout_ms: default_query_timeout_ms(),
            tsig: String::new(),
            compress: false,
        }
    }
}

impl DnsConfig {
    pub fn tsig_key(&self) -> Result<Option<TsigKey>, ConfigError> {
        TsigKey::parse(&self.tsig)
    }

    pub fn upstream_addrs(&self) -> Result<Vec<SocketAddr>, ConfigError> {
        self.upstream_servers
            .iter()
            .map(|server| parse_upstream(server))
            .collect()
    }
}

fn parse_upstream(server: &str) -> Result<SocketAddr, ConfigError> {
    let server = server.trim();
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = server.trim_matches(|c| c == '[' || c == ']').parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, 53));
    }
    Err(ConfigError::Validation(format!(
        "Invalid upstream server '{}' (expected ip or ip:port)",
        server
    )))
}

fn default_upstream_servers() -> Vec<String> {
    vec!["8.8.8.8:53".to_string(), "1.1.1.1:53".to_string()]
}

fn default_query_timeout_ms() -> u64 {
    3000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_port_defaults_to_53() {
        let config = DnsConfig {
            upstream_servers: vec!["9.9.9.9".into(), "[2001:db8::1]".into(), "10.0.0.1:5353".into()],
            ..DnsConfig::default()
        };
        let addrs = config.upstream_addrs().unwrap();
        assert_eq!(addrs[0], "9.9.9.9:53".parse().unwrap());
        assert_eq!(addrs[1], "[2001:db8::1]:53".parse().unwrap());
        assert_eq!(addrs[2], "10.0.0.1:5353".parse().unwrap());
    }

    #[test]
    fn test_invalid_upstream_rejected() {
        let config = DnsConfig {
            upstream_servers: vec!["dns.google".into()],
            ..DnsConfig::default()
        };
        assert!(config.upstream_addrs().is_err());
    }
}
