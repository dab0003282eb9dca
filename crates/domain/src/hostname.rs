use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HostnameRecordType {
    A,
    AAAA,
    CNAME,
}

impl HostnameRecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostnameRecordType::A => "A",
            HostnameRecordType::AAAA => "AAAA",
            HostnameRecordType::CNAME => "CNAME",
        }
    }
}

impl fmt::Display for HostnameRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostnameRecordType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(HostnameRecordType::A),
            "AAAA" => Ok(HostnameRecordType::AAAA),
            "CNAME" => Ok(HostnameRecordType::CNAME),
            other => Err(DomainError::InvalidHostnameEntry(format!(
                "Invalid record type {} (must be A, AAAA or CNAME)",
                other
            ))),
        }
    }
}

/// A locally configured hostname.
///
/// `hostname` is stored lowercased without the trailing dot. A leading dot
/// turns the entry into a wildcard: `.acme.com` answers for `acme.com` and
/// every name below it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostnameEntry {
    pub id: u64,
    pub hostname: String,
    pub record_type: HostnameRecordType,
    /// IP address for A/AAAA, target name for CNAME.
    pub value: String,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HostnameMatch {
    /// Wildcard match; the value is the number of labels in the wildcard
    /// suffix, so a longer suffix is more specific.
    Wildcard(usize),
    Exact,
}

impl HostnameEntry {
    pub fn new(
        hostname: &str,
        record_type: HostnameRecordType,
        value: &str,
        ttl: Option<u32>,
    ) -> Result<Self, DomainError> {
        let hostname = normalize_hostname(hostname)?;
        let value = value.trim().to_string();

        match record_type {
            HostnameRecordType::A => match value.parse::<IpAddr>() {
                Ok(IpAddr::V4(_)) => {}
                _ => {
                    return Err(DomainError::InvalidIpAddress(format!(
                        "{} is not an IPv4 address",
                        value
                    )))
                }
            },
            HostnameRecordType::AAAA => match value.parse::<IpAddr>() {
                Ok(IpAddr::V6(_)) => {}
                _ => {
                    return Err(DomainError::InvalidIpAddress(format!(
                        "{} is not an IPv6 address",
                        value
                    )))
                }
            },
            HostnameRecordType::CNAME => {
                if value.trim_end_matches('.').is_empty() {
                    return Err(DomainError::InvalidHostnameEntry(
                        "CNAME target cannot be empty".to_string(),
                    ));
                }
            }
        }

        Ok(Self {
            id: 0,
            hostname,
            record_type,
            value,
            ttl: ttl.unwrap_or_else(default_ttl),
        })
    }

    pub fn is_wildcard(&self) -> bool {
        self.hostname.starts_with('.')
    }

    /// `name` must already be lowercased without the trailing dot.
    pub fn matches(&self, name: &str) -> Option<HostnameMatch> {
        if let Some(suffix) = self.hostname.strip_prefix('.') {
            let below = name.len() > suffix.len()
                && name.ends_with(suffix)
                && name.as_bytes()[name.len() - suffix.len() - 1] == b'.';
            if name == suffix || below {
                return Some(HostnameMatch::Wildcard(suffix.split('.').count()));
            }
            None
        } else if self.hostname == name {
            Some(HostnameMatch::Exact)
        } else {
            None
        }
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match self.record_type {
            HostnameRecordType::CNAME => None,
            _ => self.value.parse().ok(),
        }
    }
}

pub fn normalize_hostname(hostname: &str) -> Result<String, DomainError> {
    let normalized = hostname.trim().trim_end_matches('.').to_ascii_lowercase();
    let bare = normalized.trim_start_matches('.');

    if bare.is_empty() {
        return Err(DomainError::InvalidHostnameEntry(
            "Hostname cannot be empty".to_string(),
        ));
    }
    if bare.len() > 253 || bare.split('.').any(|label| label.is_empty() || label.len() > 63) {
        return Err(DomainError::InvalidDomainName(hostname.to_string()));
    }
    if normalized.starts_with("..") {
        return Err(DomainError::InvalidDomainName(hostname.to_string()));
    }

    Ok(normalized)
}

fn default_ttl() -> u32 {
    60
}
