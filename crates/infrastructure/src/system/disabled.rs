use super::resolv_conf::restore_file;
use dns_proxy_application::ports::HostDnsConfigurator;
use dns_proxy_domain::DomainError;
use std::path::PathBuf;
use tracing::debug;

/// Used when host resolver management is switched off. Never points the
/// host at the proxy, but `restore` still clears markers a crashed earlier
/// run may have left in the file.
pub struct UnmanagedHostDns {
    path: PathBuf,
}

impl UnmanagedHostDns {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HostDnsConfigurator for UnmanagedHostDns {
    fn apply(&self) -> Result<(), DomainError> {
        debug!("Host DNS management disabled, leaving resolver untouched");
        Ok(())
    }

    fn restore(&self) -> Result<(), DomainError> {
        restore_file(&self.path)
    }
}
