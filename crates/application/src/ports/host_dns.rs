use dns_proxy_domain::DomainError;

/// Points the operating system resolver at the proxy and back.
///
/// Both calls block on OS-level writes. Callers outside the lifecycle
/// controller must not use them directly.
pub trait HostDnsConfigurator: Send + Sync {
    fn apply(&self) -> Result<(), DomainError>;

    fn restore(&self) -> Result<(), DomainError>;
}
