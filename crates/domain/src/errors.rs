use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid hostname entry: {0}")]
    InvalidHostnameEntry(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Malformed DNS request: {0}")]
    MalformedRequest(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Hostname entry already exists: {0}")]
    HostnameAlreadyExists(String),

    #[error("Hostname not found: {0}")]
    HostnameNotFound(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Record type {0} not supported by this solver")]
    UnsupportedRecordType(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Transport timeout connecting to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("All upstream servers are unreachable")]
    TransportAllServersUnreachable,

    #[error("TSIG verification failed: {0}")]
    TsigVerification(String),

    #[error("Host DNS configuration error: {0}")]
    HostDnsConfig(String),

    #[error("Container runtime error: {0}")]
    ContainerRuntime(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
