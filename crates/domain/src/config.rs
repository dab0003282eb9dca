pub mod dns;
pub mod docker;
pub mod errors;
pub mod hostnames;
pub mod logging;
pub mod resolv_conf;
pub mod root;
pub mod server;
pub mod tsig;

pub use dns::DnsConfig;
pub use docker::DockerConfig;
pub use errors::ConfigError;
pub use hostnames::HostnamesConfig;
pub use logging::LoggingConfig;
pub use resolv_conf::ResolvConfConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use tsig::TsigKey;
