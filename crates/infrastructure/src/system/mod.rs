pub mod disabled;
pub mod resolv_conf;

pub use disabled::UnmanagedHostDns;
pub use resolv_conf::ResolvConfConfigurator;
