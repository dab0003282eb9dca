//! dns-proxy application layer: ports, use cases and the service lifecycle.
pub mod ports;
pub mod services;
pub mod use_cases;
