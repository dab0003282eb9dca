pub mod container;
pub mod health;
pub mod hostname;

pub use container::ContainerResponse;
pub use health::HealthResponse;
pub use hostname::{HostnameRequest, HostnameResponse};
