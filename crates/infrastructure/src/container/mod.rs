pub mod cache;
pub mod docker;

pub use cache::ContainerCache;
pub use docker::DockerEventSource;
