pub mod container_watcher;
pub mod lifecycle;

pub use container_watcher::ContainerWatcher;
pub use lifecycle::{ServiceLifecycle, SubsystemFuture};
