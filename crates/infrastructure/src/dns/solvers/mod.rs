mod container;
mod local;
mod upstream;

pub use container::ContainerSolver;
pub use local::LocalSolver;
pub use upstream::UpstreamSolver;
