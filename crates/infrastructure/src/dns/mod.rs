pub mod forwarding;
pub mod response;
pub mod server;
pub mod solvers;
pub mod transport;
pub mod tsig;
pub mod wire;

pub use server::DnsServerHandler;
pub use solvers::{ContainerSolver, LocalSolver, UpstreamSolver};
pub use tsig::TsigSigner;
