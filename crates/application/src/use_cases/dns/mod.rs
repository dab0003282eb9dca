pub mod dispatch_query;
pub mod solver_chain;

pub use dispatch_query::{finalize_reply, QueryDispatcher, QueryOutcome};
pub use solver_chain::{NotResolved, Resolution, SolverChain};
