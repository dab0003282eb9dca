pub mod dns;
pub mod hostnames;

pub use dns::{QueryDispatcher, QueryOutcome, SolverChain};
pub use hostnames::{
    CreateHostnameUseCase, DeleteHostnameUseCase, ListHostnamesUseCase, UpdateHostnameUseCase,
};
