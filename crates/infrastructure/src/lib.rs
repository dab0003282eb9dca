//! Adapters behind the application ports: solvers, wire transports,
//! listeners, container discovery, hostname persistence and host resolver
//! configuration.
pub mod container;
pub mod dns;
pub mod repositories;
pub mod system;
