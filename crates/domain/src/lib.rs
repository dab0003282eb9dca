//! dns-proxy domain layer
pub mod config;
pub mod container;
pub mod errors;
pub mod hostname;
pub mod lifecycle;
pub mod question;
pub mod record_type;
pub mod solver;

pub use config::{CliOverrides, Config, ConfigError, TsigKey};
pub use container::{ContainerEvent, ContainerInfo};
pub use errors::DomainError;
pub use hostname::{normalize_hostname, HostnameEntry, HostnameMatch, HostnameRecordType};
pub use lifecycle::{ExitStatus, LifecycleState, ShutdownTrigger, StartupFailure, Subsystem};
pub use question::Question;
pub use record_type::RecordType;
pub use solver::{AttemptOutcome, ResolutionAttempt, SolverId};
