use std::fmt;
use thiserror::Error;

/// Process lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Starting,
    Running,
    ShuttingDown,
    Terminated,
}

impl LifecycleState {
    pub fn can_transition_to(&self, next: LifecycleState) -> bool {
        matches!(
            (self, next),
            (LifecycleState::Starting, LifecycleState::Running)
                | (LifecycleState::Starting, LifecycleState::ShuttingDown)
                | (LifecycleState::Running, LifecycleState::ShuttingDown)
                | (LifecycleState::ShuttingDown, LifecycleState::Terminated)
        )
    }

    /// Host DNS override is only allowed before shutdown begins.
    pub fn accepts_override(&self) -> bool {
        matches!(self, LifecycleState::Starting | LifecycleState::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::ShuttingDown => "shutting-down",
            LifecycleState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process exit statuses. Each fatal cause has its own value so operators
/// can tell failures apart from the status alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// Clean shutdown after a termination signal.
    Success,
    /// Configuration, profiling or other bootstrap failure.
    StartupFailure,
    /// The UDP listener could not bind.
    UdpBindFailure,
    /// The TCP listener could not bind.
    TcpBindFailure,
    /// The administrative web endpoint could not bind.
    WebBindFailure,
    /// Pointing the host resolver at the proxy failed.
    HostDnsOverrideFailure,
}

impl ExitStatus {
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::StartupFailure => 1,
            ExitStatus::UdpBindFailure => 3,
            ExitStatus::TcpBindFailure => 4,
            ExitStatus::WebBindFailure => 5,
            ExitStatus::HostDnsOverrideFailure => 6,
        }
    }
}

/// Long-running tasks launched by the lifecycle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    ContainerWatcher,
    TcpListener,
    UdpListener,
    WebServer,
    HostDnsOverride,
}

impl Subsystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::ContainerWatcher => "container-watcher",
            Subsystem::TcpListener => "tcp-listener",
            Subsystem::UdpListener => "udp-listener",
            Subsystem::WebServer => "web-server",
            Subsystem::HostDnsOverride => "host-dns-override",
        }
    }

    /// Exit status used when this subsystem fails fatally. The container
    /// watcher never takes the process down.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            Subsystem::ContainerWatcher => None,
            Subsystem::TcpListener => Some(ExitStatus::TcpBindFailure),
            Subsystem::UdpListener => Some(ExitStatus::UdpBindFailure),
            Subsystem::WebServer => Some(ExitStatus::WebBindFailure),
            Subsystem::HostDnsOverride => Some(ExitStatus::HostDnsOverrideFailure),
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{subsystem} failed: {reason}")]
pub struct StartupFailure {
    pub subsystem: Subsystem,
    pub reason: String,
}

impl StartupFailure {
    pub fn new(subsystem: Subsystem, reason: impl Into<String>) -> Self {
        Self {
            subsystem,
            reason: reason.into(),
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        self.subsystem
            .exit_status()
            .unwrap_or(ExitStatus::StartupFailure)
    }
}

/// What moved the controller out of `Running`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownTrigger {
    Signal(String),
    Fatal(StartupFailure),
}

impl ShutdownTrigger {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            ShutdownTrigger::Signal(_) => ExitStatus::Success,
            ShutdownTrigger::Fatal(failure) => failure.exit_status(),
        }
    }
}

impl fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownTrigger::Signal(name) => write!(f, "signal {}", name),
            ShutdownTrigger::Fatal(failure) => write!(f, "{}", failure),
        }
    }
}
