use std::fmt;

/// Stable identity of a resolution strategy.
///
/// The priority rank is fixed: container names are the most specific
/// source, upstream forwarding the generic fallback. The chain sorts on
/// [`SolverId::priority`] and that order never changes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SolverId {
    Container,
    Local,
    Upstream,
}

impl SolverId {
    pub const ALL: [SolverId; 3] = [SolverId::Container, SolverId::Local, SolverId::Upstream];

    pub fn priority(&self) -> u8 {
        match self {
            SolverId::Container => 1,
            SolverId::Local => 2,
            SolverId::Upstream => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverId::Container => "container",
            SolverId::Local => "local",
            SolverId::Upstream => "upstream",
        }
    }
}

impl fmt::Display for SolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Resolved { answers: usize },
    Failed(String),
}

/// One solver's try at a question. Only kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionAttempt {
    pub solver: SolverId,
    pub outcome: AttemptOutcome,
}

impl ResolutionAttempt {
    pub fn resolved(solver: SolverId, answers: usize) -> Self {
        Self {
            solver,
            outcome: AttemptOutcome::Resolved { answers },
        }
    }

    pub fn failed(solver: SolverId, cause: impl Into<String>) -> Self {
        Self {
            solver,
            outcome: AttemptOutcome::Failed(cause.into()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Resolved { .. })
    }
}
