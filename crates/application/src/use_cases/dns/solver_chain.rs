use crate::ports::DnsSolver;
use dns_proxy_domain::{Question, ResolutionAttempt, SolverId};
use hickory_proto::op::Message;
use std::sync::Arc;
use tracing::debug;

/// Answer produced by the first solver that accepted the question.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub solver: SolverId,
    pub response: Message,
    pub attempts: Vec<ResolutionAttempt>,
}

/// Every solver failed.
#[derive(Debug, Clone)]
pub struct NotResolved {
    pub attempts: Vec<ResolutionAttempt>,
}

/// Fixed-priority chain of responsibility: container names, then local
/// hostnames, then upstream forwarding.
///
/// Solvers are ordered by [`SolverId::priority`], never by how they were
/// handed in, so the order is the same for every query of the process.
pub struct SolverChain {
    solvers: Vec<Arc<dyn DnsSolver>>,
}

impl SolverChain {
    pub fn new(
        container: Arc<dyn DnsSolver>,
        local: Arc<dyn DnsSolver>,
        upstream: Arc<dyn DnsSolver>,
    ) -> Self {
        let mut solvers = vec![container, local, upstream];
        solvers.sort_by_key(|solver| solver.id().priority());
        Self { solvers }
    }

    pub fn order(&self) -> Vec<SolverId> {
        self.solvers.iter().map(|solver| solver.id()).collect()
    }

    /// Tries each solver in order and stops at the first success.
    pub async fn resolve(&self, question: &Question) -> Result<Resolution, NotResolved> {
        let mut attempts = Vec::with_capacity(self.solvers.len());

        for solver in &self.solvers {
            let solver_id = solver.id();
            debug!(solver = %solver_id, "Trying solver");

            match solver.solve(question).await {
                Ok(response) => {
                    let answers = response.answers();
                    debug!(
                        solver = %solver_id,
                        answers = answers.len(),
                        first_answer = ?answers.first(),
                        "Question resolved"
                    );
                    attempts.push(ResolutionAttempt::resolved(solver_id, answers.len()));
                    return Ok(Resolution {
                        solver: solver_id,
                        response,
                        attempts,
                    });
                }
                Err(e) => {
                    debug!(solver = %solver_id, error = %e, "Solver could not resolve question");
                    attempts.push(ResolutionAttempt::failed(solver_id, e.to_string()));
                }
            }
        }

        Err(NotResolved { attempts })
    }
}
