use super::solver_chain::SolverChain;
use crate::ports::{DnsReply, ResponseWriter};
use dns_proxy_domain::{Question, SolverId};
use futures::FutureExt;
use hickory_proto::op::{Message, MessageType};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info_span, warn, Instrument};

/// What happened to one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// A solver answered and the reply was handed to the writer.
    Answered { solver: SolverId, answers: usize },
    /// The request carried no question; nothing was emitted.
    Rejected,
    /// Every solver failed; nothing was emitted.
    NotResolved,
    /// A solver answered but the writer could not emit it.
    WriteFailed(String),
    /// The query panicked and was contained; nothing was emitted.
    Fault(String),
}

impl QueryOutcome {
    pub fn responded(&self) -> bool {
        matches!(self, QueryOutcome::Answered { .. })
    }
}

/// Per-query request/response cycle.
///
/// Holds no per-query state, so one instance serves every listener and
/// every concurrent query.
pub struct QueryDispatcher {
    chain: Arc<SolverChain>,
    compress: bool,
}

impl QueryDispatcher {
    pub fn new(chain: Arc<SolverChain>, compress: bool) -> Self {
        Self { chain, compress }
    }

    /// Handles one request inside a fault boundary.
    ///
    /// A panic anywhere below (solver, reply finalization, writer) is caught
    /// here, logged with the transaction id and question, and turned into
    /// [`QueryOutcome::Fault`]. The writer is dropped unused in that case.
    pub async fn dispatch<W: ResponseWriter>(&self, request: &Message, writer: W) -> QueryOutcome {
        let span = info_span!("query", id = request.id());

        let handled = AssertUnwindSafe(self.handle(request, writer))
            .catch_unwind()
            .instrument(span.clone())
            .await;

        match handled {
            Ok(outcome) => outcome,
            Err(panic) => {
                let detail = panic_detail(panic.as_ref());
                error!(
                    parent: &span,
                    id = request.id(),
                    question = ?request.queries().first(),
                    error = %detail,
                    "Query handling panicked, no response sent"
                );
                QueryOutcome::Fault(detail)
            }
        }
    }

    /// The unguarded cycle. Prefer [`QueryDispatcher::dispatch`].
    pub async fn handle<W: ResponseWriter>(&self, request: &Message, writer: W) -> QueryOutcome {
        let Some(first) = request.queries().first() else {
            warn!(id = request.id(), "Request carries no question, dropping");
            return QueryOutcome::Rejected;
        };

        let question = Question::new(first.name().to_ascii(), u16::from(first.query_type()));

        debug!(
            id = request.id(),
            questions = request.queries().len(),
            question = %question.name,
            record_type = %question.type_name(),
            "Handling question"
        );

        let resolution = match self.chain.resolve(&question).await {
            Ok(resolution) => resolution,
            Err(not_resolved) => {
                debug!(
                    id = request.id(),
                    question = %question,
                    attempts = not_resolved.attempts.len(),
                    "No solver could answer, no response sent"
                );
                return QueryOutcome::NotResolved;
            }
        };

        let answers = resolution.response.answers().len();
        let reply = DnsReply {
            message: finalize_reply(resolution.response, request),
            compress: self.compress,
        };

        match writer.write_reply(reply).await {
            Ok(()) => QueryOutcome::Answered {
                solver: resolution.solver,
                answers,
            },
            Err(e) => {
                warn!(id = request.id(), error = %e, "Failed to write response");
                QueryOutcome::WriteFailed(e.to_string())
            }
        }
    }
}

/// Binds a solver's message to the request it answers: transaction id,
/// op code, RD/CD flags and the first question are taken from the request.
/// The solver's response code and record sections are kept.
pub fn finalize_reply(mut response: Message, request: &Message) -> Message {
    response.set_id(request.id());
    response.set_message_type(MessageType::Response);
    response.set_op_code(request.op_code());
    response.set_recursion_desired(request.recursion_desired());
    response.set_checking_disabled(request.checking_disabled());

    response.take_queries();
    if let Some(query) = request.queries().first() {
        response.add_query(query.clone());
    }

    response
}

fn panic_detail(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
