mod helpers;

use dns_proxy_application::use_cases::{QueryDispatcher, QueryOutcome, SolverChain};
use dns_proxy_domain::SolverId;
use helpers::{a_answer, answered_ips, request, Behavior, MockSolver, RecordingWriter};
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::RecordType;
use std::net::Ipv4Addr;
use std::sync::Arc;

fn dispatcher(
    container: Arc<MockSolver>,
    local: Arc<MockSolver>,
    upstream: Arc<MockSolver>,
    compress: bool,
) -> QueryDispatcher {
    QueryDispatcher::new(Arc::new(SolverChain::new(container, local, upstream)), compress)
}

// ── chain ordering ─────────────────────────────────────────────────────────

#[test]
fn test_chain_orders_solvers_by_priority_regardless_of_input_order() {
    let chain = SolverChain::new(
        MockSolver::failing(SolverId::Upstream),
        MockSolver::failing(SolverId::Container),
        MockSolver::failing(SolverId::Local),
    );

    assert_eq!(
        chain.order(),
        vec![SolverId::Container, SolverId::Local, SolverId::Upstream]
    );
}

#[tokio::test]
async fn test_container_answer_short_circuits_later_solvers() {
    let container = MockSolver::failing(SolverId::Container).on(
        "host.docker",
        Behavior::Answer(a_answer("host.docker.", Ipv4Addr::new(10, 0, 0, 5), 30)),
    );
    let local = MockSolver::empty_success(SolverId::Local);
    let upstream = MockSolver::empty_success(SolverId::Upstream);
    let d = dispatcher(container.clone(), local.clone(), upstream.clone(), false);

    let writer = RecordingWriter::new();
    let outcome = d
        .dispatch(&request(42, "host.docker.", RecordType::A), writer.clone())
        .await;

    assert_eq!(
        outcome,
        QueryOutcome::Answered {
            solver: SolverId::Container,
            answers: 1
        }
    );
    assert_eq!(container.calls(), 1);
    assert_eq!(local.calls(), 0);
    assert_eq!(upstream.calls(), 0);

    let replies = writer.replies();
    assert_eq!(replies.len(), 1);
    let reply = &replies[0].message;
    assert_eq!(reply.id(), 42);
    assert_eq!(reply.message_type(), MessageType::Response);
    assert_eq!(answered_ips(reply), vec![Ipv4Addr::new(10, 0, 0, 5)]);
    assert_eq!(reply.answers()[0].ttl(), 30);
    assert_eq!(reply.queries().len(), 1);
    assert_eq!(reply.queries()[0].name().to_ascii(), "host.docker.");
}

#[tokio::test]
async fn test_falls_through_to_upstream_when_earlier_solvers_fail() {
    let container = MockSolver::failing(SolverId::Container);
    let local = MockSolver::failing(SolverId::Local);
    let upstream = MockSolver::failing(SolverId::Upstream).on(
        "example.com",
        Behavior::Answer(a_answer(
            "example.com.",
            Ipv4Addr::new(93, 184, 216, 34),
            300,
        )),
    );
    let d = dispatcher(container.clone(), local.clone(), upstream.clone(), false);

    let writer = RecordingWriter::new();
    let outcome = d
        .dispatch(&request(7, "example.com.", RecordType::A), writer.clone())
        .await;

    assert_eq!(
        outcome,
        QueryOutcome::Answered {
            solver: SolverId::Upstream,
            answers: 1
        }
    );
    assert_eq!(container.calls(), 1);
    assert_eq!(local.calls(), 1);
    assert_eq!(upstream.calls(), 1);

    let reply = &writer.replies()[0].message;
    assert_eq!(reply.id(), 7);
    assert_eq!(answered_ips(reply), vec![Ipv4Addr::new(93, 184, 216, 34)]);
}

#[tokio::test]
async fn test_empty_success_is_terminal_and_sent() {
    let container = MockSolver::failing(SolverId::Container);
    let local = MockSolver::empty_success(SolverId::Local);
    let upstream = MockSolver::empty_success(SolverId::Upstream);
    let d = dispatcher(container, local, upstream.clone(), false);

    let writer = RecordingWriter::new();
    let outcome = d
        .dispatch(&request(1, "nothing.lan.", RecordType::AAAA), writer.clone())
        .await;

    assert_eq!(
        outcome,
        QueryOutcome::Answered {
            solver: SolverId::Local,
            answers: 0
        }
    );
    assert_eq!(upstream.calls(), 0);
    assert!(writer.replies()[0].message.answers().is_empty());
}

#[tokio::test]
async fn test_solver_response_code_is_preserved() {
    let mut nxdomain = Message::new();
    nxdomain.set_response_code(ResponseCode::NXDomain);
    let upstream =
        MockSolver::failing(SolverId::Upstream).on("missing.example", Behavior::Answer(nxdomain));
    let d = dispatcher(
        MockSolver::failing(SolverId::Container),
        MockSolver::failing(SolverId::Local),
        upstream,
        false,
    );

    let writer = RecordingWriter::new();
    d.dispatch(&request(9, "missing.example.", RecordType::A), writer.clone())
        .await;

    assert_eq!(
        writer.replies()[0].message.response_code(),
        ResponseCode::NXDomain
    );
}

// ── no response paths ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_all_solvers_failing_emits_nothing() {
    let d = dispatcher(
        MockSolver::failing(SolverId::Container),
        MockSolver::failing(SolverId::Local),
        MockSolver::failing(SolverId::Upstream),
        false,
    );

    let writer = RecordingWriter::new();
    let outcome = d
        .dispatch(&request(3, "nowhere.invalid.", RecordType::A), writer.clone())
        .await;

    assert_eq!(outcome, QueryOutcome::NotResolved);
    assert!(!outcome.responded());
    assert!(writer.replies().is_empty());
}

#[tokio::test]
async fn test_request_without_question_is_rejected_without_calling_solvers() {
    let container = MockSolver::empty_success(SolverId::Container);
    let d = dispatcher(
        container.clone(),
        MockSolver::empty_success(SolverId::Local),
        MockSolver::empty_success(SolverId::Upstream),
        false,
    );

    let mut empty = Message::new();
    empty.set_id(11);

    let writer = RecordingWriter::new();
    let outcome = d.dispatch(&empty, writer.clone()).await;

    assert_eq!(outcome, QueryOutcome::Rejected);
    assert_eq!(container.calls(), 0);
    assert!(writer.replies().is_empty());
}

#[tokio::test]
async fn test_only_first_question_is_resolved_and_echoed() {
    let container = MockSolver::failing(SolverId::Container).on(
        "first.docker",
        Behavior::Answer(a_answer("first.docker.", Ipv4Addr::new(10, 0, 0, 1), 30)),
    );
    let d = dispatcher(
        container.clone(),
        MockSolver::failing(SolverId::Local),
        MockSolver::failing(SolverId::Upstream),
        false,
    );

    let mut multi = request(5, "first.docker.", RecordType::A);
    multi.add_query(hickory_proto::op::Query::query(
        hickory_proto::rr::Name::from_ascii("second.docker.").unwrap(),
        RecordType::A,
    ));

    let writer = RecordingWriter::new();
    d.dispatch(&multi, writer.clone()).await;

    assert_eq!(container.calls(), 1);
    let reply = &writer.replies()[0].message;
    assert_eq!(reply.queries().len(), 1);
    assert_eq!(reply.queries()[0].name().to_ascii(), "first.docker.");
}

#[tokio::test]
async fn test_write_failure_is_reported() {
    let d = dispatcher(
        MockSolver::empty_success(SolverId::Container),
        MockSolver::failing(SolverId::Local),
        MockSolver::failing(SolverId::Upstream),
        false,
    );

    let outcome = d
        .dispatch(&request(2, "a.docker.", RecordType::A), RecordingWriter::failing())
        .await;

    assert!(matches!(outcome, QueryOutcome::WriteFailed(_)));
}

// ── compression flag ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_compression_flag_is_carried_on_every_reply() {
    for compress in [false, true] {
        let d = dispatcher(
            MockSolver::empty_success(SolverId::Container),
            MockSolver::failing(SolverId::Local),
            MockSolver::failing(SolverId::Upstream),
            compress,
        );

        let writer = RecordingWriter::new();
        d.dispatch(&request(1, "a.docker.", RecordType::A), writer.clone())
            .await;

        assert_eq!(writer.replies()[0].compress, compress);
    }
}

// ── fault containment ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_panicking_solver_is_contained_and_later_queries_succeed() {
    let container = MockSolver::failing(SolverId::Container)
        .on("boom.docker", Behavior::Panic)
        .on(
            "fine.docker",
            Behavior::Answer(a_answer("fine.docker.", Ipv4Addr::new(10, 0, 0, 9), 30)),
        );
    let upstream = MockSolver::empty_success(SolverId::Upstream);
    let d = dispatcher(
        container,
        MockSolver::failing(SolverId::Local),
        upstream.clone(),
        false,
    );

    let boom_writer = RecordingWriter::new();
    let outcome = d
        .dispatch(&request(13, "boom.docker.", RecordType::A), boom_writer.clone())
        .await;

    match outcome {
        QueryOutcome::Fault(detail) => assert!(detail.contains("boom.docker")),
        other => panic!("expected fault, got {:?}", other),
    }
    assert!(boom_writer.replies().is_empty());
    assert_eq!(upstream.calls(), 0);

    let fine_writer = RecordingWriter::new();
    let outcome = d
        .dispatch(&request(14, "fine.docker.", RecordType::A), fine_writer.clone())
        .await;

    assert!(outcome.responded());
    assert_eq!(fine_writer.replies()[0].message.id(), 14);
}

#[tokio::test]
async fn test_concurrent_queries_are_answered_independently() {
    let container = MockSolver::empty_success(SolverId::Container);
    let d = Arc::new(dispatcher(
        container.clone(),
        MockSolver::failing(SolverId::Local),
        MockSolver::failing(SolverId::Upstream),
        false,
    ));

    let mut handles = Vec::new();
    for id in 0..32u16 {
        let d = Arc::clone(&d);
        handles.push(tokio::spawn(async move {
            let writer = RecordingWriter::new();
            d.dispatch(&request(id, "a.docker.", RecordType::A), writer.clone())
                .await;
            writer.replies()[0].message.id()
        }));
    }

    for (id, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), id as u16);
    }
    assert_eq!(container.calls(), 32);
}
