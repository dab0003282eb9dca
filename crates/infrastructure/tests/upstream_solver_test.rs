mod helpers;

use dns_proxy_application::ports::DnsSolver;
use dns_proxy_domain::{DomainError, Question, SolverId};
use dns_proxy_infrastructure::dns::UpstreamSolver;
use helpers::{answered_ips, silent_server, FakeUpstream};
use std::net::Ipv4Addr;
use std::sync::atomic::Ordering;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_millis(300);

#[tokio::test]
async fn test_first_upstream_answers() {
    let upstream = FakeUpstream::start(Ipv4Addr::new(93, 184, 216, 34)).await;
    let solver = UpstreamSolver::new(vec![upstream.addr], TIMEOUT);

    let response = solver.solve(&Question::new("example.com.", 1)).await.unwrap();

    assert_eq!(solver.id(), SolverId::Upstream);
    assert_eq!(answered_ips(&response), vec!["93.184.216.34"]);
    assert_eq!(upstream.udp_queries.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.tcp_queries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_silent_upstream_falls_through_to_next() {
    let (_silent, silent_addr) = silent_server().await;
    let upstream = FakeUpstream::start(Ipv4Addr::new(10, 1, 2, 3)).await;
    let solver = UpstreamSolver::new(vec![silent_addr, upstream.addr], TIMEOUT);

    let response = solver.solve(&Question::new("example.com.", 1)).await.unwrap();

    assert_eq!(answered_ips(&response), vec!["10.1.2.3"]);
}

#[tokio::test]
async fn test_truncated_answer_is_retried_over_tcp() {
    let upstream = FakeUpstream::truncating(Ipv4Addr::new(10, 9, 8, 7)).await;
    let solver = UpstreamSolver::new(vec![upstream.addr], TIMEOUT);

    let response = solver.solve(&Question::new("big.example.", 1)).await.unwrap();

    assert!(!response.truncated());
    assert_eq!(answered_ips(&response), vec!["10.9.8.7"]);
    assert_eq!(upstream.udp_queries.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.tcp_queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_all_upstreams_unreachable() {
    let (_a, a) = silent_server().await;
    let (_b, b) = silent_server().await;
    let solver = UpstreamSolver::new(vec![a, b], Duration::from_millis(100));

    let err = solver
        .solve(&Question::new("example.com.", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::TransportAllServersUnreachable));
}

#[tokio::test]
async fn test_no_upstreams_configured() {
    let solver = UpstreamSolver::new(Vec::new(), TIMEOUT);

    assert!(solver.solve(&Question::new("example.com.", 1)).await.is_err());
}
