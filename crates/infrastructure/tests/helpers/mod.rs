#![allow(dead_code)]

use hickory_proto::op::{Message, MessageType, MessageVerifier, Query};
use hickory_proto::rr::dnssec::rdata::tsig::TsigAlgorithm;
use hickory_proto::rr::dnssec::tsig::TSigner;
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::BinEncodable;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

pub fn query_bytes(id: u16, name: &str, record_type: RecordType) -> Vec<u8> {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(Name::from_str(name).unwrap(), record_type));
    message.to_bytes().unwrap()
}

/// A client-side signer, as a TSIG-aware resolver would hold it.
pub fn tsig_client(key_name: &str, secret: &[u8]) -> TSigner {
    TSigner::new(
        secret.to_vec(),
        TsigAlgorithm::HmacSha256,
        Name::from_str(key_name).unwrap(),
        300,
    )
    .unwrap()
}

/// A signed query plus the verifier for its answer.
pub fn signed_query_bytes(
    id: u16,
    name: &str,
    record_type: RecordType,
    client: &TSigner,
) -> (Vec<u8>, MessageVerifier) {
    let mut message = Message::from_vec(&query_bytes(id, name, record_type)).unwrap();
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as u32;
    let verifier = message.finalize(client, now).unwrap().unwrap();
    (message.to_bytes().unwrap(), verifier)
}

pub fn answered_ips(message: &Message) -> Vec<String> {
    message
        .answers()
        .iter()
        .filter_map(|r| match r.data() {
            Some(RData::A(a)) => Some(a.0.to_string()),
            Some(RData::AAAA(aaaa)) => Some(aaaa.0.to_string()),
            _ => None,
        })
        .collect()
}

/// A local upstream answering every A question with a fixed address over
/// UDP and TCP on the same port.
pub struct FakeUpstream {
    pub addr: SocketAddr,
    pub udp_queries: Arc<AtomicUsize>,
    pub tcp_queries: Arc<AtomicUsize>,
    tasks: Vec<JoinHandle<()>>,
}

impl FakeUpstream {
    pub async fn start(answer: Ipv4Addr) -> Self {
        Self::spawn(answer, false).await
    }

    /// UDP answers come back empty with TC set; only TCP carries records.
    pub async fn truncating(answer: Ipv4Addr) -> Self {
        Self::spawn(answer, true).await
    }

    async fn spawn(answer: Ipv4Addr, truncate_udp: bool) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let listener = TcpListener::bind(addr).await.unwrap();

        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));

        let udp_counter = Arc::clone(&udp_queries);
        let udp_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
                udp_counter.fetch_add(1, Ordering::SeqCst);
                let reply = build_reply(&buf[..len], answer, truncate_udp);
                let _ = socket.send_to(&reply, peer).await;
            }
        });

        let tcp_counter = Arc::clone(&tcp_queries);
        let tcp_task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let counter = Arc::clone(&tcp_counter);
                tokio::spawn(async move {
                    let mut len = [0u8; 2];
                    if stream.read_exact(&mut len).await.is_err() {
                        return;
                    }
                    let mut frame = vec![0u8; u16::from_be_bytes(len) as usize];
                    if stream.read_exact(&mut frame).await.is_err() {
                        return;
                    }
                    counter.fetch_add(1, Ordering::SeqCst);

                    let reply = build_reply(&frame, answer, false);
                    let _ = stream.write_all(&(reply.len() as u16).to_be_bytes()).await;
                    let _ = stream.write_all(&reply).await;
                });
            }
        });

        Self {
            addr,
            udp_queries,
            tcp_queries,
            tasks: vec![udp_task, tcp_task],
        }
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn build_reply(query: &[u8], answer: Ipv4Addr, truncated: bool) -> Vec<u8> {
    let request = Message::from_vec(query).unwrap();
    let mut reply = Message::new();
    reply
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true)
        .set_truncated(truncated);

    for query in request.queries() {
        reply.add_query(query.clone());
        if !truncated && query.query_type() == RecordType::A {
            reply.add_answer(Record::from_rdata(
                query.name().clone(),
                300,
                RData::A(A(answer)),
            ));
        }
    }

    reply.to_bytes().unwrap()
}

/// A UDP socket that receives and never answers.
pub async fn silent_server() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}
