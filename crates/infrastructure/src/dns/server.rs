use crate::dns::transport::tcp::{read_frame, send_with_length_prefix};
use crate::dns::tsig::{decode_unverified, SigningContext, TsigCheck, TsigError, TsigSigner};
use crate::dns::wire::{
    encode_for_udp, encode_message, truncated, udp_payload_limit, MAX_UDP_PAYLOAD,
};
use async_trait::async_trait;
use dns_proxy_application::ports::{DnsReply, ResponseWriter};
use dns_proxy_application::use_cases::dns::finalize_reply;
use dns_proxy_application::use_cases::{QueryDispatcher, QueryOutcome};
use dns_proxy_domain::DomainError;
use hickory_proto::op::{Message, ResponseCode};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tracing::{debug, error, info, warn};

/// Idle time after which a TCP client connection is closed.
const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns raw listener traffic into dispatcher calls: TSIG handling, request
/// decoding and reply encoding for both transports.
pub struct DnsServerHandler {
    dispatcher: Arc<QueryDispatcher>,
    tsig: Option<TsigSigner>,
}

/// How the reply to one request must be emitted.
enum Transport<'a> {
    Udp {
        socket: &'a UdpSocket,
        peer: SocketAddr,
        limit: usize,
    },
    Tcp {
        stream: &'a mut TcpStream,
    },
}

struct Authenticated<'a> {
    request: Message,
    signing: Option<(&'a TsigSigner, SigningContext)>,
    rejected: Option<TsigError>,
}

struct ReplyWriter<'a> {
    transport: Transport<'a>,
    signing: Option<(&'a TsigSigner, SigningContext)>,
}

#[async_trait]
impl ResponseWriter for ReplyWriter<'_> {
    async fn write_reply(self, reply: DnsReply) -> Result<(), DomainError> {
        let bytes = match (&self.transport, &self.signing) {
            (Transport::Udp { limit, .. }, Some((signer, context))) => {
                // The limit covers the TSIG record as well.
                let signed = signer.sign_response(&reply.message, context, reply.compress)?;
                if signed.len() <= *limit {
                    signed
                } else {
                    signer.sign_response(&truncated(&reply.message), context, reply.compress)?
                }
            }
            (Transport::Udp { limit, .. }, None) => {
                encode_for_udp(&reply.message, reply.compress, *limit)?
            }
            (Transport::Tcp { .. }, Some((signer, context))) => {
                signer.sign_response(&reply.message, context, reply.compress)?
            }
            (Transport::Tcp { .. }, None) => encode_message(&reply.message, reply.compress)?,
        };

        match self.transport {
            Transport::Udp { socket, peer, .. } => {
                socket
                    .send_to(&bytes, peer)
                    .await
                    .map_err(|e| DomainError::IoError(format!("UDP send to {} failed: {}", peer, e)))?;
            }
            Transport::Tcp { stream } => send_with_length_prefix(stream, &bytes).await?,
        }
        Ok(())
    }
}

impl DnsServerHandler {
    pub fn new(dispatcher: Arc<QueryDispatcher>, tsig: Option<TsigSigner>) -> Self {
        Self { dispatcher, tsig }
    }

    /// Receives datagrams forever, one task per datagram.
    pub async fn serve_udp(self: Arc<Self>, socket: UdpSocket) {
        let socket = Arc::new(socket);
        if let Ok(addr) = socket.local_addr() {
            info!(bind_address = %addr, "UDP listener ready");
        }

        let mut recv_buf = vec![0u8; MAX_UDP_PAYLOAD];
        loop {
            let (len, peer) = match socket.recv_from(&mut recv_buf).await {
                Ok(received) => received,
                Err(e) => {
                    // ICMP errors from earlier sends surface here; keep serving.
                    debug!(error = %e, "UDP receive error");
                    continue;
                }
            };

            let handler = Arc::clone(&self);
            let socket = Arc::clone(&socket);
            let datagram = recv_buf[..len].to_vec();
            tokio::spawn(async move {
                handler
                    .handle(&datagram, |limit| Transport::Udp {
                        socket: socket.as_ref(),
                        peer,
                        limit,
                    })
                    .await;
            });
        }
    }

    /// Accepts connections forever, one task per connection.
    pub async fn serve_tcp(self: Arc<Self>, listener: TcpListener) {
        if let Ok(addr) = listener.local_addr() {
            info!(bind_address = %addr, "TCP listener ready");
        }

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "TCP accept failed");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                }
            };

            let handler = Arc::clone(&self);
            tokio::spawn(async move {
                handler.serve_connection(stream, peer).await;
            });
        }
    }

    /// Serves framed messages on one connection until the client closes it
    /// or stays idle.
    async fn serve_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        debug!(peer = %peer, "TCP connection opened");
        loop {
            let frame = match tokio::time::timeout(TCP_IDLE_TIMEOUT, read_frame(&mut stream)).await {
                Ok(Ok(Some(frame))) => frame,
                Ok(Ok(None)) => break,
                Ok(Err(e)) => {
                    debug!(peer = %peer, error = %e, "TCP read failed");
                    break;
                }
                Err(_) => {
                    debug!(peer = %peer, "TCP connection idle, closing");
                    break;
                }
            };

            let stream = &mut stream;
            self.handle(&frame, move |_| Transport::Tcp { stream }).await;
        }
        debug!(peer = %peer, "TCP connection closed");
    }

    /// Handles one raw request. `transport` builds the reply channel once
    /// the request is decoded; it receives the requester's UDP payload
    /// limit.
    async fn handle<'a, F>(&'a self, raw: &[u8], transport: F) -> Option<QueryOutcome>
    where
        F: FnOnce(usize) -> Transport<'a>,
    {
        let Authenticated {
            request,
            signing,
            rejected,
        } = match self.authenticate(raw) {
            Ok(checked) => checked,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable request");
                return None;
            }
        };

        let writer = ReplyWriter {
            transport: transport(udp_payload_limit(&request)),
            signing,
        };

        if let Some(error) = rejected {
            warn!(id = request.id(), tsig_error = %error, "TSIG verification failed, answering NOTAUTH");
            let mut refusal = Message::new();
            refusal.set_response_code(ResponseCode::NotAuth);
            let reply = DnsReply {
                message: finalize_reply(refusal, &request),
                compress: false,
            };
            if let Err(e) = writer.write_reply(reply).await {
                error!(id = request.id(), error = %e, "Failed to write NOTAUTH reply");
            }
            return None;
        }

        Some(self.dispatcher.dispatch(&request, writer).await)
    }

    /// Decodes the request and checks its transaction signature.
    fn authenticate(&self, raw: &[u8]) -> Result<Authenticated<'_>, DomainError> {
        let Some(signer) = &self.tsig else {
            return Ok(Authenticated {
                request: decode_unverified(raw)?,
                signing: None,
                rejected: None,
            });
        };

        Ok(match signer.check(raw)? {
            TsigCheck::Unsigned(request) => Authenticated {
                request,
                signing: None,
                rejected: None,
            },
            TsigCheck::Verified { message, context } => Authenticated {
                request: message,
                signing: Some((signer, context)),
                rejected: None,
            },
            TsigCheck::Rejected { message, error } => Authenticated {
                request: message,
                signing: None,
                rejected: Some(error),
            },
        })
    }
}
