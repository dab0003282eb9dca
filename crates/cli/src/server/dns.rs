use dns_proxy_application::services::SubsystemFuture;
use dns_proxy_domain::{StartupFailure, Subsystem};
use dns_proxy_infrastructure::dns::DnsServerHandler;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, UdpSocket};
use tracing::info;

/// Binds the UDP listener and serves it forever. A bind failure ends the
/// future with a [`Subsystem::UdpListener`] failure.
pub fn udp_listener_task(bind_addr: SocketAddr, handler: Arc<DnsServerHandler>) -> SubsystemFuture {
    Box::pin(async move {
        let socket = create_udp_socket(bind_addr).map_err(|e| {
            StartupFailure::new(
                Subsystem::UdpListener,
                format!("UDP bind on {} failed: {}", bind_addr, e),
            )
        })?;

        info!(bind_address = %bind_addr, protocol = "udp", "Starting DNS listener");
        handler.serve_udp(socket).await;
        Ok(())
    })
}

pub fn tcp_listener_task(bind_addr: SocketAddr, handler: Arc<DnsServerHandler>) -> SubsystemFuture {
    Box::pin(async move {
        let listener = create_tcp_listener(bind_addr).map_err(|e| {
            StartupFailure::new(
                Subsystem::TcpListener,
                format!("TCP bind on {} failed: {}", bind_addr, e),
            )
        })?;

        info!(bind_address = %bind_addr, protocol = "tcp", "Starting DNS listener");
        handler.serve_tcp(listener).await;
        Ok(())
    })
}

fn domain_for(socket_addr: SocketAddr) -> Domain {
    if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    }
}

fn create_udp_socket(socket_addr: SocketAddr) -> io::Result<UdpSocket> {
    let socket = Socket::new(domain_for(socket_addr), Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}

fn create_tcp_listener(socket_addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(domain_for(socket_addr), Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
