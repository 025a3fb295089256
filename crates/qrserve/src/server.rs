//! Listener setup and the per-connection accept loop

use std::convert::Infallible;
use std::net::SocketAddr;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};

use crate::handler;

/// Create the listening socket. Set up once at startup and never mutated
/// afterwards.
pub fn bind(addr: &SocketAddr) -> std::io::Result<std::net::TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // SO_REUSEADDR - allow rebinding while the old socket is in TIME_WAIT
    socket.set_reuse_address(true)?;

    // TCP_NODELAY - each response is written in one shot
    socket.set_nodelay(true)?;

    socket.bind(&(*addr).into())?;
    socket.listen(1024)?;

    // Tokio expects a non-blocking listener
    socket.set_nonblocking(true)?;

    Ok(socket.into())
}

/// Accept connections forever, one spawned task per connection. Requests
/// hold no shared state, so tasks never coordinate.
pub async fn serve(listener: std::net::TcpListener) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::from_std(listener)?;

    loop {
        let (stream, remote) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!(error = %err, "accept failed");
                continue;
            }
        };

        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service =
                service_fn(|req| async { Ok::<_, Infallible>(handler::handle(req).await) });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                // Usually the client going away mid-write; the response has
                // already started, so there is nothing to send back.
                tracing::warn!(client = %remote, error = %err, "error serving connection");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_ephemeral_port() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let listener = bind(&addr).unwrap();
        let bound = listener.local_addr().unwrap();
        assert_eq!(bound.ip(), addr.ip());
        assert_ne!(bound.port(), 0);
    }

    #[test]
    fn test_bind_conflicting_port_fails() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let first = bind(&addr).unwrap();
        // A plain std listener on the same port without SO_REUSEPORT
        let taken = first.local_addr().unwrap();
        let second = std::net::TcpListener::bind(taken);
        assert!(second.is_err());
    }
}
