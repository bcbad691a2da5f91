use crate::recv::{self, WaitOutcome};
use socket2::{Domain, Socket, Type};
use std::{fmt, io, net::SocketAddr, time::Duration};
use tokio::net::UdpSocket;

/// The fixed reply datagram, terminating NUL included.
pub const REPLY: &[u8] = b"Hey, client, it's server\n\0";

pub struct ServerConfig {
    pub port: u16,
    /// Receive buffer for the first message; longer datagrams are truncated
    /// by the transport.
    pub hello_len_cap: usize,
}

impl ServerConfig {
    pub fn new(port: u16) -> Self {
        ServerConfig {
            port,
            hello_len_cap: 1024,
        }
    }
}

/// The first contact: who spoke, and what they said.
pub struct Hello {
    pub peer: SocketAddr,
    pub bytes: Vec<u8>,
}

/// Summary of one completed exchange. A `reply_sent` short of `REPLY.len()`
/// means the transport sent a partial datagram, which callers should surface.
pub struct Exchange {
    pub peer: SocketAddr,
    pub hello: Vec<u8>,
    pub reply_sent: usize,
}

impl Exchange {
    pub fn reply_complete(&self) -> bool {
        self.reply_sent == REPLY.len()
    }
}

#[derive(Debug)]
pub enum ServeError {
    Endpoint(io::Error),
    Bind(io::Error),
    Receive(io::Error),
    Lock(io::Error),
    Send(io::Error),
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServeError::Endpoint(e) => write!(f, "cannot create the UDP socket: {}", e),
            ServeError::Bind(e) => write!(f, "cannot bind the server address: {}", e),
            ServeError::Receive(e) => write!(f, "cannot receive from a new client: {}", e),
            ServeError::Lock(e) => write!(f, "cannot lock onto the client address: {}", e),
            ServeError::Send(e) => write!(f, "cannot send the reply: {}", e),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServeError::Endpoint(e)
            | ServeError::Bind(e)
            | ServeError::Receive(e)
            | ServeError::Lock(e)
            | ServeError::Send(e) => Some(e),
        }
    }
}

/// One-shot rendezvous: bind, capture the first client, lock onto it, reply.
///
/// The socket is owned by the server value, so it is released on every exit
/// path, failing steps included.
pub struct RendezvousServer {
    socket: UdpSocket,
    hello_len_cap: usize,
}

impl RendezvousServer {
    /// Create the endpoint and attach it to the wildcard IPv4 address at the
    /// configured port. Creation and binding are separate steps so their
    /// failures stay distinct; a failed bind aborts, it is not advisory.
    pub fn bind(config: &ServerConfig) -> Result<Self, ServeError> {
        let sock = Socket::new(Domain::IPV4, Type::DGRAM, None)
            .map_err(|e| ServeError::Endpoint(e))?;
        sock.set_nonblocking(true)
            .map_err(|e| ServeError::Endpoint(e))?;
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        sock.bind(&addr.into()).map_err(|e| ServeError::Bind(e))?;
        let socket = UdpSocket::from_std(sock.into()).map_err(|e| ServeError::Endpoint(e))?;
        Ok(RendezvousServer {
            socket,
            hello_len_cap: config.hello_len_cap,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Block until the first datagram from any peer arrives, unbounded.
    pub async fn capture_peer(&self) -> Result<Hello, ServeError> {
        let mut bytes = vec![0; self.hello_len_cap];
        let (len, peer) = self
            .socket
            .recv_from(&mut bytes)
            .await
            .map_err(|e| ServeError::Receive(e))?;
        bytes.truncate(len);
        Ok(Hello { peer, bytes })
    }

    /// Associate the endpoint with `peer` so sends and receives target only
    /// that address and other peers' datagrams are no longer delivered.
    pub async fn lock_to(&self, peer: SocketAddr) -> Result<(), ServeError> {
        self.socket
            .connect(peer)
            .await
            .map_err(|e| ServeError::Lock(e))
    }

    /// Send the fixed reply to the locked peer, returning the count actually
    /// sent. A count short of `REPLY.len()` is the caller's anomaly to report.
    pub async fn send_reply(&self) -> Result<usize, ServeError> {
        self.socket.send(REPLY).await.map_err(|e| ServeError::Send(e))
    }

    /// Receive at most one datagram within `wait` on the server's endpoint.
    /// Not used by the one-shot exchange itself, which waits unbounded for
    /// the first message.
    pub async fn recv_bounded(&self, buf: &mut [u8], wait: Duration) -> WaitOutcome {
        recv::recv_bounded(&self.socket, buf, wait).await
    }

    /// Run the whole exchange: capture, lock, reply. Consumes the server, so
    /// the endpoint is released whether the exchange completes or a step
    /// fails.
    pub async fn serve(self) -> Result<Exchange, ServeError> {
        let hello = self.capture_peer().await?;
        self.lock_to(hello.peer).await?;
        let reply_sent = self.send_reply().await?;
        Ok(Exchange {
            peer: hello.peer,
            hello: hello.bytes,
            reply_sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_kernel_assigned_port() {
        let server = RendezvousServer::bind(&ServerConfig::new(0)).unwrap();
        let addr = server.local_addr().unwrap();
        assert!(addr.ip().is_unspecified());
        assert!(addr.port() > 0);
    }

    #[tokio::test]
    async fn hello_truncated_at_cap() {
        let config = ServerConfig {
            port: 0,
            hello_len_cap: 4,
        };
        let server = RendezvousServer::bind(&config).unwrap();
        let port = server.local_addr().unwrap().port();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client
            .send_to(b"truncated!", ("127.0.0.1", port))
            .await
            .unwrap();

        let hello = server.capture_peer().await.unwrap();
        assert_eq!(hello.bytes, b"trun");
        assert_eq!(hello.peer, client.local_addr().unwrap());
    }

    #[test]
    fn short_send_is_observable() {
        let peer = SocketAddr::from(([127, 0, 0, 1], 49152));
        let full = Exchange {
            peer,
            hello: b"ping\0".to_vec(),
            reply_sent: REPLY.len(),
        };
        let short = Exchange {
            peer,
            hello: b"ping\0".to_vec(),
            reply_sent: REPLY.len() - 1,
        };
        assert!(full.reply_complete());
        assert!(!short.reply_complete());
    }

    #[test]
    fn reply_is_26_nul_terminated_bytes() {
        assert_eq!(REPLY.len(), 26);
        assert_eq!(REPLY.last(), Some(&0));
    }
}
