use std::{io, time::Duration};
use tokio::{
    net::UdpSocket,
    time::{timeout_at, Instant},
};

/// Outcome of one bounded receive attempt.
///
/// A zero-length datagram is a legitimate UDP message, so `Received(0)` and
/// `Timeout` are separate variants and never collapse into each other.
#[derive(Debug)]
pub enum WaitOutcome {
    Timeout,
    Error(io::Error),
    Received(usize),
}

impl WaitOutcome {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitOutcome::Timeout)
    }
}

/// Receive at most one datagram within `wait`, without blocking past it.
///
/// A zero `wait` is an immediate poll. Readiness can be spurious (another
/// reader drained the socket, or the kernel woke us early); that case is
/// retried against the same deadline instead of being reported as an error.
pub async fn recv_bounded(socket: &UdpSocket, buf: &mut [u8], wait: Duration) -> WaitOutcome {
    // assert: the caller handed us room for at least one byte
    debug_assert!(!buf.is_empty());
    let deadline = Instant::now() + wait;
    loop {
        match timeout_at(deadline, socket.readable()).await {
            Err(_) => return WaitOutcome::Timeout,
            Ok(Err(e)) => return WaitOutcome::Error(e),
            Ok(Ok(())) => (),
        }
        match socket.try_recv_from(buf) {
            Ok((len, _)) => return WaitOutcome::Received(len),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(e) => return WaitOutcome::Error(e),
        }
    }
}
