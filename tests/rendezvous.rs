use rendezvous_socket::{
    recv::{recv_bounded, WaitOutcome},
    server::{RendezvousServer, ServerConfig, REPLY},
    utils::printable,
};
use std::{net::SocketAddr, time::Duration};
use tokio::net::UdpSocket;

fn loopback(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

#[tokio::test]
async fn end_to_end_exchange() {
    let server = RendezvousServer::bind(&ServerConfig::new(0)).unwrap();
    let port = server.local_addr().unwrap().port();

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(b"ping\0", loopback(port)).await.unwrap();

    let exchange = server.serve().await.unwrap();
    assert_eq!(exchange.peer, client.local_addr().unwrap());
    assert_eq!(exchange.hello, b"ping\0");
    assert_eq!(exchange.reply_sent, REPLY.len());
    assert!(exchange.reply_complete());
    assert_eq!(printable(&exchange.hello), "ping");

    let mut buf = [0u8; 64];
    match recv_bounded(&client, &mut buf, Duration::from_secs(1)).await {
        WaitOutcome::Received(len) => {
            assert_eq!(len, 26);
            assert_eq!(&buf[..len], REPLY);
        }
        other => panic!("expected the reply, got {:?}", other),
    }
}

#[tokio::test]
async fn lock_filters_other_peers() {
    let server = RendezvousServer::bind(&ServerConfig::new(0)).unwrap();
    let port = server.local_addr().unwrap().port();

    let first = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let intruder = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    first.send_to(b"hello\0", loopback(port)).await.unwrap();
    let hello = server.capture_peer().await.unwrap();
    assert_eq!(hello.peer, first.local_addr().unwrap());

    server.lock_to(hello.peer).await.unwrap();

    // intruder traffic must not reach the locked endpoint
    intruder.send_to(b"intrude\0", loopback(port)).await.unwrap();
    first.send_to(b"again\0", loopback(port)).await.unwrap();

    let mut buf = [0u8; 64];
    match server.recv_bounded(&mut buf, Duration::from_secs(1)).await {
        WaitOutcome::Received(len) => assert_eq!(&buf[..len], b"again\0"),
        other => panic!("expected the locked peer's datagram, got {:?}", other),
    }
    // and nothing else is queued behind it
    let outcome = server.recv_bounded(&mut buf, Duration::from_millis(200)).await;
    assert!(outcome.is_timeout());
}

#[tokio::test]
async fn bounded_receive_on_server_endpoint() {
    let server = RendezvousServer::bind(&ServerConfig::new(0)).unwrap();
    let port = server.local_addr().unwrap().port();

    let mut buf = [0u8; 64];
    let outcome = server.recv_bounded(&mut buf, Duration::ZERO).await;
    assert!(outcome.is_timeout());

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(&[], loopback(port)).await.unwrap();
    match server.recv_bounded(&mut buf, Duration::from_secs(1)).await {
        WaitOutcome::Received(0) => (),
        other => panic!("expected an empty datagram, got {:?}", other),
    }
}
