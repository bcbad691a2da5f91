use clap::Parser;
use rendezvous_socket::{
    recv::{recv_bounded, WaitOutcome},
    utils::printable,
};
use std::{net::SocketAddr, process::ExitCode, time::Duration};
use tokio::net::UdpSocket;

const REPLY_WAIT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[clap(name = "rendezvous-client", about = "Sends one hello and waits for the reply")]
struct Cli {
    /// server address, e.g. 127.0.0.1:49152
    server: SocketAddr,
    /// hello message (a terminating NUL byte is appended)
    #[clap(default_value = "ping")]
    message: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let Cli { server, message } = Cli::parse();

    let socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(x) => x,
        Err(e) => {
            eprintln!("[-] cannot create the UDP socket: {}", e);
            return ExitCode::from(3);
        }
    };
    if let Err(e) = socket.connect(server).await {
        eprintln!("[-] cannot associate with the server address: {}", e);
        return ExitCode::from(6);
    }

    let mut hello = message.into_bytes();
    hello.push(0);
    if let Err(e) = socket.send(&hello).await {
        eprintln!("[-] cannot send the hello: {}", e);
        return ExitCode::from(7);
    }
    println!("[+] hello sent to {}", server);

    let mut buf = [0u8; 1024];
    match recv_bounded(&socket, &mut buf, REPLY_WAIT).await {
        WaitOutcome::Received(len) => {
            println!("[+] reply: {}", printable(&buf[..len]));
            ExitCode::SUCCESS
        }
        WaitOutcome::Timeout => {
            eprintln!("[-] no reply within {:?}", REPLY_WAIT);
            ExitCode::from(5)
        }
        WaitOutcome::Error(e) => {
            eprintln!("[-] cannot receive the reply: {}", e);
            ExitCode::from(5)
        }
    }
}
