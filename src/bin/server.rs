use clap::Parser;
use rendezvous_socket::{
    config::{in_dynamic_range, parse_port},
    server::{RendezvousServer, ServeError, ServerConfig, REPLY},
    utils::printable,
};
use std::process::ExitCode;

#[derive(Parser)]
#[clap(name = "rendezvous-server", about = "One-shot UDP rendezvous server")]
struct Cli {
    /// server UDP port (decimal or C-style numeric literal)
    #[clap(value_parser = parse_port)]
    port: u16,
}

#[tokio::main]
async fn main() -> ExitCode {
    let Cli { port } = Cli::parse();

    if !in_dynamic_range(port) {
        println!("[*] well-known and registered ports are not recommended, prefer 49152-65535");
    }

    let server = match RendezvousServer::bind(&ServerConfig::new(port)) {
        Ok(x) => x,
        Err(e) => return fail(e),
    };

    println!("[*] waiting for a message from a new client...");
    let hello = match server.capture_peer().await {
        Ok(x) => x,
        Err(e) => return fail(e),
    };
    println!(
        "[+] new client: IPv4 -> {}, UDP port -> {}",
        hello.peer.ip(),
        hello.peer.port()
    );
    println!("[+] received: {}", printable(&hello.bytes));

    if let Err(e) = server.lock_to(hello.peer).await {
        return fail(e);
    }

    println!("[*] sending the reply...");
    let sent = match server.send_reply().await {
        Ok(x) => x,
        Err(e) => return fail(e),
    };
    println!("[+] reply sent");
    if sent != REPLY.len() {
        println!("[-] sent {} bytes instead of {}", sent, REPLY.len());
    }
    ExitCode::SUCCESS
}

fn fail(e: ServeError) -> ExitCode {
    eprintln!("[-] {}", e);
    let code = match e {
        ServeError::Endpoint(_) => 3,
        ServeError::Bind(_) => 4,
        ServeError::Receive(_) => 5,
        ServeError::Lock(_) => 6,
        ServeError::Send(_) => 7,
    };
    ExitCode::from(code)
}
