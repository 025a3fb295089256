//! qrserve - HTTP microservice for QR code generation
//!
//! One positional argument, the listen address in `host:port` form; one
//! endpoint, `/`, answering every method with either a PNG or a plain-text
//! error. The process serves until it is terminated externally.

mod handler;
mod server;

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "qrserve".to_string());

    let listen = match (args.next(), args.next()) {
        (Some(addr), None) => addr,
        _ => {
            eprintln!("Usage: {program} [address]:port");
            process::exit(255);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = match resolve(&listen) {
        Ok(addr) => addr,
        Err(err) => {
            eprintln!("Error listening on {listen}: {err}");
            process::exit(255);
        }
    };

    let listener = match server::bind(&addr) {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("Error listening on {listen}: {err}");
            process::exit(255);
        }
    };

    println!("Start listening on {listen}");

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error starting runtime: {err}");
            process::exit(255);
        }
    };

    // The accept loop only returns on listener failure.
    if let Err(err) = runtime.block_on(server::serve(listener)) {
        eprintln!("Error listening on {listen}: {err}");
        process::exit(255);
    }
}

/// Resolve `host:port`, accepting the bare `:port` shorthand for all
/// interfaces.
fn resolve(listen: &str) -> io::Result<SocketAddr> {
    let target = if listen.starts_with(':') {
        format!("0.0.0.0{listen}")
    } else {
        listen.to_string()
    };

    target.to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
    })
}
