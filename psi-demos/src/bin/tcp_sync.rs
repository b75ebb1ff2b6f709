//! TCP-based PSI protocol example.
//!
//! The server plays the responder and the client plays the initiator. Each
//! `PsiMessage` travels as one line of JSON.
//!
//! Run server:
//! ```bash
//! cargo run --bin tcp_sync -- server --items server_ids.txt
//! ```
//!
//! Run client (in another terminal):
//! ```bash
//! cargo run --bin tcp_sync -- client --items client_ids.txt
//! ```

use clap::{Parser, Subcommand};
use modp_psi::{
    identifiers_from_bytes, run_initiator, run_responder, Identifier, PsiConfig, PsiError,
    PsiMessage, Transport,
};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;

const DEFAULT_ADDRESS: &str = "127.0.0.1:7878";

#[derive(Debug, Parser)]
#[command(about = "Run one side of the PSI protocol over TCP")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, clap::Args)]
struct Common {
    /// Address to listen on or connect to
    #[arg(long, default_value = DEFAULT_ADDRESS)]
    addr: String,

    /// TOML configuration file (group and protocol options)
    #[arg(long)]
    config: Option<PathBuf>,

    /// File with one identifier per line
    #[arg(long)]
    items: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Wait for a client and act as the responder
    Server(Common),
    /// Connect to a server and act as the initiator
    Client(Common),
}

/// Newline-delimited JSON over a TCP stream.
struct JsonLineTransport {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl JsonLineTransport {
    fn new(stream: TcpStream, common: &Common, config: &PsiConfig) -> std::io::Result<Self> {
        stream.set_read_timeout(config.protocol_config().exchange_timeout)?;
        tracing::debug!(addr = %common.addr, "transport ready");
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: stream,
        })
    }
}

impl Transport for JsonLineTransport {
    fn send(&mut self, message: PsiMessage) -> modp_psi::Result<()> {
        let mut line =
            serde_json::to_string(&message).map_err(|e| PsiError::Exchange(e.to_string()))?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|e| PsiError::Exchange(e.to_string()))
    }

    fn recv(&mut self) -> modp_psi::Result<PsiMessage> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| PsiError::Exchange(e.to_string()))?;
        if read == 0 {
            return Err(PsiError::Exchange("peer closed the connection".to_string()));
        }
        serde_json::from_str(&line).map_err(|e| PsiError::Exchange(e.to_string()))
    }
}

fn load_config(common: &Common) -> modp_psi::Result<PsiConfig> {
    match &common.config {
        Some(path) => PsiConfig::load(path),
        None => Ok(PsiConfig::default()),
    }
}

fn load_items(
    common: &Common,
    fallback: &[&str],
) -> Result<Vec<Identifier>, Box<dyn std::error::Error>> {
    let Some(path) = &common.items else {
        return Ok(fallback.iter().map(|s| Identifier::from(*s)).collect());
    };
    let bytes = std::fs::read(path)?;
    let lines: Vec<Vec<u8>> = bytes
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .filter(|line| !line.is_empty())
        .collect();
    Ok(identifiers_from_bytes(lines)?)
}

fn run_server(common: Common) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&common)?;
    let params = config.group_parameters()?;
    let items = load_items(
        &common,
        &["bob_secret_1", "shared_item_1", "bob_secret_2", "shared_item_2", "bob_secret_3"],
    )?;
    println!("=== PSI TCP Server ===");
    println!("Server holds {} identifiers", items.len());

    let listener = TcpListener::bind(&common.addr)?;
    println!("Listening on {}", common.addr);
    let (stream, peer) = listener.accept()?;
    println!("Connected to {}", peer);

    let transport = JsonLineTransport::new(stream, &common, &config)?;
    match run_responder(items, &params, &config.protocol_config(), transport)? {
        Some(result) => {
            let mut found: Vec<_> = result.into_strings().into_iter().collect();
            found.sort();
            println!("Server learned the intersection: {:?}", found);
        }
        None => println!("Server completed; intersection disclosed to the client only"),
    }
    Ok(())
}

fn run_client(common: Common) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&common)?;
    let params = config.group_parameters()?;
    let items = load_items(
        &common,
        &["alice_secret_1", "shared_item_1", "alice_secret_2", "shared_item_2", "alice_secret_3"],
    )?;
    println!("=== PSI TCP Client ===");
    println!("Client holds {} identifiers", items.len());

    let stream = TcpStream::connect(&common.addr)?;
    println!("Connected to {}", common.addr);

    let transport = JsonLineTransport::new(stream, &common, &config)?;
    let result = run_initiator(items, &params, &config.protocol_config(), transport)?;
    let mut found: Vec<_> = result.into_strings().into_iter().collect();
    found.sort();
    println!("Intersection ({}): {:?}", found.len(), found);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    psi_demos::init_tracing();
    match Cli::parse().mode {
        Mode::Server(common) => run_server(common),
        Mode::Client(common) => run_client(common),
    }
}
