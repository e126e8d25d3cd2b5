//! Blockwire messaging demo.
//!
//! `recv` plays Bob: it publishes its public keys and prints every incoming
//! message to the console. `send` plays Alice: it streams stdin to Bob, one
//! block per line read.
//!
//! Every flag can also be set through a `BLOCKWIRE_*` environment variable.
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

mod console;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use blockwire::client::{MessageSender, MessageSenderBuilder};
use blockwire::core::{
    DEFAULT_ELGAMAL_KEY_FILE, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RSA_KEY_FILE,
    DEFAULT_SHAMIR_PRIME,
};
use blockwire::crypto::DomainParams;
use blockwire::server::{MessageServer, MessageServerBuilder};
use blockwire::ProtocolCode;
use clap::{Args, Parser, Subcommand};
use num_bigint::BigUint;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleSink;

/// Generator paired with the default prime when none is given.
const DEFAULT_GENERATOR: u32 = 3;

#[derive(Parser, Debug)]
#[command(author, version, about, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send stdin to a receiver
    Send(SendArgs),
    /// Receive messages and print them
    Recv(RecvArgs),
}

/// ElGamal domain parameters shared by both roles.
#[derive(Args, Debug)]
struct DomainArgs {
    /// Prime modulus P
    #[arg(long, env = "BLOCKWIRE_PRIME", value_parser = parse_biguint, default_value_t = BigUint::from(DEFAULT_SHAMIR_PRIME))]
    prime: BigUint,

    /// Generator G
    #[arg(long, env = "BLOCKWIRE_GENERATOR", value_parser = parse_biguint, default_value_t = BigUint::from(DEFAULT_GENERATOR))]
    generator: BigUint,
}

impl DomainArgs {
    fn params(&self) -> anyhow::Result<DomainParams> {
        Ok(DomainParams::new(self.prime.clone(), self.generator.clone())?)
    }
}

#[derive(Args, Debug)]
struct SendArgs {
    /// Scheme: shamir, elgamal or rsa
    #[arg(short, long, env = "BLOCKWIRE_PROTOCOL", default_value = "elgamal")]
    protocol: ProtocolCode,

    /// Receiver host
    #[arg(long, env = "BLOCKWIRE_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Receiver port
    #[arg(long, env = "BLOCKWIRE_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Receiver's published key (defaults to the scheme's key file)
    #[arg(long, env = "BLOCKWIRE_KEY_FILE")]
    key_file: Option<PathBuf>,

    #[command(flatten)]
    domain: DomainArgs,
}

#[derive(Args, Debug)]
struct RecvArgs {
    /// Address to listen on
    #[arg(long, env = "BLOCKWIRE_LISTEN", default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    listen: SocketAddr,

    /// Where to publish the ElGamal public value
    #[arg(long, env = "BLOCKWIRE_ELGAMAL_KEY_FILE", default_value = DEFAULT_ELGAMAL_KEY_FILE)]
    elgamal_key_file: PathBuf,

    /// First RSA prime; enables RSA together with --rsa-q
    #[arg(long, env = "BLOCKWIRE_RSA_P", value_parser = parse_biguint, requires = "rsa_q")]
    rsa_p: Option<BigUint>,

    /// Second RSA prime
    #[arg(long, env = "BLOCKWIRE_RSA_Q", value_parser = parse_biguint, requires = "rsa_p")]
    rsa_q: Option<BigUint>,

    /// Where to publish the RSA modulus
    #[arg(long, env = "BLOCKWIRE_RSA_KEY_FILE", default_value = DEFAULT_RSA_KEY_FILE)]
    rsa_key_file: PathBuf,

    /// Maximum concurrent connections
    #[arg(long, env = "BLOCKWIRE_MAX_CONNECTIONS", default_value_t = blockwire::core::DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,

    #[command(flatten)]
    domain: DomainArgs,
}

fn parse_biguint(s: &str) -> Result<BigUint, String> {
    BigUint::from_str(s).map_err(|e| format!("'{s}' is not a decimal integer: {e}"))
}

async fn send(args: SendArgs) -> anyhow::Result<()> {
    let mut builder = MessageSenderBuilder::new()
        .protocol(args.protocol)
        .server_addr(format!("{}:{}", args.host, args.port));
    if args.protocol == ProtocolCode::ElGamal {
        builder = builder.domain(args.domain.params()?);
    }
    if let Some(path) = args.key_file {
        builder = builder.peer_key_file(path);
    }

    let sender = MessageSender::new(builder.build()).context("setting up sender")?;
    let stats = sender
        .send_to(&mut tokio::io::stdin())
        .await
        .context("sending message")?;
    info!(blocks = stats.blocks, bytes = stats.bytes, "done");
    Ok(())
}

async fn recv(args: RecvArgs) -> anyhow::Result<()> {
    let mut builder = MessageServerBuilder::new()
        .bind_addr(args.listen)
        .max_connections(args.max_connections)
        .elgamal(args.domain.params()?, &args.elgamal_key_file);
    if let (Some(p), Some(q)) = (args.rsa_p, args.rsa_q) {
        builder = builder.rsa(p, q, &args.rsa_key_file);
    }

    let server = MessageServer::bind(builder.build(), ConsoleSink::open, |e: &str| {
        error!("{e}");
    })
    .await
    .context("starting receiver")?;
    info!(addr = %server.local_addr(), "waiting for messages, ctrl-c to stop");

    tokio::signal::ctrl_c().await?;
    server.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Send(args) => send(args).await,
        Command::Recv(args) => recv(args).await,
    }
}
