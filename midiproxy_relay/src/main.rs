use core::{net::SocketAddr, num, time::Duration};
use std::{io, net::TcpListener};

use anyhow::Context;
use clap::{Parser, Subcommand};
use midiproxy_relay::{client, input, network};

#[derive(Debug, Parser)]
#[command(version, about = "Relays MIDI note events to a remote listener over TCP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read MIDI packets (hex, one packet list per line) from stdin and relay them
    Relay {
        /// Host of the remote listener
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = network::client::DEFAULT_PORT)]
        port: u16,
        /// Give up connecting after this many milliseconds
        #[arg(long, default_value = "10000")]
        connect_timeout_ms: num::NonZeroU64,
        /// Events buffered between the input and network threads
        #[arg(long, default_value_t = client::DEFAULT_QUEUE_CAPACITY)]
        queue_capacity: num::NonZeroUsize,
    },
    /// Accept connections and print every received frame
    Listen {
        #[arg(long, default_value = "0.0.0.0:1337")]
        bind: SocketAddr,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Relay {
            host,
            port,
            connect_timeout_ms,
            queue_capacity,
        } => {
            let config = network::client::SenderConfig {
                host,
                port,
                connect_timeout: Duration::from_millis(connect_timeout_ms.get()),
            };

            let source = input::HexLines::new(io::BufReader::new(io::stdin()));

            let summary = client::start(&config, queue_capacity, source)?;

            tracing::info!(
                decoded = summary.decoded,
                dropped = summary.dropped,
                sent = summary.sent.map(|s| s.sent),
                failed = summary.sent.map(|s| s.failed),
                "input closed"
            );

            Ok(())
        }
        Command::Listen { bind } => {
            let listener =
                TcpListener::bind(bind).with_context(|| format!("couldn't bind to {bind}"))?;

            match midiproxy_relay::server::start(&listener)? {}
        }
    }
}
