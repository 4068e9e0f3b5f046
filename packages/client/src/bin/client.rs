//! CLI chat client for irori.
//!
//! Connects to a chat server over the WebSocket push transport, or over
//! the HTTP polling transport where a persistent connection is not an
//! option. Display names are free-form; the server assigns the
//! connection identifier.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin irori-client -- --name Alice
//! cargo run --bin irori-client -- --name Bob --room random
//! cargo run --bin irori-client -- --name Carol --transport poll --url http://127.0.0.1:8080
//! ```

use clap::{Parser, ValueEnum};

use irori_shared::logger::setup_logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// WebSocket push transport
    Push,
    /// HTTP polling pull transport
    Poll,
}

#[derive(Parser, Debug)]
#[command(name = "irori-client")]
#[command(about = "Chat client speaking WebSocket push or HTTP polling", long_about = None)]
struct Args {
    /// Display name shown to other participants
    #[arg(short = 'n', long)]
    name: String,

    /// Room to join (defaults to the global room)
    #[arg(short = 'r', long)]
    room: Option<String>,

    /// Transport to use
    #[arg(short = 't', long, value_enum, default_value_t = Transport::Push)]
    transport: Transport,

    /// Server URL (ws://.../ws for push, http://... for poll)
    #[arg(short = 'u', long)]
    url: Option<String>,

    /// Seconds between fetches when using the polling transport
    #[arg(long, default_value = "2")]
    poll_interval_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("irori_client", env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let result = match args.transport {
        Transport::Push => {
            let url = args
                .url
                .unwrap_or_else(|| "ws://127.0.0.1:8080/ws".to_string());
            irori_client::run_push_client(url, args.name, args.room).await
        }
        Transport::Poll => {
            let url = args
                .url
                .unwrap_or_else(|| "http://127.0.0.1:8080".to_string());
            irori_client::run_poll_client(
                url,
                args.name,
                args.room,
                std::time::Duration::from_secs(args.poll_interval_secs),
            )
            .await
        }
    };

    if let Err(e) = result {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
