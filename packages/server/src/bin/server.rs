//! Dual-transport chat server.
//!
//! Serves the push transport (WebSocket) and the pull transport (HTTP
//! polling) over one shared in-memory message log and presence registry.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin irori-server
//! cargo run --bin irori-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use irori_server::{
    domain::ChatAuthority,
    infrastructure::{authority::InMemoryChatAuthority, pusher::WebSocketMessagePusher},
    ui::{Server, ServerConfig},
    usecase::{
        FetchUpdatesUseCase, JoinParticipantUseCase, LeaveParticipantUseCase, SendMessageUseCase,
        SetTypingUseCase,
    },
};
use irori_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "irori-server")]
#[command(about = "Dual-transport chat server (WebSocket push + HTTP polling)", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds a push connection may stay silent before it is closed
    #[arg(long, default_value = "120")]
    idle_timeout_secs: u64,

    /// Seconds a poll participant may stay silent before eviction
    #[arg(long, default_value = "120")]
    stale_after_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("irori_server", env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Chat Authority (in-memory log + registry)
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create the Chat Authority (shared by both transports)
    let clock = Arc::new(SystemClock);
    let authority: Arc<dyn ChatAuthority> = Arc::new(InMemoryChatAuthority::new(clock.clone()));

    // 2. Create MessagePusher (WebSocket implementation)
    let pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let join_participant_usecase = Arc::new(JoinParticipantUseCase::new(
        authority.clone(),
        pusher.clone(),
    ));
    let leave_participant_usecase = Arc::new(LeaveParticipantUseCase::new(
        authority.clone(),
        pusher.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        authority.clone(),
        pusher.clone(),
        clock.clone(),
    ));
    let set_typing_usecase = Arc::new(SetTypingUseCase::new(authority.clone(), pusher.clone()));
    let fetch_updates_usecase = Arc::new(FetchUpdatesUseCase::with_stale_after(
        authority.clone(),
        clock,
        (args.stale_after_secs as i64) * 1_000,
    ));

    // 4. Create and run the server
    let server = Server::new(
        join_participant_usecase,
        leave_participant_usecase,
        send_message_usecase,
        set_typing_usecase,
        fetch_updates_usecase,
        authority,
    );
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        idle_timeout_secs: args.idle_timeout_secs,
    };
    if let Err(e) = server.run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
