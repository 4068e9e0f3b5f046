//! Server execution logic.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::domain::ChatAuthority;
use crate::usecase::{
    FetchUpdatesUseCase, JoinParticipantUseCase, LeaveParticipantUseCase, SendMessageUseCase,
    SetTypingUseCase,
};

use super::{
    handler::{get_rooms, health_check, poll_act, poll_fetch, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Server configuration supplied by the hosting process at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// Port number to bind to
    pub port: u16,
    /// Idle timeout for push connections, seconds
    pub idle_timeout_secs: u64,
}

/// Build the axum router for the chat transports.
///
/// Split out of [`Server::run`] so integration tests can serve the router
/// in-process on an ephemeral port.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // push トランスポート
        .route("/ws", get(websocket_handler))
        // pull トランスポート（Fetch は GET、Act は POST）
        .route("/poll", get(poll_fetch).post(poll_act))
        // 補助 API
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Dual-transport chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     join_participant_usecase,
///     leave_participant_usecase,
///     send_message_usecase,
///     set_typing_usecase,
///     fetch_updates_usecase,
///     authority,
/// );
/// server.run(config).await?;
/// ```
pub struct Server {
    join_participant_usecase: Arc<JoinParticipantUseCase>,
    leave_participant_usecase: Arc<LeaveParticipantUseCase>,
    send_message_usecase: Arc<SendMessageUseCase>,
    set_typing_usecase: Arc<SetTypingUseCase>,
    fetch_updates_usecase: Arc<FetchUpdatesUseCase>,
    authority: Arc<dyn ChatAuthority>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        join_participant_usecase: Arc<JoinParticipantUseCase>,
        leave_participant_usecase: Arc<LeaveParticipantUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        set_typing_usecase: Arc<SetTypingUseCase>,
        fetch_updates_usecase: Arc<FetchUpdatesUseCase>,
        authority: Arc<dyn ChatAuthority>,
    ) -> Self {
        Self {
            join_participant_usecase,
            leave_participant_usecase,
            send_message_usecase,
            set_typing_usecase,
            fetch_updates_usecase,
            authority,
        }
    }

    /// Build the shared state for the router
    pub fn into_state(self, idle_timeout: Duration) -> Arc<AppState> {
        Arc::new(AppState {
            join_participant_usecase: self.join_participant_usecase,
            leave_participant_usecase: self.leave_participant_usecase,
            send_message_usecase: self.send_message_usecase,
            set_typing_usecase: self.set_typing_usecase,
            fetch_updates_usecase: self.fetch_updates_usecase,
            authority: self.authority,
            idle_timeout,
        })
    }

    /// Run the chat server until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured
    /// address or if there's an error during server execution.
    pub async fn run(self, config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", config.host, config.port);
        let state = self.into_state(Duration::from_secs(config.idle_timeout_secs));
        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Push transport:  ws://{}/ws", bind_addr);
        tracing::info!("Pull transport:  http://{}/poll", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
