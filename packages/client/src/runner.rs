//! Client execution logic with reconnection support.

use std::time::Duration;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use crate::{
    error::ClientError,
    formatter::MessageFormatter,
    poll::PollSession,
    push::run_push_session,
    ui::redisplay_prompt,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the WebSocket client with reconnection logic
pub async fn run_push_client(
    url: String,
    display_name: String,
    room: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            url,
            display_name,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_push_session(&url, &display_name, room.as_deref()).await {
            Ok(_) => {
                tracing::info!("Client session ended normally");
                // If connection ended normally (user exit), don't reconnect
                break;
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if reconnect_count >= MAX_RECONNECT_ATTEMPTS {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    std::process::exit(1);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}

/// Run the HTTP polling client until the user exits
///
/// Fetch も join のリフレッシュも定期ポーリングに乗る。入力スレッドが
/// 終了（Ctrl+C / Ctrl+D）したら leave を送って抜ける。
pub async fn run_poll_client(
    base_url: String,
    display_name: String,
    room: Option<String>,
    poll_interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = PollSession::new(base_url);
    let user_id = session.join(&display_name, room.as_deref()).await?;

    tracing::info!("Joined via polling as '{}' ({})", display_name, user_id);
    println!(
        "\nYou are '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        display_name
    );

    // 初回 Fetch でこれまでのログを取り込む
    if let Err(e) = session.fetch().await {
        tracing::warn!("Initial fetch failed: {}", e);
    }
    let mut shown = print_new_messages(&session, 0, &display_name);

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt_name = display_name.clone();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", prompt_name);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    let mut interval = tokio::time::interval(poll_interval);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match session.fetch().await {
                    Ok(_) => {
                        shown = print_new_messages(&session, shown, &display_name);
                    }
                    Err(e) => {
                        tracing::warn!("Fetch failed: {}", e);
                    }
                }
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    // 入力スレッドが終了した
                    break;
                };
                match session.send(&line).await {
                    Ok(_) => {
                        shown = print_new_messages(&session, shown, &display_name);
                    }
                    Err(ClientError::Rejected(message)) => {
                        print!("{}", MessageFormatter::format_error(&message));
                        redisplay_prompt(&display_name);
                    }
                    Err(e) => {
                        tracing::warn!("Send failed: {}", e);
                    }
                }
            }
        }
    }

    if let Err(e) = session.leave().await {
        tracing::warn!("Leave failed: {}", e);
    }

    Ok(())
}

/// Print messages recorded since `shown`; returns the new display position
fn print_new_messages(session: &PollSession, shown: usize, display_name: &str) -> usize {
    let tail = session.mirror().messages_from(shown);
    if !tail.is_empty() {
        for message in tail {
            print!("{}", MessageFormatter::format_message(message));
        }
        redisplay_prompt(display_name);
    }
    shown + tail.len()
}
