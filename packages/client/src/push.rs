//! WebSocket (push transport) client session.

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use irori_server::infrastructure::dto::websocket::{ClientEvent, ParticipantDto, ServerEvent};

use crate::{
    error::ClientError,
    formatter::MessageFormatter,
    mirror::ChatMirror,
    ui::redisplay_prompt,
};

/// Run one WebSocket client session until the connection ends
pub async fn run_push_session(
    url: &str,
    display_name: &str,
    room: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (ws_stream, _response) = match connect_async(url).await {
        Ok(result) => result,
        Err(e) => {
            return Err(Box::new(ClientError::ConnectionError(e.to_string())));
        }
    };

    tracing::info!("Connected to chat server!");
    println!(
        "\nYou are '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        display_name
    );

    let (mut write, mut read) = ws_stream.split();

    // 接続直後に join を送る。接続 ID はサーバが採番し、ロースターの
    // スナップショットとして返ってくる。
    let join = ClientEvent::Join {
        display_name: display_name.to_string(),
        room: room.map(|r| r.to_string()),
    };
    let join_json = serde_json::to_string(&join)
        .map_err(|e| ClientError::MalformedPayload(e.to_string()))?;
    write
        .send(Message::Text(join_json.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    let name_for_read = display_name.to_string();

    // Spawn a task to handle incoming events
    let mut read_task = tokio::spawn(async move {
        let mut mirror = ChatMirror::new();
        mirror.set_connected(true);
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            let formatted = apply_event(&mut mirror, event);
                            print!("{}", formatted);
                        }
                        Err(_) => {
                            print!("{}", MessageFormatter::format_raw(&text));
                        }
                    }
                    redisplay_prompt(&name_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt_name = display_name.to_string();
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

    // Spawn a task to handle stdin input and send to WebSocket
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;

        while let Some(line) = input_rx.recv().await {
            let event = ClientEvent::Message { text: line.clone() };
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send message: {}", e);
                // 未送信の本文を画面に残し、再接続後に打ち直せるようにする
                print!("{}", MessageFormatter::format_undelivered(&line));
                write_error = true;
                break;
            }
        }

        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            if read_result.unwrap_or(false) {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(false) {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
    }

    Ok(())
}

/// Apply one server event to the mirror and return the text to display
fn apply_event(mirror: &mut ChatMirror, event: ServerEvent) -> String {
    match event {
        ServerEvent::ConnectedUsers { self_id, participants } => {
            // サーバが採番した自分の接続 ID。自分の発言判定と
            // ロースターの (me) 表示に使う。
            mirror.set_user_id(self_id);
            mirror.replace_roster(participants);
            let roster: Vec<ParticipantDto> = mirror.roster().into_iter().cloned().collect();
            MessageFormatter::format_roster(&roster, mirror.user_id())
        }
        ServerEvent::UserJoined { id, name, timestamp } => {
            mirror.apply_join(ParticipantDto {
                id,
                name: name.clone(),
                room: String::new(),
                last_seen: 0,
            });
            MessageFormatter::format_user_joined(&name, &timestamp)
        }
        ServerEvent::UserLeft { id, name, timestamp } => {
            mirror.apply_leave(&id);
            MessageFormatter::format_user_left(&name, &timestamp)
        }
        ServerEvent::Message(message) => {
            if mirror.record_message(message.clone()) {
                MessageFormatter::format_message(&message)
            } else {
                String::new()
            }
        }
        ServerEvent::UserTyping {
            user_name,
            is_typing,
            ..
        } => MessageFormatter::format_typing(&user_name, is_typing),
        ServerEvent::Error { message } => MessageFormatter::format_error(&message),
    }
}
