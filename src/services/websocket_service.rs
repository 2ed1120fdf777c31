use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::dto::ws::{ClientMessage, ServerMessage};
use crate::state::SharedState;

/// Handle the full lifecycle of an individual player WebSocket connection.
///
/// The connection is registered under the player's name as soon as the
/// socket is up (last-connect-wins); the read loop's only core
/// responsibility is to release that registration when the socket closes or
/// errors out.
pub async fn handle_socket(state: SharedState, socket: WebSocket, username: String) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we
    // await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    state.connections().register(username.clone(), outbound_tx.clone());
    info!(player = %username, "player connected");

    send_message(
        &outbound_tx,
        &ServerMessage::Connected {
            username: username.clone(),
        },
    );

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match ClientMessage::from_json_str(&text) {
                Ok(ClientMessage::Ping) => send_message(&outbound_tx, &ServerMessage::Pong),
                Ok(ClientMessage::Ack) => {
                    debug!(player = %username, "notification acknowledged")
                }
                Ok(ClientMessage::Unknown) => {
                    warn!(player = %username, payload = %text, "ignoring unknown client message")
                }
                Err(err) => {
                    warn!(player = %username, error = %err, "failed to parse client message")
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(player = %username, "player closed connection");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(player = %username, error = %err, "websocket error");
                break;
            }
        }
    }

    // Only removes the registry entry if a reconnect has not replaced it.
    state.connections().release(&username, &outbound_tx);
    info!(player = %username, "player disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Serialize a payload and push it onto this connection's writer channel.
fn send_message(tx: &mpsc::UnboundedSender<Message>, message: &ServerMessage) {
    match message.to_ws_message() {
        Ok(payload) => {
            let _ = tx.send(payload);
        }
        Err(err) => warn!(error = %err, "failed to serialize outbound message `{message:?}`"),
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
