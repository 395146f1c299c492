//! Per-connection actor for an authenticated WebSocket.
//!
//! Splits the socket into a writer task fed by an mpsc channel (the
//! handle stored in the connection registry) and a reader loop that
//! dispatches inbound messages. A ping/pong heartbeat reaps peers that
//! vanished without a close frame.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};

use super::messages::ClientMessage;
use crate::app_state::AppState;
use crate::auth::AuthContext;
use crate::domain::{Connection, UserId};
use crate::service::Dispatcher;

/// Server sends a WebSocket ping this often.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Close the connection if no pong arrives within this window.
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Close code for a peer that stopped answering pings.
const CLOSE_IDLE: u16 = 1001;

/// Runs the actor for one authenticated connection.
///
/// Registers the connection, spawns the writer and heartbeat tasks,
/// processes inbound messages until the socket ends, then unregisters.
/// Room memberships are intentionally left intact on close; see
/// [`crate::domain::RoomRegistry`].
pub async fn run_connection(socket: WebSocket, state: AppState, ctx: AuthContext) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    let connection = Connection::new(ctx.user_id.clone(), tx.clone());
    let connection_id = connection.id;
    state.dispatcher.connections().register(connection).await;

    tracing::info!(user_id = %ctx.user_id, %connection_id, "ws connection registered");

    // Writer task: owns the sink, drains the write queue.
    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    // Heartbeat task: periodic pings, close on missed pong.
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<()>();
    let ping_tx = tx.clone();
    let ping_handle = tokio::spawn(async move {
        let mut ping_timer = interval(PING_INTERVAL);
        // Skip the immediate first tick.
        ping_timer.tick().await;

        loop {
            ping_timer.tick().await;

            if ping_tx.send(Message::Ping(Bytes::new())).is_err() {
                // Writer task is gone, nothing left to keep alive.
                break;
            }

            match timeout(PONG_TIMEOUT, pong_rx.recv()).await {
                Ok(Some(())) => {}
                _ => {
                    tracing::warn!("pong timeout, closing connection");
                    let _ = ping_tx.send(Message::Close(Some(CloseFrame {
                        code: CLOSE_IDLE,
                        reason: "pong timeout".into(),
                    })));
                    break;
                }
            }
        }
    });

    // Reader loop.
    loop {
        match ws_receiver.next().await {
            Some(Ok(Message::Text(text))) => {
                handle_client_message(text.as_str(), &state.dispatcher, &ctx.user_id).await;
            }
            Some(Ok(Message::Pong(_))) => {
                let _ = pong_tx.send(());
            }
            Some(Ok(Message::Ping(data))) => {
                let _ = tx.send(Message::Pong(data));
            }
            Some(Ok(Message::Close(frame))) => {
                tracing::debug!(user_id = %ctx.user_id, reason = ?frame, "client closed");
                break;
            }
            Some(Ok(Message::Binary(_))) => {
                tracing::debug!(user_id = %ctx.user_id, "ignoring binary frame");
            }
            Some(Err(err)) => {
                tracing::debug!(user_id = %ctx.user_id, error = %err, "ws receive error");
                break;
            }
            None => break,
        }
    }

    writer_handle.abort();
    ping_handle.abort();

    let removed = state
        .dispatcher
        .connections()
        .unregister(&ctx.user_id, connection_id)
        .await;
    tracing::info!(user_id = %ctx.user_id, %connection_id, removed, "ws connection closed");
}

/// Writer task: forwards queued messages to the WebSocket sink until the
/// queue or the socket closes.
async fn writer_task(
    mut ws_sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            break;
        }
    }
}

/// Dispatches one inbound text message from the client.
///
/// The acting user is always the connection's authenticated user, never
/// anything the message claims. Malformed messages are logged and
/// dropped.
async fn handle_client_message(text: &str, dispatcher: &Dispatcher, user_id: &UserId) {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(err) => {
            tracing::debug!(%user_id, error = %err, "ignoring malformed ws message");
            return;
        }
    };

    match msg {
        ClientMessage::JoinRace { race_id } => {
            dispatcher.rooms().join(&race_id, user_id).await;
            dispatcher.connections().touch(user_id).await;
            tracing::debug!(%user_id, %race_id, "joined race room");
        }
        ClientMessage::LeaveRace { race_id } => {
            dispatcher.rooms().leave(&race_id, user_id).await;
            tracing::debug!(%user_id, %race_id, "left race room");
        }
        ClientMessage::Heartbeat => {
            dispatcher.connections().touch(user_id).await;
        }
    }
}
