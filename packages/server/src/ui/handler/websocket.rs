//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, IdentityToken, JoinOutcome, MessageDraft},
    infrastructure::dto::websocket::{
        JoinMessage, MessageType, SendMessageRequest, peek_message_type,
    },
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: events addressed to this connection
/// (joined, presence-joined, receive-message, message-accepted) are written to the socket
/// in the order they were queued.
///
/// # Arguments
///
/// * `rx` - Channel receiver for outbound frames
/// * `sender` - WebSocket sink to send frames to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionIdFactory::generate();
    tracing::info!("Connection '{}' opened", connection_id);

    // トランスポート確立時点で送信チャンネルを登録する（join まではメンバーではない）
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .join_room_usecase
        .attach(connection_id.clone(), tx)
        .await;

    let (sender, mut receiver) = socket.split();

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();

    // Spawn a task to receive frames from this client.
    // フレームは一つずつ順番に処理するので、同一接続からのイベント順序は保たれる
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_text(&state_clone, &connection_id_clone, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                _ => {
                    tracing::debug!("Ignoring non-text frame from '{}'", connection_id_clone);
                }
            }
        }
    });

    // Spawn a task to push outbound frames to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    match state.leave_room_usecase.execute(&connection_id).await {
        Some(connection) => tracing::info!(
            "Connection '{}' ({}) left room '{}'",
            connection.id,
            connection.identity.as_str(),
            connection.room_id
        ),
        None => tracing::info!("Connection '{}' closed before joining", connection_id),
    }
}

/// Dispatch one inbound text frame by its `type` field
async fn handle_text(state: &AppState, connection_id: &ConnectionId, text: &str) {
    match peek_message_type(text) {
        Some(MessageType::Join) => {
            // identity_token が文字列でない・欠けている場合は匿名扱い
            let request = serde_json::from_str::<JoinMessage>(text).ok();
            let identity = IdentityToken::coerce(request.as_ref().and_then(JoinMessage::token_str));

            match state
                .join_room_usecase
                .execute(connection_id.clone(), identity)
                .await
            {
                Ok(report) => match report.outcome {
                    JoinOutcome::Joined(connection) => tracing::info!(
                        "Connection '{}' joined as '{}' (notified {} members)",
                        connection_id,
                        connection.identity.as_str(),
                        report.notified
                    ),
                    JoinOutcome::AlreadyJoined(_) => {
                        tracing::debug!("Connection '{}' was already a member", connection_id)
                    }
                },
                Err(e) => tracing::error!("Failed to join '{}': {}", connection_id, e),
            }
        }
        Some(MessageType::SendMessage) => {
            let request = match serde_json::from_str::<SendMessageRequest>(text) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!("Malformed send-message from '{}': {}", connection_id, e);
                    return;
                }
            };

            match state
                .broadcast_message_usecase
                .execute(connection_id, MessageDraft::from(request))
                .await
            {
                Ok(receipt) => tracing::debug!(
                    "Broadcast '{}' from '{}' to {}/{} members",
                    receipt.message.id.as_str(),
                    connection_id,
                    receipt.delivered,
                    receipt.recipients.len()
                ),
                Err(e) => tracing::warn!("Dropped message from '{}': {}", connection_id, e),
            }
        }
        Some(other) => {
            tracing::warn!(
                "Unexpected client event {:?} from '{}', ignoring",
                other,
                connection_id
            );
        }
        None => {
            tracing::warn!("Unparseable frame from '{}', ignoring", connection_id);
        }
    }
}
