//! WebSocket client session management.
//!
//! One call to [`run_client_session`] is one transport session: connect, join,
//! then pump server frames and user input through the `ChatSession` until
//! either side goes away.

use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use serde::Serialize;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, protocol::Message},
};

use roomcast_server::infrastructure::dto::websocket::JoinMessage;

use crate::{
    domain::{ChatSession, ConnectionState, ServerEvent, SessionUpdate},
    error::ClientError,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;
type WsReader = SplitStream<WsStream>;

/// Run one WebSocket client session
///
/// # Arguments
///
/// * `url` - WebSocket endpoint of the server
/// * `session` - Chat state; owned by the caller so it survives reconnects
/// * `inputs` - Lines typed by the user
/// * `updates` - Sink for everything the terminal should show
///
/// # Returns
///
/// `Ok(())` when the input channel closes (the user quit), an error when the
/// connection could not be established or was lost.
pub async fn run_client_session(
    url: &str,
    session: &mut ChatSession,
    inputs: &mut mpsc::UnboundedReceiver<String>,
    updates: &mpsc::UnboundedSender<SessionUpdate>,
) -> Result<(), ClientError> {
    session.begin_connection();
    notify(updates, SessionUpdate::Status(ConnectionState::Connecting));

    let ws_stream = match connect_async(url).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            disconnect(session, updates);
            return Err(match e {
                tungstenite::Error::Url(e) => ClientError::InvalidUrl(e.to_string()),
                tungstenite::Error::HttpFormat(e) => ClientError::InvalidUrl(e.to_string()),
                e => ClientError::ConnectionError(e.to_string()),
            });
        }
    };

    tracing::info!("Connected to chat server at {}", url);

    let (mut write, mut read) = ws_stream.split();

    let join = JoinMessage::new(session.identity_token());
    if let Err(e) = send_frame(&mut write, &join).await {
        disconnect(session, updates);
        return Err(e);
    }

    let result = pump(session, &mut write, &mut read, inputs, updates).await;
    disconnect(session, updates);
    result
}

/// Single-owner loop: every `ChatSession` mutation happens here
async fn pump(
    session: &mut ChatSession,
    write: &mut WsWriter,
    read: &mut WsReader,
    inputs: &mut mpsc::UnboundedReceiver<String>,
    updates: &mpsc::UnboundedSender<SessionUpdate>,
) -> Result<(), ClientError> {
    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => match ServerEvent::parse(text.as_str()) {
                    Some(event) => {
                        if let Some(update) = session.handle_event(event) {
                            notify(updates, update);
                        }
                    }
                    None => tracing::warn!("Ignoring unrecognised frame: {}", text.as_str()),
                },
                Some(Ok(Message::Close(_))) => {
                    tracing::info!("Server closed the connection");
                    return Err(ClientError::ConnectionLost("closed by server".to_string()));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionLost(e.to_string()));
                }
                None => {
                    return Err(ClientError::ConnectionLost("stream ended".to_string()));
                }
            },
            line = inputs.recv() => match line {
                Some(line) => {
                    if let Some((request, echo)) = session.send(&line) {
                        notify(updates, SessionUpdate::Entry(echo));
                        send_frame(write, &request).await?;
                    }
                }
                None => {
                    tracing::info!("Input closed, leaving the chat");
                    write.close().await.ok();
                    return Ok(());
                }
            },
        }
    }
}

/// Serialize and write one frame. A frame that fails to serialize is logged and dropped.
async fn send_frame<T: Serialize>(write: &mut WsWriter, frame: &T) -> Result<(), ClientError> {
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize frame: {}", e);
            return Ok(());
        }
    };

    write.send(Message::Text(json.into())).await.map_err(|e| {
        tracing::warn!("Failed to send frame: {}", e);
        ClientError::ConnectionLost(e.to_string())
    })
}

fn disconnect(session: &mut ChatSession, updates: &mpsc::UnboundedSender<SessionUpdate>) {
    session.on_disconnected();
    notify(updates, SessionUpdate::Status(ConnectionState::Disconnected));
}

fn notify(updates: &mpsc::UnboundedSender<SessionUpdate>, update: SessionUpdate) {
    if updates.send(update).is_err() {
        tracing::debug!("Update receiver dropped");
    }
}
