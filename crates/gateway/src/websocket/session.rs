//! Per-connection socket session: authentication handshake, outbound pump,
//! and client event dispatch.
//!
//! Every event is handled as explicit sequential steps — await persistence,
//! then broadcast — so a failed append can never produce a broadcast.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use cadence_database::{MessagingError, User};
use cadence_rooms::UserView;
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::presence::{ConnectionHandle, Delivery};
use crate::state::GatewayState;
use crate::websocket::events::{ClientEvent, ServerEvent};

/// Upgrade handler for the collaboration socket.
pub async fn collab_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<GatewayState>) {
    let (mut sink, mut stream) = socket.split();

    // The connection binds nothing until a valid token arrives; failures keep
    // the socket open for a retry until the handshake window closes.
    let Some(user) = authenticate_socket(&mut sink, &mut stream, &state).await else {
        let _ = sink.close().await;
        return;
    };

    let (tx, mut rx) = mpsc::channel(state.settings.outbound_queue_depth);
    let handle = ConnectionHandle::new(user.id, tx);

    if let Some(displaced) = state.presence.bind(handle.clone()).await {
        // Last writer wins; the displaced connection is told to close.
        displaced.close();
    }

    info!(
        user = %user.public_id,
        connection = %handle.connection_id(),
        "connection authenticated and bound"
    );

    // Outbound pump: drains the bounded queue onto the socket.
    let mut send_task = tokio::spawn(async move {
        while let Some(delivery) = rx.recv().await {
            match delivery {
                Delivery::Event(event) => {
                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Delivery::Close => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Inbound loop: parse and dispatch client events.
    let recv_state = state.clone();
    let recv_handle = handle.clone();
    let recv_user = user.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        handle_client_event(&recv_state, &recv_handle, &recv_user, event).await;
                    }
                    Err(err) => {
                        debug!(error = %err, "rejected malformed client event");
                        recv_handle.send(ServerEvent::Error {
                            message: format!("malformed event: {err}"),
                        });
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    // Disconnect is not leave: presence and subscriptions go, durable
    // membership stays.
    state.presence.unbind(&handle).await;
    state.router.drop_connection(user.id).await;
    info!(user = %user.public_id, "connection closed");
}

/// Drive the authentication handshake until a valid token arrives or the
/// window closes.
async fn authenticate_socket(
    sink: &mut SplitSink<WebSocket, Message>,
    stream: &mut SplitStream<WebSocket>,
    state: &Arc<GatewayState>,
) -> Option<User> {
    let deadline = tokio::time::Instant::now() + state.settings.handshake_timeout;

    loop {
        let message = match tokio::time::timeout_at(deadline, stream.next()).await {
            Ok(Some(Ok(message))) => message,
            Ok(Some(Err(_))) | Ok(None) => return None,
            Err(_) => {
                debug!("authentication handshake timed out");
                return None;
            }
        };

        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => return None,
            _ => continue,
        };

        match serde_json::from_str::<ClientEvent>(&text) {
            Ok(ClientEvent::Authenticate { token }) => {
                match state.directory.authenticate(&state.jwt, &token).await {
                    Ok(user) => {
                        send_on_sink(sink, &ServerEvent::Authenticated { success: true }).await;
                        return Some(user);
                    }
                    Err(err) => {
                        warn!(error = %err, "socket authentication failed");
                        send_on_sink(
                            sink,
                            &ServerEvent::AuthenticationError {
                                message: err.to_string(),
                            },
                        )
                        .await;
                    }
                }
            }
            Ok(_) => {
                send_on_sink(
                    sink,
                    &ServerEvent::Error {
                        message: "authenticate before sending events".to_string(),
                    },
                )
                .await;
            }
            Err(err) => {
                send_on_sink(
                    sink,
                    &ServerEvent::Error {
                        message: format!("malformed event: {err}"),
                    },
                )
                .await;
            }
        }
    }
}

async fn send_on_sink(sink: &mut SplitSink<WebSocket, Message>, event: &ServerEvent) {
    if let Ok(text) = serde_json::to_string(event) {
        let _ = sink.send(Message::Text(text)).await;
    }
}

async fn handle_client_event(
    state: &Arc<GatewayState>,
    handle: &ConnectionHandle,
    user: &User,
    event: ClientEvent,
) {
    match event {
        ClientEvent::Authenticate { .. } => {
            handle.send(ServerEvent::Error {
                message: "already authenticated".to_string(),
            });
        }
        ClientEvent::JoinRoom { room_id } => match check_membership(state, user, &room_id).await {
            Ok(()) => {
                state.router.join(&room_id, user.id).await;
                handle.send(ServerEvent::JoinedRoom { room_id });
            }
            Err(err) => send_error(handle, &err),
        },
        ClientEvent::SendMessage {
            chat_room_id,
            message,
        } => {
            // Persist first; broadcast only a durably stored message. On any
            // failure exactly one error event goes back to the sender.
            match state
                .message_service
                .send(&chat_room_id, user, message)
                .await
            {
                Ok(view) => {
                    state
                        .router
                        .broadcast(&chat_room_id, ServerEvent::NewMessage { message: view })
                        .await;
                }
                Err(err) => send_error(handle, &err),
            }
        }
        ClientEvent::TypingStart { chat_room_id } => {
            typing(state, handle, user, &chat_room_id, true).await;
        }
        ClientEvent::TypingStop { chat_room_id } => {
            typing(state, handle, user, &chat_room_id, false).await;
        }
    }
}

async fn check_membership(
    state: &Arc<GatewayState>,
    user: &User,
    room_id: &str,
) -> Result<(), MessagingError> {
    let room = state.room_service.get_room(room_id).await?;
    if !state.room_service.is_member(&room, user).await? {
        return Err(MessagingError::permission_denied(
            "not a member of the room",
        ));
    }
    Ok(())
}

/// Re-broadcast a transient typing signal. Nothing is persisted and repeats
/// are not deduplicated; clients debounce and self-expire the indicator.
async fn typing(
    state: &Arc<GatewayState>,
    handle: &ConnectionHandle,
    user: &User,
    room_id: &str,
    is_typing: bool,
) {
    if !state.router.is_subscribed(room_id, user.id).await {
        handle.send(ServerEvent::Error {
            message: "join the room before typing".to_string(),
        });
        return;
    }

    state
        .router
        .broadcast(
            room_id,
            ServerEvent::UserTyping {
                user: UserView::from(user),
                is_typing,
            },
        )
        .await;
}

fn send_error(handle: &ConnectionHandle, err: &MessagingError) {
    handle.send(ServerEvent::Error {
        message: err.to_string(),
    });
}
