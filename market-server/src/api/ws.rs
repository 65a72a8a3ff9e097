//! Notification WebSocket
//!
//! GET /api/notifications/ws?token=<JWT>
//! Auth: JWT in the query string (browser WebSockets cannot set headers)
//!
//! Server → client only: [`NotificationPush`] frames. `ready` carries the
//! latest notifications on connect, `notification` every new one after.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::error::AppError;
use shared::models::NotificationPush;
use tokio::sync::broadcast;
use tokio::time::Duration;

use super::notifications::NOTIFICATION_PAGE;
use crate::auth::{Requester, rejection};
use crate::state::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

pub async fn notifications_ws(
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let requester = state.jwt.authenticate(&query.token).map_err(|e| {
        tracing::debug!(error = %e, "Notification WS token rejected");
        rejection(e)
    })?;

    Ok(ws.on_upgrade(move |socket| notification_session(socket, state, requester)))
}

async fn notification_session(socket: WebSocket, state: AppState, requester: Requester) {
    let (mut sink, mut stream) = socket.split();
    let user_id = requester.id;

    tracing::info!(user_id, "Notification WS connected");

    // Subscribe before reading the backlog so nothing stored in between is lost
    let mut hub_rx = state.hub.subscribe(user_id);

    if send_ready(&mut sink, &state, user_id).await.is_err() {
        state.hub.unsubscribe(user_id, hub_rx);
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = hub_rx.recv() => {
                match event {
                    Ok(notification) => {
                        let push = NotificationPush::Notification { notification };
                        if send_message(&mut sink, &push).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(user_id, lagged = n, "Notification subscriber lagged, resending latest");
                        hub_rx = state.hub.subscribe(user_id);
                        if send_ready(&mut sink, &state, user_id).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    state.hub.unsubscribe(user_id, hub_rx);
    tracing::info!(user_id, "Notification WS disconnected");
}

type WsSink = futures::stream::SplitSink<WebSocket, Message>;

async fn send_ready(sink: &mut WsSink, state: &AppState, user_id: i64) -> Result<(), ()> {
    let notifications = match state
        .stores
        .notifications
        .list_for_recipient(user_id, NOTIFICATION_PAGE)
        .await
    {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Failed to load notifications for WS");
            Vec::new()
        }
    };
    send_message(sink, &NotificationPush::Ready { notifications }).await
}

async fn send_message(sink: &mut WsSink, msg: &NotificationPush) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize notification push");
    })?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
