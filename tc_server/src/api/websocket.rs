//! WebSocket handler for the live display feed.
//!
//! Once connected, clients receive the full session view after every change
//! (once per second while the clock runs) and every clock event together
//! with the tone to play. Clients may also send commands in the same tagged
//! JSON form the session accepts.
//!
//! # Server Messages
//!
//! ```json
//! {"type": "state", "data": { "clock_display": "19:59", ... }}
//! {"type": "event", "event": {"type": "level_up", "level_index": 1},
//!  "tone": {"frequency_hz": 600, "gain": 0.15, "duration_ms": 1000}}
//! {"type": "success", "changed": true}
//! {"type": "error", "message": "Structure cannot be changed while the clock is running"}
//! ```
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6970/ws');
//!
//! ws.onmessage = (event) => {
//!   const data = JSON.parse(event.data);
//!   if (data.type === 'state') {
//!     renderClock(data.data);
//!   } else if (data.type === 'event') {
//!     beep(data.tone);
//!   }
//! };
//!
//! ws.send(JSON.stringify({ type: "pause" }));
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use serde::Serialize;
use tourney_clock::{ClockEvent, SessionCommand, SessionNotification, SessionView, Tone};

use super::AppState;
use crate::{logging, metrics};

/// Messages sent to the display
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    /// Session view after a change
    State { data: Box<SessionView> },
    /// Clock event with the tone to play
    Event { event: ClockEvent, tone: Tone },
    /// Command accepted
    Success { changed: bool },
    /// Command rejected or malformed
    Error { message: String },
}

impl From<SessionNotification> for ServerMessage {
    fn from(notification: SessionNotification) -> Self {
        match notification {
            SessionNotification::Updated(view) => ServerMessage::State {
                data: Box::new(view),
            },
            SessionNotification::Clock(event) => ServerMessage::Event {
                event,
                tone: event.tone(),
            },
        }
    }
}

/// Upgrade HTTP connection to WebSocket for the display feed.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
///
/// A send task forwards session notifications and command responses; the
/// receive loop parses client commands until the socket closes.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let (subscriber_id, mut notification_rx) = match state.session.subscribe().await {
        Ok(subscription) => subscription,
        Err(e) => {
            error!("Failed to subscribe display: {}", e);
            return;
        }
    };

    let subscriber_label = subscriber_id.to_string();
    logging::log_display_connection(&subscriber_label, true);
    metrics::websocket_connections_total();
    metrics::websocket_connections_active(1.0);

    let (response_tx, mut response_rx) = tokio::sync::mpsc::channel::<ServerMessage>(32);

    let send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                Some(notification) = notification_rx.recv() => ServerMessage::from(notification),
                Some(response) = response_rx.recv() => response,
                else => break,
            };

            let json = match serde_json::to_string(&message) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize display message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            metrics::websocket_messages_sent();
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = match serde_json::from_str::<SessionCommand>(&text) {
                    Ok(command) => {
                        let name = command.name();
                        info!("Display {} sent command {}", subscriber_id, name);
                        match state.session.command(command).await {
                            Ok(outcome) => {
                                let label = if outcome.changed { "applied" } else { "unchanged" };
                                metrics::commands_total(name, label);
                                ServerMessage::Success {
                                    changed: outcome.changed,
                                }
                            }
                            Err(e) => {
                                metrics::commands_total(name, "rejected");
                                ServerMessage::Error {
                                    message: e.client_message(),
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse display message: {}", e);
                        ServerMessage::Error {
                            message: "Invalid message format".to_string(),
                        }
                    }
                };

                if response_tx.send(response).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    let _ = state.session.unsubscribe(subscriber_id).await;

    logging::log_display_connection(&subscriber_label, false);
    metrics::websocket_connections_active(-1.0);
}
