//! `WebSocket` handler for real-time frame streaming.
//!
//! Clients connect to `GET /ws/frames` and receive a JSON-encoded
//! [`FrameBroadcast`] for every resolved frame, clock change and
//! highlight change. A newly connected client first receives the current
//! clock and frame from the snapshot so it can draw immediately.
//!
//! If a client falls behind, lagged messages are skipped and the client
//! resumes from the most recent message.
//!
//! [`FrameBroadcast`]: crate::state::FrameBroadcast

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::{AppState, FrameBroadcast};

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming frames.
///
/// # Route
///
/// `GET /ws/frames`
pub async fn ws_frames(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn send_json(socket: &mut WebSocket, message: &FrameBroadcast) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize frame broadcast: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    let mut rx = state.subscribe();

    let initial: Vec<FrameBroadcast> = {
        let snapshot = state.snapshot.read().await;
        let mut initial = Vec::new();
        if let Some(frame) = &snapshot.frame {
            initial.push(FrameBroadcast::Frame(frame.clone()));
        }
        if let Some(clock) = &snapshot.clock {
            initial.push(FrameBroadcast::Clock(clock.clone()));
        }
        if snapshot.highlighted.is_some() {
            initial.push(FrameBroadcast::Highlight {
                id: snapshot.highlighted.clone(),
            });
        }
        initial
    };
    for message in &initial {
        if !send_json(&mut socket, message).await {
            debug!("WebSocket client disconnected (send failed)");
            return;
        }
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(message) => {
                        if !send_json(&mut socket, &message).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // Control input goes through the REST endpoints.
                    _ => {}
                }
            }
        }
    }
}
