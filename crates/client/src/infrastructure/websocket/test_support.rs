//! In-process chat socket server for transport tests.
//!
//! Behaves like the backend consumer: acknowledges the connection, then
//! answers every `{"message": ...}` frame with a broadcast `message` frame
//! authored by user 7. A text of `bye` makes it close the socket instead.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message as AxumMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Notify;

#[derive(Clone, Default)]
struct ChatServerState {
    received: Arc<Mutex<Vec<String>>>,
    connections: Arc<Mutex<Vec<(i64, Option<String>)>>>,
    disconnects: Arc<Mutex<usize>>,
    disconnected: Arc<Notify>,
}

pub(crate) struct ChatServer {
    addr: SocketAddr,
    state: ChatServerState,
}

impl ChatServer {
    pub(crate) fn ws_base_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Raw text frames the server received, in order.
    pub(crate) fn received(&self) -> Vec<String> {
        self.state.received.lock().unwrap().clone()
    }

    /// `(match_id, token)` per accepted connection.
    pub(crate) fn connections(&self) -> Vec<(i64, Option<String>)> {
        self.state.connections.lock().unwrap().clone()
    }

    pub(crate) fn disconnects(&self) -> usize {
        *self.state.disconnects.lock().unwrap()
    }

    pub(crate) async fn wait_for_disconnects(&self, count: usize, timeout: Duration) {
        tokio::time::timeout(timeout, async {
            while self.disconnects() < count {
                self.state.disconnected.notified().await;
            }
        })
        .await
        .unwrap();
    }
}

pub(crate) async fn spawn_chat_server() -> ChatServer {
    let state = ChatServerState::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let router = axum::Router::new()
        .route("/ws/chat/{match_id}/", get(chat_handler))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    ChatServer { addr, state }
}

/// An address nothing is listening on.
pub(crate) async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn chat_handler(
    ws: WebSocketUpgrade,
    Path(match_id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<ChatServerState>,
) -> Response {
    state
        .connections
        .lock()
        .unwrap()
        .push((match_id, params.get("token").cloned()));
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(mut socket: WebSocket, state: ChatServerState) {
    let established = json!({
        "type": "connection_established",
        "message": "Connected to chat",
    });
    if socket
        .send(AxumMessage::Text(established.to_string().into()))
        .await
        .is_err()
    {
        return;
    }

    while let Some(Ok(message)) = socket.recv().await {
        match message {
            AxumMessage::Text(text) => {
                state.received.lock().unwrap().push(text.as_str().to_string());

                let body: Value = serde_json::from_str(text.as_str()).unwrap_or(Value::Null);
                let body = body["message"].as_str().unwrap_or_default().to_string();
                if body == "bye" {
                    let _ = socket.send(AxumMessage::Close(None)).await;
                    break;
                }

                let echo = json!({
                    "type": "message",
                    "message": body,
                    "sender_id": 7,
                    "sender_profile_id": 70,
                    "sender_name": "Ada Lovelace",
                    "created_at": "2024-05-01T12:00:00Z",
                    "message_id": 1,
                });
                let _ = socket.send(AxumMessage::Text("{not json".into())).await;
                let _ = socket
                    .send(AxumMessage::Text(echo.to_string().into()))
                    .await;
            }
            AxumMessage::Close(_) => break,
            _ => {}
        }
    }

    *state.disconnects.lock().unwrap() += 1;
    state.disconnected.notify_one();
}
