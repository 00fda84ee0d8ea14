//! Chat socket client using tokio-tungstenite

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use teammate_domain::MatchId;
use teammate_shared::{parse_server_frame, ServerFrame};

use super::connection::{mark_failed, transition, ChatConnectionHandle, ChatConnectionState};
use crate::ports::outbound::{
    ChatChannelPort, ChatTransportPort, ErrorHandler, FrameHandler, TransportError,
};

/// Build `{base}/ws/chat/{match_id}/`, with `?token=` when a token is given.
pub fn chat_socket_url(
    ws_base_url: &str,
    match_id: MatchId,
    access_token: Option<&str>,
) -> String {
    let base = ws_base_url.trim_end_matches('/');
    match access_token {
        Some(token) => {
            let token: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
            format!("{base}/ws/chat/{match_id}/?token={token}")
        }
        None => format!("{base}/ws/chat/{match_id}/"),
    }
}

/// Opens one socket per `connect` call. No reconnect.
///
/// `connect` spawns the connection task, so it must be called from inside a
/// tokio runtime.
#[derive(Debug, Clone)]
pub struct ChatSocketClient {
    ws_base_url: String,
}

impl ChatSocketClient {
    pub fn new(ws_base_url: impl Into<String>) -> Self {
        Self {
            ws_base_url: ws_base_url.into(),
        }
    }
}

impl ChatTransportPort for ChatSocketClient {
    fn connect(
        &self,
        match_id: MatchId,
        access_token: Option<String>,
        on_message: FrameHandler,
        on_error: ErrorHandler,
    ) -> Box<dyn ChatChannelPort> {
        let url = chat_socket_url(&self.ws_base_url, match_id, access_token.as_deref());
        let state = Arc::new(AtomicU8::new(ChatConnectionState::Connecting.to_u8()));
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = oneshot::channel();

        tokio::spawn(run_connection(ConnectionTask {
            url,
            match_id,
            state: Arc::clone(&state),
            frames: frames_rx,
            close: close_rx,
            on_message,
            on_error,
        }));

        Box::new(ChatConnectionHandle::new(match_id, state, frames_tx, close_tx))
    }
}

struct ConnectionTask {
    url: String,
    match_id: MatchId,
    state: Arc<AtomicU8>,
    frames: mpsc::UnboundedReceiver<String>,
    close: oneshot::Receiver<()>,
    on_message: FrameHandler,
    on_error: ErrorHandler,
}

async fn run_connection(task: ConnectionTask) {
    let ConnectionTask {
        url,
        match_id,
        state,
        mut frames,
        mut close,
        on_message,
        on_error,
    } = task;

    let connect_result = tokio::select! {
        result = connect_async(url.as_str()) => result,
        _ = &mut close => {
            tracing::debug!(%match_id, "Chat connection released before handshake finished");
            return;
        }
    };

    let ws_stream = match connect_result {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            tracing::error!(%match_id, "Failed to connect chat socket: {}", e);
            if mark_failed(&state) {
                on_error(TransportError::Connect(e.to_string()));
            }
            return;
        }
    };

    transition(&state, ChatConnectionState::Connecting, ChatConnectionState::Open);
    tracing::info!(%match_id, "Chat socket open");

    let (mut write, mut read) = ws_stream.split();

    let failure = loop {
        tokio::select! {
            _ = &mut close => {
                let _ = write.send(Message::Close(None)).await;
                break None;
            }
            frame = frames.recv() => {
                let Some(json) = frame else {
                    let _ = write.send(Message::Close(None)).await;
                    break None;
                };
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::error!(%match_id, "Failed to send chat frame: {}", e);
                    break Some(TransportError::ConnectionLost(e.to_string()));
                }
            }
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => match parse_server_frame(&text) {
                    Ok(frame) => {
                        if matches!(frame, ServerFrame::ConnectionEstablished { .. }) {
                            transition(
                                &state,
                                ChatConnectionState::Open,
                                ChatConnectionState::Connected,
                            );
                        }
                        on_message(frame);
                    }
                    Err(e) => {
                        tracing::warn!(%match_id, "Dropping undecodable chat frame: {}", e);
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!(%match_id, "Server closed chat socket");
                    break Some(TransportError::ConnectionLost(
                        "closed by server".to_string(),
                    ));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::error!(%match_id, "Chat socket error: {}", e);
                    break Some(TransportError::ConnectionLost(e.to_string()));
                }
            }
        }
    };

    match failure {
        Some(error) => {
            if mark_failed(&state) {
                on_error(error);
            }
        }
        None => {
            state.store(ChatConnectionState::Closed.to_u8(), Ordering::SeqCst);
            tracing::debug!(%match_id, "Chat connection task finished");
        }
    }
}
