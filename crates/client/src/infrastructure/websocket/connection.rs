//! Connection lifecycle for one chat socket.
//!
//! The connection task and the handle share an `AtomicU8` state; the handle
//! reads it for `is_open`/`is_connected`, the task advances it.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};

use teammate_domain::MatchId;
use teammate_shared::ClientFrame;

use crate::ports::outbound::{ChatChannelPort, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatConnectionState {
    /// Socket handshake in progress
    Connecting,
    /// Socket is up, server has not acknowledged yet
    Open,
    /// Server sent `connection_established`
    Connected,
    /// Released by the client
    Closed,
    /// Handshake failed or the connection dropped
    Failed,
}

impl ChatConnectionState {
    /// Convert to u8 for atomic storage.
    pub fn to_u8(self) -> u8 {
        match self {
            ChatConnectionState::Connecting => 0,
            ChatConnectionState::Open => 1,
            ChatConnectionState::Connected => 2,
            ChatConnectionState::Closed => 3,
            ChatConnectionState::Failed => 4,
        }
    }

    /// Convert from u8 (atomic storage).
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ChatConnectionState::Open,
            2 => ChatConnectionState::Connected,
            3 => ChatConnectionState::Closed,
            4 => ChatConnectionState::Failed,
            _ => ChatConnectionState::Connecting,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(
            self,
            ChatConnectionState::Open | ChatConnectionState::Connected
        )
    }
}

pub(crate) fn load_state(state: &AtomicU8) -> ChatConnectionState {
    ChatConnectionState::from_u8(state.load(Ordering::SeqCst))
}

/// Move from `from` to `to`; a no-op if the state has moved on meanwhile.
pub(crate) fn transition(
    state: &AtomicU8,
    from: ChatConnectionState,
    to: ChatConnectionState,
) -> bool {
    state
        .compare_exchange(from.to_u8(), to.to_u8(), Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
}

/// Mark the connection failed unless the client already closed it.
///
/// Returns whether the failure should be reported.
pub(crate) fn mark_failed(state: &AtomicU8) -> bool {
    state
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
            let current = ChatConnectionState::from_u8(current);
            matches!(
                current,
                ChatConnectionState::Connecting
                    | ChatConnectionState::Open
                    | ChatConnectionState::Connected
            )
            .then_some(ChatConnectionState::Failed.to_u8())
        })
        .is_ok()
}

/// Client side of one chat connection.
///
/// Dropping the handle releases the socket as well: the task sees both of
/// its channels close.
pub struct ChatConnectionHandle {
    match_id: MatchId,
    state: Arc<AtomicU8>,
    frames: mpsc::UnboundedSender<String>,
    close_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl ChatConnectionHandle {
    pub(crate) fn new(
        match_id: MatchId,
        state: Arc<AtomicU8>,
        frames: mpsc::UnboundedSender<String>,
        close_tx: oneshot::Sender<()>,
    ) -> Self {
        Self {
            match_id,
            state,
            frames,
            close_tx: Mutex::new(Some(close_tx)),
        }
    }

    pub fn state(&self) -> ChatConnectionState {
        load_state(&self.state)
    }
}

impl ChatChannelPort for ChatConnectionHandle {
    fn is_open(&self) -> bool {
        self.state().is_open()
    }

    fn is_connected(&self) -> bool {
        self.state() == ChatConnectionState::Connected
    }

    fn send(&self, text: &str) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::NotOpen);
        }
        let json = serde_json::to_string(&ClientFrame::new(text))
            .map_err(|e| TransportError::Encode(e.to_string()))?;
        self.frames.send(json).map_err(|_| TransportError::NotOpen)
    }

    fn close(&self) {
        let close_tx = match self.close_tx.lock() {
            Ok(mut guard) => guard.take(),
            Err(e) => {
                tracing::error!("Failed to acquire chat connection lock: {}", e);
                None
            }
        };
        let Some(close_tx) = close_tx else {
            return;
        };

        self.state
            .store(ChatConnectionState::Closed.to_u8(), Ordering::SeqCst);
        let _ = close_tx.send(());
        tracing::info!(match_id = %self.match_id, "Chat connection closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_in(
        state: ChatConnectionState,
    ) -> (
        ChatConnectionHandle,
        mpsc::UnboundedReceiver<String>,
        oneshot::Receiver<()>,
    ) {
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = oneshot::channel();
        let handle = ChatConnectionHandle::new(
            MatchId::new(42),
            Arc::new(AtomicU8::new(state.to_u8())),
            frames_tx,
            close_tx,
        );
        (handle, frames_rx, close_rx)
    }

    #[test]
    fn state_round_trips_through_u8() {
        for state in [
            ChatConnectionState::Connecting,
            ChatConnectionState::Open,
            ChatConnectionState::Connected,
            ChatConnectionState::Closed,
            ChatConnectionState::Failed,
        ] {
            assert_eq!(ChatConnectionState::from_u8(state.to_u8()), state);
        }
    }

    #[test]
    fn send_while_connecting_is_not_open() {
        let (handle, mut frames, _close) = handle_in(ChatConnectionState::Connecting);
        assert_eq!(handle.send("hi"), Err(TransportError::NotOpen));
        assert!(frames.try_recv().is_err());
    }

    #[test]
    fn send_while_open_queues_frame() {
        let (handle, mut frames, _close) = handle_in(ChatConnectionState::Open);
        assert!(handle.is_open());
        assert!(!handle.is_connected());
        handle.send("hi").unwrap();
        assert_eq!(frames.try_recv().unwrap(), r#"{"message":"hi"}"#);
    }

    #[test]
    fn close_is_idempotent() {
        let (handle, _frames, mut close) = handle_in(ChatConnectionState::Connected);
        handle.close();
        handle.close();
        assert_eq!(handle.state(), ChatConnectionState::Closed);
        assert!(close.try_recv().is_ok());
        assert_eq!(handle.send("late"), Err(TransportError::NotOpen));
    }

    #[test]
    fn failure_after_close_is_not_reported() {
        let state = AtomicU8::new(ChatConnectionState::Closed.to_u8());
        assert!(!mark_failed(&state));
        assert_eq!(load_state(&state), ChatConnectionState::Closed);

        let state = AtomicU8::new(ChatConnectionState::Connected.to_u8());
        assert!(mark_failed(&state));
        assert!(!mark_failed(&state));
    }

    #[test]
    fn transition_does_not_reopen_closed_connection() {
        let state = AtomicU8::new(ChatConnectionState::Closed.to_u8());
        assert!(!transition(
            &state,
            ChatConnectionState::Connecting,
            ChatConnectionState::Open
        ));
        assert_eq!(load_state(&state), ChatConnectionState::Closed);
    }
}
