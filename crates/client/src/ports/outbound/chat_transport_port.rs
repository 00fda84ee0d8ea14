//! Chat transport port - the real-time channel for one match.
//!
//! `connect` never fails synchronously: establishment errors are delivered
//! through `on_error`, so callers always get a handle they can `close`.

use teammate_domain::MatchId;
use teammate_shared::ServerFrame;
use thiserror::Error;

/// Receives every decoded inbound frame.
pub type FrameHandler = Box<dyn Fn(ServerFrame) + Send + Sync + 'static>;

/// Receives the connection failure. Called at most once per connection.
pub type ErrorHandler = Box<dyn Fn(TransportError) + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The socket is not (or no longer) open; use the request path instead.
    #[error("Chat connection is not open")]
    NotOpen,

    #[error("Failed to connect: {0}")]
    Connect(String),

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Failed to encode frame: {0}")]
    Encode(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait ChatTransportPort: Send + Sync {
    /// Open the real-time channel for `match_id`.
    ///
    /// The token is appended as a query parameter when present.
    fn connect(
        &self,
        match_id: MatchId,
        access_token: Option<String>,
        on_message: FrameHandler,
        on_error: ErrorHandler,
    ) -> Box<dyn ChatChannelPort>;
}

/// Handle to one open (or opening) chat connection.
#[cfg_attr(test, mockall::automock)]
pub trait ChatChannelPort: Send + Sync {
    /// The socket is established and not closed.
    fn is_open(&self) -> bool;

    /// The server acknowledged the connection (`connection_established`).
    fn is_connected(&self) -> bool;

    /// Fire-and-forget send. `NotOpen` when the socket cannot take the text.
    fn send(&self, text: &str) -> Result<(), TransportError>;

    /// Release the connection. Repeated calls are no-ops.
    fn close(&self);
}
