//! Chat socket frames.
//!
//! The server tags every frame with a `type` field. The client only ever
//! sends one frame shape, carrying the text under the `message` key.

use serde::{Deserialize, Serialize};

use teammate_domain::{MessageId, ProfileId, UserId};

// =============================================================================
// Client Frames (client → server)
// =============================================================================

/// Outbound chat text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFrame {
    #[serde(rename = "message")]
    pub text: String,
}

impl ClientFrame {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

// =============================================================================
// Server Frames (server → client)
// =============================================================================

/// Frames pushed by the chat socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// A chat line was stored and broadcast to the match.
    Message(MessageFrame),
    /// The server accepted the connection.
    #[serde(alias = "connectionEstablished")]
    ConnectionEstablished {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The server rejected something the client sent.
    Error {
        #[serde(default)]
        message: String,
    },
    /// Unknown frame type for forward compatibility
    #[serde(other)]
    Unknown,
}

/// Payload of a `message` frame.
///
/// `sender_id` is the author's *user* id here, unlike the REST record where
/// the same key holds a profile id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFrame {
    pub message: String,
    #[serde(default)]
    pub sender_id: Option<UserId>,
    #[serde(default)]
    pub sender_profile_id: Option<ProfileId>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub message_id: Option<MessageId>,
}

/// Decode one text frame from the socket.
pub fn parse_server_frame(text: &str) -> Result<ServerFrame, serde_json::Error> {
    serde_json::from_str(text)
}
