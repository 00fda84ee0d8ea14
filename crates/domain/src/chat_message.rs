//! Chat message model.
//!
//! Messages reach the client through two transports (the chat socket and the
//! REST history/create endpoints) and the two disagree on how the author is
//! identified. [`SenderRef`] keeps every shape that was present so ownership
//! can be decided later against the local identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, ProfileId, UserId};
use crate::DomainError;

/// The raw `sender` field of a message record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SenderField {
    /// A bare profile id.
    Profile(ProfileId),
    /// A nested sender object; only the author's user id is relevant here.
    Nested { user_id: Option<UserId> },
}

/// Every author identifier a transport may have attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderRef {
    /// `sender_id`, the author's user id on the socket path.
    pub user_id: Option<UserId>,
    /// `sender_profile_id`
    pub profile_id: Option<ProfileId>,
    /// `sender`
    pub sender: Option<SenderField>,
    pub display_name: Option<String>,
}

impl SenderRef {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.profile_id.is_none() && self.sender.is_none()
    }
}

/// A single chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Absent for frames the server did not persist.
    pub id: Option<MessageId>,
    pub text: String,
    pub sender: SenderRef,
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, sender: SenderRef) -> Self {
        Self {
            id: None,
            text: text.into(),
            sender,
            created_at: None,
        }
    }

    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn sender_name(&self) -> Option<&str> {
        self.sender.display_name.as_deref()
    }
}

/// Check that outbound text is worth sending.
///
/// Whitespace-only input is rejected. The text itself is returned untouched:
/// what the user typed is what goes over the wire.
pub fn validate_outgoing_text(text: &str) -> Result<&str, DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::EmptyMessage);
    }
    Ok(text)
}
