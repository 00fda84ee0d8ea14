//! Wire message shapes to the domain `ChatMessage`.
//!
//! Socket frames and REST records name their author differently: the frame's
//! `sender_id` is a user id, the record's is a profile id. Both end up in the
//! matching `SenderRef` slot so ownership checks never compare across kinds.

use teammate_domain::{ChatMessage, SenderField, SenderRef};
use teammate_shared::{parse_timestamp, ChatMessageData, MessageFrame, SenderData};

pub fn frame_to_message(frame: MessageFrame) -> ChatMessage {
    let sender = SenderRef {
        user_id: frame.sender_id,
        profile_id: frame.sender_profile_id,
        sender: None,
        display_name: non_empty(frame.sender_name),
    };

    let mut message = ChatMessage::new(frame.message, sender);
    if let Some(id) = frame.message_id {
        message = message.with_id(id);
    }
    if let Some(created_at) = frame.created_at.as_deref().and_then(parse_timestamp) {
        message = message.with_created_at(created_at);
    }
    message
}

pub fn record_to_message(record: ChatMessageData) -> ChatMessage {
    let sender_field = record.sender.map(|sender| match sender {
        SenderData::ProfileId(profile_id) => SenderField::Profile(profile_id),
        SenderData::Nested(nested) => SenderField::Nested {
            user_id: nested.user.map(|user| user.id),
        },
    });

    let sender = SenderRef {
        user_id: None,
        profile_id: record.sender_profile_id.or(record.sender_id),
        sender: sender_field,
        display_name: non_empty(record.sender_name),
    };

    let mut message = ChatMessage::new(record.message, sender).with_id(record.id);
    if let Some(created_at) = record.created_at.as_deref().and_then(parse_timestamp) {
        message = message.with_created_at(created_at);
    }
    message
}

fn non_empty(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
