//! Chat Service - the request side of chat: history, fallback send, read receipts.

use teammate_domain::{MatchId, MessageId};
use teammate_shared::{ChatMessageData, CreateMessageRequest};

use crate::application::{Api, ServiceError};

#[derive(Clone)]
pub struct ChatService {
    api: Api,
}

impl ChatService {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    /// Stored messages of a match, oldest first.
    pub async fn history(&self, match_id: MatchId) -> Result<Vec<ChatMessageData>, ServiceError> {
        Ok(self
            .api
            .get(&format!("/api/v1/messages/by_match/?match_id={match_id}"))
            .await?)
    }

    /// Store a message over HTTP. The text is sent exactly as given.
    pub async fn send_message(
        &self,
        match_id: MatchId,
        text: &str,
    ) -> Result<ChatMessageData, ServiceError> {
        let body = CreateMessageRequest::new(match_id, text);
        Ok(self.api.post("/api/v1/messages/", &body).await?)
    }

    pub async fn mark_as_read(&self, id: MessageId) -> Result<ChatMessageData, ServiceError> {
        Ok(self
            .api
            .post_empty(&format!("/api/v1/messages/{id}/mark_as_read/"))
            .await?)
    }
}
