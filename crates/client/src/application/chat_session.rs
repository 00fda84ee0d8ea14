//! One open chat thread.
//!
//! The session owns its message list. Transport callbacks only push events
//! into a channel; `next_update` applies them one at a time, so the list is
//! never touched from two places at once.
//!
//! Sending prefers the socket. When the socket is not open the text goes out
//! as a create-message request instead. A draft that fails to go out stays
//! in the draft.

use tokio::sync::mpsc;

use teammate_domain::{validate_outgoing_text, ChatMessage, LocalIdentity, MatchId, Ownership};
use teammate_shared::{ProfileData, ServerFrame};

use super::message_translator::{frame_to_message, record_to_message};
use super::services::{ChatService, Services};
use super::{ServiceError, SessionContext};
use crate::ports::outbound::{ChatChannelPort, ChatTransportPort, TransportError};

/// How a line reached the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliverySource {
    History,
    Realtime,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub message: ChatMessage,
    pub ownership: Ownership,
    pub source: DeliverySource,
}

impl ChatLine {
    pub fn is_mine(&self) -> bool {
        self.ownership.is_mine()
    }
}

/// What applying one transport event changed.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// A line was appended.
    Message(ChatLine),
    /// The server acknowledged the socket.
    Connected,
    /// The server rejected something; the connection stays up.
    ServerError(String),
    /// The socket failed or was closed by the server. Sends use the request path from now on.
    Offline(TransportError),
    /// A frame type this client does not handle.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Handed to the socket; the echo arrives as a `SessionUpdate::Message`.
    Realtime,
    /// Stored over HTTP and appended locally.
    Fallback(ChatLine),
    /// Nothing to send (empty or whitespace-only text).
    Skipped,
}

enum TransportEvent {
    Frame(ServerFrame),
    Failed(TransportError),
}

pub struct ChatSession {
    match_id: MatchId,
    identity: LocalIdentity,
    other_user: Option<ProfileData>,
    lines: Vec<ChatLine>,
    connected: bool,
    last_error: Option<String>,
    draft: String,
    chat: ChatService,
    channel: Option<Box<dyn ChatChannelPort>>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    closed: bool,
}

impl ChatSession {
    /// Load the own profile, history, and other participant concurrently,
    /// then connect the socket.
    ///
    /// Load failures are logged and leave the corresponding part empty. A
    /// loaded profile replaces the one in `ctx`.
    pub async fn open(
        ctx: &mut SessionContext,
        services: &Services,
        transport: &dyn ChatTransportPort,
        match_id: MatchId,
    ) -> Self {
        let (profile, history, other_user) = tokio::join!(
            services.profiles.my_profile(),
            services.chat.history(match_id),
            services.matches.other_user(match_id),
        );

        match profile {
            Ok(Some(profile)) => ctx.set_profile(Some(profile)),
            Ok(None) => tracing::debug!("No own profile yet"),
            Err(e) => tracing::warn!(%match_id, "Failed to load own profile: {}", e),
        }
        let identity = ctx.identity();

        let lines = match history {
            Ok(records) => records
                .into_iter()
                .map(|record| {
                    classify(&identity, record_to_message(record), DeliverySource::History)
                })
                .collect(),
            Err(e) => {
                tracing::warn!(%match_id, "Failed to load chat history: {}", e);
                Vec::new()
            }
        };

        let other_user = match other_user {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(%match_id, "Failed to load chat partner: {}", e);
                None
            }
        };

        let (events_tx, events) = mpsc::unbounded_channel();
        let errors_tx = events_tx.clone();
        let channel = transport.connect(
            match_id,
            services.auth.access_token(),
            Box::new(move |frame| {
                let _ = events_tx.send(TransportEvent::Frame(frame));
            }),
            Box::new(move |error| {
                let _ = errors_tx.send(TransportEvent::Failed(error));
            }),
        );

        tracing::info!(%match_id, history = lines.len(), "Chat session opened");

        Self {
            match_id,
            identity,
            other_user,
            lines,
            connected: false,
            last_error: None,
            draft: String::new(),
            chat: services.chat.clone(),
            channel: Some(channel),
            events,
            closed: false,
        }
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }

    pub fn other_user(&self) -> Option<&ProfileData> {
        self.other_user.as_ref()
    }

    pub fn other_user_name(&self) -> Option<String> {
        self.other_user
            .as_ref()
            .map(ProfileData::display_name)
            .filter(|name| !name.is_empty())
    }

    /// The server has acknowledged the socket and it has not failed since.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Wait for the next transport event and apply it.
    ///
    /// `None` once the session is closed or the transport has gone away for
    /// good; sending still works through the request path after that.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        if self.closed {
            return None;
        }
        let event = self.events.recv().await?;
        Some(self.apply(event))
    }

    fn apply(&mut self, event: TransportEvent) -> SessionUpdate {
        match event {
            TransportEvent::Frame(ServerFrame::Message(frame)) => {
                let line = self.push(frame_to_message(frame), DeliverySource::Realtime);
                SessionUpdate::Message(line)
            }
            TransportEvent::Frame(ServerFrame::ConnectionEstablished { .. }) => {
                self.connected = true;
                tracing::info!(match_id = %self.match_id, "Chat connected");
                SessionUpdate::Connected
            }
            TransportEvent::Frame(ServerFrame::Error { message }) => {
                tracing::warn!(match_id = %self.match_id, "Chat server error: {}", message);
                self.last_error = Some(message.clone());
                SessionUpdate::ServerError(message)
            }
            TransportEvent::Frame(ServerFrame::Unknown) => SessionUpdate::Ignored,
            TransportEvent::Failed(error) => {
                self.connected = false;
                self.last_error = Some(error.to_string());
                SessionUpdate::Offline(error)
            }
        }
    }

    /// Send `text`, over the socket when it is open and as a request otherwise.
    ///
    /// The draft is left alone; use `send_draft` to send what was typed.
    pub async fn send(&mut self, text: &str) -> Result<SendOutcome, ServiceError> {
        if validate_outgoing_text(text).is_err() {
            return Ok(SendOutcome::Skipped);
        }
        if self.closed {
            return Err(ServiceError::SessionClosed);
        }

        if let Some(channel) = self.channel.as_ref().filter(|c| c.is_open()) {
            match channel.send(text) {
                Ok(()) => return Ok(SendOutcome::Realtime),
                Err(e) => tracing::debug!("Socket send failed, using request path: {}", e),
            }
        }

        match self.chat.send_message(self.match_id, text).await {
            Ok(record) => {
                let line = self.push(record_to_message(record), DeliverySource::Fallback);
                Ok(SendOutcome::Fallback(line))
            }
            Err(e) => {
                tracing::warn!(match_id = %self.match_id, "Failed to send message: {}", e);
                Err(e)
            }
        }
    }

    /// Send the draft and clear it.
    ///
    /// The draft comes back unchanged unless the text was delivered.
    pub async fn send_draft(&mut self) -> Result<SendOutcome, ServiceError> {
        let text = std::mem::take(&mut self.draft);
        let result = self.send(&text).await;
        if !matches!(result, Ok(SendOutcome::Realtime | SendOutcome::Fallback(_))) {
            self.draft = text;
        }
        result
    }

    /// Release the socket. Later calls do nothing; also runs on drop.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.connected = false;
        if let Some(channel) = self.channel.take() {
            channel.close();
        }
        self.events.close();
        tracing::info!(match_id = %self.match_id, "Chat session closed");
    }

    fn push(&mut self, message: ChatMessage, source: DeliverySource) -> ChatLine {
        let line = classify(&self.identity, message, source);
        self.lines.push(line.clone());
        line
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn classify(identity: &LocalIdentity, message: ChatMessage, source: DeliverySource) -> ChatLine {
    ChatLine {
        ownership: identity.resolve(&message.sender),
        message,
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;
    use teammate_domain::{ProfileId, UserId};
    use teammate_shared::{AuthUserData, MessageFrame};

    use super::*;
    use crate::infrastructure::storage::MemoryStorageProvider;
    use crate::ports::outbound::{
        storage_keys, ApiError, ErrorHandler, FrameHandler, MockChatChannelPort,
        MockChatTransportPort, MockRawApiPort, StorageProvider,
    };

    type Handlers = Arc<Mutex<Option<(FrameHandler, ErrorHandler)>>>;

    const MATCH: i64 = 42;

    fn signed_in() -> SessionContext {
        SessionContext::new(AuthUserData {
            id: UserId::new(7),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        })
    }

    fn services(raw: MockRawApiPort) -> Services {
        let storage = MemoryStorageProvider::new();
        storage.save(storage_keys::ACCESS_TOKEN, "tok");
        Services::new(Arc::new(raw), Arc::new(storage))
    }

    /// Own profile 70, empty history, partner Grace Hopper.
    fn initial_load(raw: &mut MockRawApiPort) {
        raw.expect_get_optional_json()
            .withf(|path| path == "/api/v1/profiles/me/")
            .returning(|_| Ok(Some(json!({"id": 70, "user": {"id": 7}}))));
        raw.expect_get_json()
            .withf(|path| path == "/api/v1/messages/by_match/?match_id=42")
            .returning(|_| Ok(json!([])));
        raw.expect_get_json()
            .withf(|path| path == "/api/v1/matches/42/other_user/")
            .returning(|_| {
                Ok(json!({"id": 3, "user": {"id": 30, "first_name": "Grace", "last_name": "Hopper"}}))
            });
    }

    fn channel(open: bool) -> MockChatChannelPort {
        let mut channel = MockChatChannelPort::new();
        channel.expect_is_open().return_const(open);
        channel.expect_is_connected().return_const(open);
        channel.expect_close().return_const(());
        channel
    }

    fn transport(channel: MockChatChannelPort, handlers: Handlers) -> MockChatTransportPort {
        let mut transport = MockChatTransportPort::new();
        transport
            .expect_connect()
            .withf(|match_id, token, _, _| {
                *match_id == MatchId::new(MATCH) && token.as_deref() == Some("tok")
            })
            .times(1)
            .return_once(move |_, _, on_message, on_error| {
                *handlers.lock().unwrap() = Some((on_message, on_error));
                Box::new(channel)
            });
        transport
    }

    fn emit(handlers: &Handlers, frame: ServerFrame) {
        let guard = handlers.lock().unwrap();
        let (on_message, _) = guard.as_ref().unwrap();
        on_message(frame);
    }

    fn fail(handlers: &Handlers, error: TransportError) {
        let guard = handlers.lock().unwrap();
        let (_, on_error) = guard.as_ref().unwrap();
        on_error(error);
    }

    async fn open_session(
        raw: MockRawApiPort,
        channel: MockChatChannelPort,
    ) -> (ChatSession, Handlers, SessionContext) {
        let handlers: Handlers = Arc::new(Mutex::new(None));
        let transport = transport(channel, Arc::clone(&handlers));
        let services = services(raw);
        let mut ctx = signed_in();
        let session = ChatSession::open(&mut ctx, &services, &transport, MatchId::new(MATCH)).await;
        (session, handlers, ctx)
    }

    #[tokio::test]
    async fn acknowledged_socket_then_own_frame_is_mine() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        let (mut session, handlers, ctx) = open_session(raw, channel(true)).await;

        assert_eq!(ctx.identity().profile_id, Some(ProfileId::new(70)));
        assert!(!session.is_connected());

        emit(&handlers, ServerFrame::ConnectionEstablished { message: None });
        assert_eq!(session.next_update().await, Some(SessionUpdate::Connected));
        assert!(session.is_connected());

        emit(
            &handlers,
            ServerFrame::Message(MessageFrame {
                message: "hey".to_string(),
                sender_id: Some(UserId::new(7)),
                sender_profile_id: None,
                sender_name: None,
                created_at: None,
                message_id: None,
            }),
        );
        let Some(SessionUpdate::Message(line)) = session.next_update().await else {
            panic!("expected a message update");
        };
        assert_eq!(line.message.text, "hey");
        assert_eq!(line.ownership, Ownership::Mine);
        assert_eq!(line.source, DeliverySource::Realtime);
        assert_eq!(session.lines().len(), 1);
    }

    #[tokio::test]
    async fn partner_frame_is_theirs() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        let (mut session, handlers, _ctx) = open_session(raw, channel(true)).await;

        let frame: MessageFrame = serde_json::from_value(
            json!({"message": "hello", "sender_id": 30, "sender_profile_id": 3}),
        )
        .unwrap();
        emit(&handlers, ServerFrame::Message(frame));

        let Some(SessionUpdate::Message(line)) = session.next_update().await else {
            panic!("expected a message update");
        };
        assert_eq!(line.ownership, Ownership::Theirs);
    }

    #[tokio::test]
    async fn send_without_socket_uses_one_request_and_restores_draft_on_failure() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        raw.expect_post_json()
            .withf(|path, body| {
                path == "/api/v1/messages/" && *body == json!({"match": 42, "message": "hi"})
            })
            .times(1)
            .returning(|_, _| Err(ApiError::RequestFailed("offline".to_string())));
        let (mut session, _handlers, _ctx) = open_session(raw, channel(false)).await;

        session.set_draft("hi");
        let result = session.send_draft().await;

        assert!(result.is_err());
        assert_eq!(session.draft(), "hi");
        assert!(session.lines().is_empty());
    }

    #[tokio::test]
    async fn send_without_socket_appends_stored_record() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        raw.expect_post_json()
            .times(1)
            .returning(|_, _| Ok(json!({"id": 9, "match": 42, "sender": 70, "message": "hi"})));
        let (mut session, _handlers, _ctx) = open_session(raw, channel(false)).await;

        session.set_draft("hi");
        let outcome = session.send_draft().await.unwrap();

        let SendOutcome::Fallback(line) = outcome else {
            panic!("expected the request path");
        };
        assert!(line.is_mine());
        assert_eq!(session.draft(), "");
        assert_eq!(session.lines(), &[line]);
    }

    #[tokio::test]
    async fn send_with_open_socket_makes_no_request() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        raw.expect_post_json().never();
        let mut socket = channel(true);
        socket
            .expect_send()
            .withf(|text| text == "hi")
            .times(1)
            .returning(|_| Ok(()));
        let (mut session, _handlers, _ctx) = open_session(raw, socket).await;

        let outcome = session.send("hi").await.unwrap();

        assert_eq!(outcome, SendOutcome::Realtime);
        assert_eq!(session.draft(), "");
    }

    #[tokio::test]
    async fn sending_other_text_keeps_the_draft() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        raw.expect_post_json().never();
        let mut socket = channel(true);
        socket
            .expect_send()
            .withf(|text| text == "hi")
            .times(1)
            .returning(|_| Ok(()));
        let (mut session, _handlers, _ctx) = open_session(raw, socket).await;

        session.set_draft("half-typed reply");
        let outcome = session.send("hi").await.unwrap();

        assert_eq!(outcome, SendOutcome::Realtime);
        assert_eq!(session.draft(), "half-typed reply");
    }

    #[tokio::test]
    async fn failed_request_for_other_text_keeps_the_draft() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        raw.expect_post_json()
            .times(1)
            .returning(|_, _| Err(ApiError::RequestFailed("offline".to_string())));
        let (mut session, _handlers, _ctx) = open_session(raw, channel(false)).await;

        session.set_draft("half-typed reply");
        assert!(session.send("hi").await.is_err());

        assert_eq!(session.draft(), "half-typed reply");
    }

    #[tokio::test]
    async fn dropping_an_unclosed_session_releases_channel() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        let mut socket = MockChatChannelPort::new();
        socket.expect_is_open().return_const(true);
        socket.expect_close().times(1).return_const(());
        let (session, handlers, _ctx) = open_session(raw, socket).await;

        drop(session);

        // The receiving side is gone; late frames are discarded.
        emit(&handlers, ServerFrame::ConnectionEstablished { message: None });
    }

    #[tokio::test]
    async fn socket_refusing_text_falls_back_to_request() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        raw.expect_post_json()
            .times(1)
            .returning(|_, _| Ok(json!({"id": 10, "sender": 70, "message": "hi"})));
        let mut socket = channel(true);
        socket
            .expect_send()
            .returning(|_| Err(TransportError::NotOpen));
        let (mut session, _handlers, _ctx) = open_session(raw, socket).await;

        let outcome = session.send("hi").await.unwrap();

        assert!(matches!(outcome, SendOutcome::Fallback(_)));
    }

    #[tokio::test]
    async fn whitespace_only_text_is_skipped() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        raw.expect_post_json().never();
        let (mut session, _handlers, _ctx) = open_session(raw, channel(false)).await;

        session.set_draft("   ");
        assert_eq!(session.send_draft().await.unwrap(), SendOutcome::Skipped);
        assert_eq!(session.draft(), "   ");
    }

    #[tokio::test]
    async fn transport_failure_marks_session_offline() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        let (mut session, handlers, _ctx) = open_session(raw, channel(true)).await;

        emit(&handlers, ServerFrame::ConnectionEstablished { message: None });
        session.next_update().await;
        fail(&handlers, TransportError::ConnectionLost("reset".to_string()));

        assert_eq!(
            session.next_update().await,
            Some(SessionUpdate::Offline(TransportError::ConnectionLost(
                "reset".to_string()
            )))
        );
        assert!(!session.is_connected());
        assert!(session.last_error().is_some());
    }

    #[tokio::test]
    async fn server_error_frame_is_surfaced_without_disconnecting() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        let (mut session, handlers, _ctx) = open_session(raw, channel(true)).await;

        emit(&handlers, ServerFrame::ConnectionEstablished { message: None });
        session.next_update().await;
        emit(
            &handlers,
            ServerFrame::Error {
                message: "Message cannot be empty".to_string(),
            },
        );

        assert_eq!(
            session.next_update().await,
            Some(SessionUpdate::ServerError(
                "Message cannot be empty".to_string()
            ))
        );
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn close_twice_releases_channel_once() {
        let mut raw = MockRawApiPort::new();
        initial_load(&mut raw);
        let mut socket = MockChatChannelPort::new();
        socket.expect_is_open().return_const(true);
        socket.expect_close().times(1).return_const(());
        let (mut session, handlers, _ctx) = open_session(raw, socket).await;

        session.close();
        session.close();

        // Late events land in a closed channel.
        emit(&handlers, ServerFrame::ConnectionEstablished { message: None });
        assert_eq!(session.next_update().await, None);
        assert!(session.is_closed());
        assert_eq!(
            session.send("late").await,
            Err(ServiceError::SessionClosed)
        );

        drop(session);
    }

    #[tokio::test]
    async fn failed_history_still_opens_with_partner_name() {
        let mut raw = MockRawApiPort::new();
        raw.expect_get_optional_json().returning(|_| Ok(None));
        raw.expect_get_json()
            .withf(|path| path.starts_with("/api/v1/messages/by_match/"))
            .returning(|_| {
                Err(ApiError::HttpError {
                    status: 500,
                    message: "boom".to_string(),
                })
            });
        raw.expect_get_json()
            .withf(|path| path == "/api/v1/matches/42/other_user/")
            .returning(|_| {
                Ok(json!({"id": 3, "user": {"id": 30, "first_name": "Grace", "last_name": "Hopper"}}))
            });
        let (session, _handlers, ctx) = open_session(raw, channel(false)).await;

        assert!(session.lines().is_empty());
        assert_eq!(session.other_user_name().as_deref(), Some("Grace Hopper"));
        assert!(!ctx.has_profile());
    }

    #[tokio::test]
    async fn history_lines_are_classified_in_order() {
        let mut raw = MockRawApiPort::new();
        raw.expect_get_optional_json()
            .returning(|_| Ok(Some(json!({"id": 70, "user": {"id": 7}}))));
        raw.expect_get_json()
            .withf(|path| path.starts_with("/api/v1/messages/by_match/"))
            .returning(|_| {
                Ok(json!([
                    {"id": 1, "sender": 70, "message": "first"},
                    {"id": 2, "sender": {"id": 3, "user": {"id": 30}}, "message": "second"},
                    {"id": 3, "sender": {"id": 70, "user": {"id": 7}}, "message": "third"}
                ]))
            });
        raw.expect_get_json()
            .withf(|path| path == "/api/v1/matches/42/other_user/")
            .returning(|_| Err(ApiError::NotFound));
        let (session, _handlers, _ctx) = open_session(raw, channel(false)).await;

        let summary: Vec<_> = session
            .lines()
            .iter()
            .map(|line| (line.message.text.as_str(), line.is_mine()))
            .collect();
        assert_eq!(
            summary,
            vec![("first", true), ("second", false), ("third", true)]
        );
        assert_eq!(session.other_user_name(), None);
    }
}
