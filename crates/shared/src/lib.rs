//! Teammate Shared - wire types for the REST API and the chat socket
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, chrono, and the domain ids
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Lenient decoding** - optional backend fields default instead of failing

pub mod dto;
pub mod messages;
pub mod requests;

pub use dto::{
    parse_timestamp, AuthUserData, ChatMessageData, ErrorBody, GoogleLoginResponse, LikeData,
    LikeOutcomeData, MatchData, NestedSenderData, ProfileData, RefreshResponse, SenderData,
    SenderUserData, SkillData, UnlikeOutcomeData, UserSummaryData,
};
pub use messages::{parse_server_frame, ClientFrame, MessageFrame, ServerFrame};
pub use requests::{
    CreateMessageRequest, GoogleLoginRequest, ProfileUpsertRequest, RefreshTokenRequest,
};
