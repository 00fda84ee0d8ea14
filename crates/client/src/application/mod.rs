//! Application layer: typed API access, services, and the chat session.

pub mod api;
pub mod chat_session;
pub mod error;
pub mod message_translator;
pub mod services;
pub mod session_context;

pub use api::Api;
pub use chat_session::{ChatLine, ChatSession, DeliverySource, SendOutcome, SessionUpdate};
pub use error::ServiceError;
pub use services::Services;
pub use session_context::SessionContext;
