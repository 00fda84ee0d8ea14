//! Teammate client
//!
//! Hexagonal layout:
//! - `ports` holds the object-safe boundaries (HTTP, storage, chat socket)
//! - `infrastructure` implements them with reqwest, tokio-tungstenite and a JSON file
//! - `application` holds the typed API wrapper, the services, and the chat session
//!
//! The `teammate` binary wires these together in `main.rs`.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;

pub use application::{
    Api, ChatLine, ChatSession, DeliverySource, SendOutcome, ServiceError, Services,
    SessionContext, SessionUpdate,
};
pub use config::ClientConfig;
