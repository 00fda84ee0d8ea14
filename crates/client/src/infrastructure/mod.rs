//! Infrastructure adapters for the outbound ports.

pub mod http_client;
pub mod storage;
pub mod websocket;

pub use http_client::HttpApiClient;
pub use storage::{FileStorageProvider, MemoryStorageProvider};
pub use websocket::ChatSocketClient;
