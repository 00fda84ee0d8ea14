//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application services to interact with the backend and the local
//! disk without depending on concrete implementations.

pub mod api_error;
pub mod chat_transport_port;
pub mod raw_api_port;
pub mod storage;

pub use api_error::ApiError;
pub use chat_transport_port::{
    ChatChannelPort, ChatTransportPort, ErrorHandler, FrameHandler, TransportError,
};
pub use raw_api_port::RawApiPort;
pub use storage::{storage_keys, StorageProvider};

#[cfg(test)]
pub use chat_transport_port::{MockChatChannelPort, MockChatTransportPort};
#[cfg(test)]
pub use raw_api_port::MockRawApiPort;
