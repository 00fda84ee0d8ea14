//! Chat socket transport.

mod client;
mod connection;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{chat_socket_url, ChatSocketClient};
pub use connection::{ChatConnectionHandle, ChatConnectionState};
