//! Errors raised by domain rules and value parsing.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Outbound chat text was empty or whitespace only.
    #[error("Message text cannot be empty")]
    EmptyMessage,

    #[error("Invalid ID: {0}")]
    InvalidId(String),

    /// A choice value (developer type, availability, ...) outside the known set.
    #[error("Unknown {kind}: {value}")]
    UnknownChoice { kind: &'static str, value: String },

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unknown_choice(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownChoice {
            kind,
            value: value.into(),
        }
    }
}
