//! Service layer error types
//!
//! Abstracts over the HTTP and socket errors so commands and the chat session
//! deal with one type.

use thiserror::Error;

use teammate_domain::{DomainError, ProfileFormErrors};

use crate::ports::outbound::{ApiError, TransportError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Invalid profile: {0}")]
    InvalidProfile(ProfileFormErrors),

    /// The login exchange returned no tokens.
    #[error("Login failed: {0}")]
    LoginRejected(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Chat session is closed")]
    SessionClosed,
}

impl From<ProfileFormErrors> for ServiceError {
    fn from(errors: ProfileFormErrors) -> Self {
        ServiceError::InvalidProfile(errors)
    }
}
