//! Teammate Domain - identifiers, chat messages, and the rules that apply to them.
//!
//! Pure types only: no I/O, no async.

pub mod chat_message;
pub mod error;
pub mod ids;
pub mod ownership;
pub mod profile;

pub use chat_message::{validate_outgoing_text, ChatMessage, SenderField, SenderRef};
pub use error::DomainError;
pub use ids::{LikeId, MatchId, MessageId, ProfileId, SkillId, UserId};
pub use ownership::{LocalIdentity, Ownership, OwnershipRule};
pub use profile::{
    Availability, DeveloperType, FieldError, ProfileForm, ProfileFormErrors, SkillCategory,
    TeammatePreference, MAX_AGE, MIN_AGE,
};
