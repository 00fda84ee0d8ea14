//! Strongly-typed identifiers.
//!
//! The backend keys every record with an integer primary key. Wrapping each
//! one in its own type keeps a profile id from being compared against a user
//! id by accident, which matters because the chat payloads mix both.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| crate::DomainError::invalid_id(format!(
                        "{} is not a valid {}",
                        s,
                        stringify!($name)
                    )))
            }
        }
    };
}

// Identity
define_id!(UserId);
define_id!(ProfileId);

// Matching
define_id!(LikeId);
define_id!(MatchId);

// Chat
define_id!(MessageId);

// Catalogue
define_id!(SkillId);
