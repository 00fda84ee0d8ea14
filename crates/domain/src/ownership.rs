//! Message ownership resolution.
//!
//! Decides whether a message was written by the local user. The checks run in
//! a fixed order and the first hit wins; each one corresponds to a payload
//! shape seen from one of the transports:
//!
//! 1. `sender_id` equals the local user id (socket frames)
//! 2. `sender_profile_id` equals the local profile id (socket frames)
//! 3. `sender` is a bare profile id equal to the local profile id (REST records)
//! 4. `sender` is an object whose `user.id` equals the local user id
//!
//! Anything else belongs to the other participant.

use serde::{Deserialize, Serialize};

use crate::chat_message::{SenderField, SenderRef};
use crate::ids::{ProfileId, UserId};

/// Which side of the conversation a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    Mine,
    Theirs,
}

impl Ownership {
    pub fn is_mine(self) -> bool {
        self == Ownership::Mine
    }
}

/// The check that attributed a message to the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipRule {
    SenderUserId,
    SenderProfileId,
    BareSenderProfile,
    NestedSenderUser,
}

/// The identifiers the client knows about itself.
///
/// Either may be missing: the user id comes from login, the profile id only
/// exists once a profile has been created and loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalIdentity {
    pub user_id: Option<UserId>,
    pub profile_id: Option<ProfileId>,
}

impl LocalIdentity {
    pub fn new(user_id: Option<UserId>, profile_id: Option<ProfileId>) -> Self {
        Self {
            user_id,
            profile_id,
        }
    }

    /// Find the first rule attributing `sender` to this identity.
    pub fn matching_rule(&self, sender: &SenderRef) -> Option<OwnershipRule> {
        if same(sender.user_id, self.user_id) {
            return Some(OwnershipRule::SenderUserId);
        }
        if same(sender.profile_id, self.profile_id) {
            return Some(OwnershipRule::SenderProfileId);
        }
        match &sender.sender {
            Some(SenderField::Profile(profile_id)) if same(Some(*profile_id), self.profile_id) => {
                Some(OwnershipRule::BareSenderProfile)
            }
            Some(SenderField::Nested { user_id }) if same(*user_id, self.user_id) => {
                Some(OwnershipRule::NestedSenderUser)
            }
            _ => None,
        }
    }

    pub fn resolve(&self, sender: &SenderRef) -> Ownership {
        match self.matching_rule(sender) {
            Some(_) => Ownership::Mine,
            None => Ownership::Theirs,
        }
    }
}

// Two absent ids are not a match.
fn same<T: PartialEq>(theirs: Option<T>, ours: Option<T>) -> bool {
    matches!((theirs, ours), (Some(a), Some(b)) if a == b)
}
