//! Who is signed in, passed explicitly to services and commands.

use teammate_domain::LocalIdentity;
use teammate_shared::{AuthUserData, ProfileData};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    user: Option<AuthUserData>,
    profile: Option<ProfileData>,
}

impl SessionContext {
    pub fn new(user: AuthUserData) -> Self {
        Self {
            user: Some(user),
            profile: None,
        }
    }

    /// No one signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&AuthUserData> {
        self.user.as_ref()
    }

    pub fn profile(&self) -> Option<&ProfileData> {
        self.profile.as_ref()
    }

    pub fn set_profile(&mut self, profile: Option<ProfileData>) {
        self.profile = profile;
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn has_profile(&self) -> bool {
        self.profile.is_some()
    }

    /// The ids chat ownership is resolved against.
    pub fn identity(&self) -> LocalIdentity {
        LocalIdentity::new(
            self.user.as_ref().map(|u| u.id),
            self.profile.as_ref().map(|p| p.id),
        )
    }

    pub fn display_name(&self) -> Option<String> {
        self.user
            .as_ref()
            .map(AuthUserData::display_name)
            .filter(|name| !name.is_empty())
    }
}
