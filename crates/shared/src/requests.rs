//! REST request bodies.

use serde::{Deserialize, Serialize};

use teammate_domain::{
    Availability, DeveloperType, MatchId, ProfileForm, SkillId, TeammatePreference,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

/// Fallback path for sending a chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(rename = "match")]
    pub match_id: MatchId,
    pub message: String,
}

impl CreateMessageRequest {
    pub fn new(match_id: MatchId, text: impl Into<String>) -> Self {
        Self {
            match_id,
            message: text.into(),
        }
    }
}

/// Create-or-update body for the caller's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpsertRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub bio: String,
    pub github_url: String,
    pub x_url: String,
    pub portfolio_url: String,
    pub developer_type: DeveloperType,
    pub teammate_preference: TeammatePreference,
    pub skills_ids: Vec<SkillId>,
    pub looking_for_ids: Vec<SkillId>,
    pub years_of_experience: u32,
    pub preferred_project_type: String,
    pub availability: Availability,
}

impl From<&ProfileForm> for ProfileUpsertRequest {
    fn from(form: &ProfileForm) -> Self {
        Self {
            age: form.age,
            bio: form.bio.trim().to_string(),
            github_url: form.github_url.trim().to_string(),
            x_url: form.x_url.trim().to_string(),
            portfolio_url: form.portfolio_url.trim().to_string(),
            developer_type: form.developer_type,
            teammate_preference: form.teammate_preference,
            skills_ids: form.skill_ids.clone(),
            looking_for_ids: form.looking_for_ids.clone(),
            years_of_experience: form.years_of_experience,
            preferred_project_type: form.preferred_project_type.trim().to_string(),
            availability: form.availability,
        }
    }
}
