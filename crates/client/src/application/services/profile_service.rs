//! Profile Service - own profile, other profiles, suggestions, and likes.

use serde_json::Value;

use teammate_domain::{ProfileForm, ProfileId};
use teammate_shared::{LikeOutcomeData, ProfileData, ProfileUpsertRequest, UnlikeOutcomeData};

use crate::application::{Api, ServiceError, SessionContext};
use crate::ports::outbound::ApiError;

pub(crate) const MY_PROFILE_PATH: &str = "/api/v1/profiles/me/";
const CREATE_PROFILE_PATH: &str = "/api/v1/profiles/create_profile/";

#[derive(Clone)]
pub struct ProfileService {
    api: Api,
}

impl ProfileService {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    /// The caller's own profile; `None` until one has been created.
    pub async fn my_profile(&self) -> Result<Option<ProfileData>, ServiceError> {
        Ok(self.api.get_optional(MY_PROFILE_PATH).await?)
    }

    pub async fn get(&self, id: ProfileId) -> Result<ProfileData, ServiceError> {
        Ok(self.api.get(&format!("/api/v1/profiles/{id}/")).await?)
    }

    /// Candidates ranked by compatibility.
    pub async fn suggestions(&self) -> Result<Vec<ProfileData>, ServiceError> {
        Ok(self.api.get("/api/v1/profiles/suggestions/").await?)
    }

    pub async fn like(&self, id: ProfileId) -> Result<LikeOutcomeData, ServiceError> {
        Ok(self
            .api
            .post_empty(&format!("/api/v1/profiles/{id}/like/"))
            .await?)
    }

    pub async fn unlike(&self, id: ProfileId) -> Result<UnlikeOutcomeData, ServiceError> {
        Ok(self
            .api
            .post_empty(&format!("/api/v1/profiles/{id}/unlike/"))
            .await?)
    }

    /// Validate, create or update the own profile, then reload it into `ctx`.
    ///
    /// Nothing is sent when validation fails.
    pub async fn save_profile(
        &self,
        ctx: &mut SessionContext,
        form: &ProfileForm,
    ) -> Result<ProfileData, ServiceError> {
        if !ctx.is_authenticated() {
            return Err(ServiceError::NotAuthenticated);
        }
        form.validate()?;

        let body = ProfileUpsertRequest::from(form);
        let _: Value = self.api.post(CREATE_PROFILE_PATH, &body).await?;

        let profile = self.my_profile().await?.ok_or(ApiError::NotFound)?;
        tracing::info!(profile_id = %profile.id, "Profile saved");
        ctx.set_profile(Some(profile.clone()));
        Ok(profile)
    }
}

/// Pre-fill a form from an existing profile.
pub fn form_from_profile(profile: &ProfileData) -> ProfileForm {
    ProfileForm {
        age: profile.age,
        bio: profile.bio.clone(),
        github_url: profile.github_url.clone(),
        x_url: profile.x_url.clone(),
        portfolio_url: profile.portfolio_url.clone(),
        developer_type: profile.developer_type,
        teammate_preference: profile.teammate_preference,
        skill_ids: profile.skills.iter().map(|s| s.id).collect(),
        looking_for_ids: profile.looking_for.iter().map(|s| s.id).collect(),
        years_of_experience: profile.years_of_experience,
        preferred_project_type: profile.preferred_project_type.clone(),
        availability: profile.availability,
    }
}
