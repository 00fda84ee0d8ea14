//! Match Service - mutual likes and the profile on the other side.

use teammate_domain::MatchId;
use teammate_shared::{MatchData, ProfileData};

use crate::application::{Api, ServiceError};

#[derive(Clone)]
pub struct MatchService {
    api: Api,
}

impl MatchService {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<MatchData>, ServiceError> {
        Ok(self.api.get("/api/v1/matches/").await?)
    }

    pub async fn other_user(&self, match_id: MatchId) -> Result<ProfileData, ServiceError> {
        Ok(self
            .api
            .get(&format!("/api/v1/matches/{match_id}/other_user/"))
            .await?)
    }
}
