//! Like Service - likes the caller received and gave.

use teammate_shared::LikeData;

use crate::application::{Api, ServiceError};

#[derive(Clone)]
pub struct LikeService {
    api: Api,
}

impl LikeService {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    pub async fn received(&self) -> Result<Vec<LikeData>, ServiceError> {
        Ok(self.api.get("/api/v1/likes/likes_received/").await?)
    }

    pub async fn given(&self) -> Result<Vec<LikeData>, ServiceError> {
        Ok(self.api.get("/api/v1/likes/likes_given/").await?)
    }
}
