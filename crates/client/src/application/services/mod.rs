//! Application services over the typed `Api`.

use std::sync::Arc;

use crate::application::Api;
use crate::ports::outbound::{RawApiPort, StorageProvider};

pub mod auth_service;
pub mod chat_service;
pub mod like_service;
pub mod match_service;
pub mod profile_service;
pub mod skill_service;

pub use auth_service::{AuthService, LoginOutcome};
pub use chat_service::ChatService;
pub use like_service::LikeService;
pub use match_service::MatchService;
pub use profile_service::{form_from_profile, ProfileService};
pub use skill_service::{SkillCatalogue, SkillService, FALLBACK_SKILLS};

/// Every service, sharing one API adapter and one storage.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub profiles: ProfileService,
    pub skills: SkillService,
    pub likes: LikeService,
    pub matches: MatchService,
    pub chat: ChatService,
}

impl Services {
    pub fn new(raw: Arc<dyn RawApiPort>, storage: Arc<dyn StorageProvider>) -> Self {
        let api = Api::new(raw);
        Self {
            auth: AuthService::new(api.clone(), storage),
            profiles: ProfileService::new(api.clone()),
            skills: SkillService::new(api.clone()),
            likes: LikeService::new(api.clone()),
            matches: MatchService::new(api.clone()),
            chat: ChatService::new(api),
        }
    }
}
