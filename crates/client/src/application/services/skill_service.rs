//! Skill Service - the skill catalogue used by the profile form.

use teammate_domain::SkillCategory;
use teammate_shared::SkillData;

use crate::application::{Api, ServiceError};

/// Offered when the skills endpoint cannot be reached.
pub const FALLBACK_SKILLS: &[&str] = &[
    "AWS",
    "Angular",
    "Django",
    "Docker",
    "FastAPI",
    "Git",
    "GraphQL",
    "Kotlin",
    "Kubernetes",
    "MongoDB",
    "Node.js",
    "PostgreSQL",
    "Python",
    "React",
    "React Native",
    "Redis",
    "Swift",
    "Tailwind CSS",
    "TypeScript",
    "Vue.js",
];

/// Where a catalogue came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillCatalogue {
    Remote(Vec<SkillData>),
    /// Names only; these have no ids and cannot be saved on a profile.
    Fallback(&'static [&'static str]),
}

impl SkillCatalogue {
    pub fn names(&self) -> Vec<&str> {
        match self {
            SkillCatalogue::Remote(skills) => skills.iter().map(|s| s.name.as_str()).collect(),
            SkillCatalogue::Fallback(names) => names.to_vec(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SkillCatalogue::Fallback(_))
    }
}

#[derive(Clone)]
pub struct SkillService {
    api: Api,
}

impl SkillService {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    pub async fn all(&self) -> Result<Vec<SkillData>, ServiceError> {
        Ok(self.api.get("/api/v1/skills/").await?)
    }

    pub async fn by_category(
        &self,
        category: SkillCategory,
    ) -> Result<Vec<SkillData>, ServiceError> {
        let path = format!("/api/v1/skills/by_category/?category={}", category.as_str());
        Ok(self.api.get(&path).await?)
    }

    /// The API list, or the built-in list when the API call fails.
    pub async fn catalogue(&self) -> SkillCatalogue {
        match self.all().await {
            Ok(skills) => SkillCatalogue::Remote(skills),
            Err(e) => {
                tracing::warn!("Failed to load skills, using built-in list: {}", e);
                SkillCatalogue::Fallback(FALLBACK_SKILLS)
            }
        }
    }
}
