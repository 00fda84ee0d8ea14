//! REST data transfer objects.
//!
//! These mirror the JSON the API returns. Fields the backend may omit for a
//! given endpoint (list vs. detail serializers) are defaulted rather than
//! required.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use teammate_domain::{
    Availability, DeveloperType, LikeId, MatchId, MessageId, ProfileId, SkillCategory, SkillId,
    TeammatePreference, UserId,
};

// =============================================================================
// Auth
// =============================================================================

/// The authenticated account (not the profile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUserData {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl AuthUserData {
    pub fn display_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

/// Response of the Google credential exchange.
///
/// A failed exchange comes back with `error` set and no tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleLoginResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUserData>,
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Error body returned by the API (`{"error": ...}` or `{"detail": ...}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.detail.as_deref().or(self.error.as_deref())
    }
}

// =============================================================================
// Skills
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillData {
    pub id: SkillId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_skill_category")]
    pub category: SkillCategory,
}

fn default_skill_category() -> SkillCategory {
    SkillCategory::Other
}

// =============================================================================
// Profiles
// =============================================================================

/// The short user block embedded in profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummaryData {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A profile as returned by detail, list, and suggestion endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub id: ProfileId,
    pub user: UserSummaryData,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub github_url: String,
    #[serde(default)]
    pub x_url: String,
    #[serde(default)]
    pub portfolio_url: String,
    #[serde(default)]
    pub developer_type: DeveloperType,
    #[serde(default)]
    pub teammate_preference: TeammatePreference,
    #[serde(default)]
    pub skills: Vec<SkillData>,
    #[serde(default)]
    pub looking_for: Vec<SkillData>,
    #[serde(default)]
    pub years_of_experience: u32,
    #[serde(default)]
    pub preferred_project_type: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub is_verified: bool,
    /// Only present on suggestions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility_score: Option<f64>,
}

impl ProfileData {
    pub fn display_name(&self) -> String {
        join_name(&self.user.first_name, &self.user.last_name)
    }

    pub fn skill_names(&self) -> Vec<&str> {
        self.skills.iter().map(|s| s.name.as_str()).collect()
    }
}

// =============================================================================
// Likes & Matches
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeData {
    pub id: LikeId,
    pub liker: ProfileId,
    pub liked: ProfileId,
    #[serde(default)]
    pub liker_profile: Option<ProfileData>,
    #[serde(default)]
    pub liked_profile: Option<ProfileData>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchData {
    pub id: MatchId,
    pub user1: ProfileId,
    pub user2: ProfileId,
    #[serde(default)]
    pub user1_profile: Option<ProfileData>,
    #[serde(default)]
    pub user2_profile: Option<ProfileData>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub compatibility_score: f64,
}

impl MatchData {
    /// The profile on the other side of the match, if it was embedded.
    pub fn other_profile(&self, me: ProfileId) -> Option<&ProfileData> {
        if self.user1 == me {
            self.user2_profile.as_ref()
        } else if self.user2 == me {
            self.user1_profile.as_ref()
        } else {
            None
        }
    }
}

/// Response of liking a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeOutcomeData {
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub is_new_match: bool,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<MatchData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlikeOutcomeData {
    #[serde(default)]
    pub unliked: bool,
}

// =============================================================================
// Chat messages
// =============================================================================

/// The `sender` field of a stored message.
///
/// Depending on the serializer this is either the author's profile id or an
/// embedded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SenderData {
    ProfileId(ProfileId),
    Nested(NestedSenderData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedSenderData {
    #[serde(default)]
    pub id: Option<ProfileId>,
    #[serde(default)]
    pub user: Option<SenderUserData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderUserData {
    pub id: UserId,
}

/// A stored chat message (history and create-message responses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageData {
    pub id: MessageId,
    #[serde(rename = "match", default)]
    pub match_id: Option<MatchId>,
    #[serde(default)]
    pub sender: Option<SenderData>,
    /// The author's *profile* id, unlike the socket frame's `sender_id`.
    #[serde(default)]
    pub sender_id: Option<ProfileId>,
    #[serde(default)]
    pub sender_profile_id: Option<ProfileId>,
    #[serde(default)]
    pub sender_name: Option<String>,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

// =============================================================================
// Helpers
// =============================================================================

/// Parse the timestamps the backend emits.
///
/// Stored records carry an offset; frames produced without a database row
/// carry a naive local timestamp, which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn join_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_record_with_bare_sender() {
        let record: ChatMessageData = serde_json::from_str(
            r#"{"id":5,"match":42,"sender":70,"sender_id":70,"sender_name":"Ada",
                "message":"hello","created_at":"2025-03-01T10:00:00Z","is_read":false}"#,
        )
        .unwrap();

        assert_eq!(record.sender, Some(SenderData::ProfileId(ProfileId::new(70))));
        assert_eq!(record.match_id, Some(MatchId::new(42)));
    }

    #[test]
    fn message_record_with_nested_sender() {
        let record: ChatMessageData = serde_json::from_str(
            r#"{"id":5,"sender":{"id":70,"user":{"id":7,"first_name":"Ada"}},"message":"hello"}"#,
        )
        .unwrap();

        let Some(SenderData::Nested(nested)) = record.sender else {
            panic!("expected nested sender");
        };
        assert_eq!(nested.user.map(|u| u.id), Some(UserId::new(7)));
    }

    #[test]
    fn profile_list_entries_fill_defaults() {
        let profile: ProfileData = serde_json::from_str(
            r#"{"id":3,"user":{"id":9,"first_name":"Grace","last_name":"Hopper"},
                "developer_type":"backend","skills":[{"id":1,"name":"Python"}],
                "compatibility_score":81.5}"#,
        )
        .unwrap();

        assert_eq!(profile.display_name(), "Grace Hopper");
        assert_eq!(profile.developer_type, DeveloperType::Backend);
        assert_eq!(profile.availability, Availability::Flexible);
        assert_eq!(profile.skill_names(), vec!["Python"]);
        assert_eq!(profile.compatibility_score, Some(81.5));
    }

    #[test]
    fn match_resolves_other_profile() {
        let m: MatchData = serde_json::from_str(
            r#"{"id":42,"user1":3,"user2":4,
                "user1_profile":{"id":3,"user":{"id":9}},
                "user2_profile":{"id":4,"user":{"id":10,"first_name":"Linus"}}}"#,
        )
        .unwrap();

        assert_eq!(
            m.other_profile(ProfileId::new(3)).map(|p| p.id),
            Some(ProfileId::new(4))
        );
        assert_eq!(
            m.other_profile(ProfileId::new(4)).map(|p| p.id),
            Some(ProfileId::new(3))
        );
        assert!(m.other_profile(ProfileId::new(99)).is_none());
    }

    #[test]
    fn like_outcome_reads_match_key() {
        let outcome: LikeOutcomeData = serde_json::from_str(
            r#"{"liked":true,"is_new_match":true,"match":{"id":1,"user1":3,"user2":4}}"#,
        )
        .unwrap();
        assert!(outcome.is_new_match);
        assert_eq!(outcome.matched.map(|m| m.id), Some(MatchId::new(1)));
    }

    #[test]
    fn failed_login_carries_error() {
        let response: GoogleLoginResponse =
            serde_json::from_str(r#"{"error":"Invalid token format"}"#).unwrap();
        assert!(response.access.is_none());
        assert_eq!(response.error.as_deref(), Some("Invalid token format"));
    }

    #[test]
    fn error_body_prefers_detail() {
        let body = ErrorBody {
            error: Some("short".into()),
            detail: Some("long".into()),
        };
        assert_eq!(body.message(), Some("long"));
    }

    #[test]
    fn parses_offset_and_naive_timestamps() {
        assert!(parse_timestamp("2025-03-01T10:00:00+00:00").is_some());
        assert!(parse_timestamp("2025-03-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
