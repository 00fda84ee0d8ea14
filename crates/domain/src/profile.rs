//! Profile vocabulary and the profile form.
//!
//! The choice enums mirror the backend's fixed option lists. Values the
//! client does not know fall back to a catch-all variant instead of failing
//! the whole payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::SkillId;
use crate::DomainError;

macro_rules! define_choice {
    ($name:ident, fallback = $fallback:ident, { $($variant:ident => ($wire:literal, $label:literal)),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            /// Human-readable label.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(DomainError::unknown_choice(stringify!($name), other)),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                value.parse().unwrap_or($name::$fallback)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

define_choice!(DeveloperType, fallback = Other, {
    Frontend => ("frontend", "Frontend Developer"),
    Backend => ("backend", "Backend Developer"),
    Fullstack => ("fullstack", "Full Stack Developer"),
    Devops => ("devops", "DevOps Engineer"),
    Mobile => ("mobile", "Mobile Developer"),
    Data => ("data", "Data Scientist"),
    Ml => ("ml", "ML Engineer"),
    Other => ("other", "Other"),
});

define_choice!(TeammatePreference, fallback = Any, {
    Frontend => ("frontend", "Frontend Developer"),
    Backend => ("backend", "Backend Developer"),
    Fullstack => ("fullstack", "Full Stack Developer"),
    Devops => ("devops", "DevOps Engineer"),
    Mobile => ("mobile", "Mobile Developer"),
    Data => ("data", "Data Scientist"),
    Ml => ("ml", "ML Engineer"),
    Other => ("other", "Other"),
    Any => ("any", "Any Developer"),
});

define_choice!(Availability, fallback = Flexible, {
    PartTime => ("part-time", "Part-time"),
    FullTime => ("full-time", "Full-time"),
    Weekends => ("weekends", "Weekends only"),
    Flexible => ("flexible", "Flexible"),
});

define_choice!(SkillCategory, fallback = Other, {
    Frontend => ("frontend", "Frontend"),
    Backend => ("backend", "Backend"),
    Devops => ("devops", "DevOps"),
    Mobile => ("mobile", "Mobile"),
    Database => ("database", "Database"),
    Other => ("other", "Other"),
});

impl Default for DeveloperType {
    fn default() -> Self {
        DeveloperType::Fullstack
    }
}

impl Default for TeammatePreference {
    fn default() -> Self {
        TeammatePreference::Any
    }
}

impl Default for Availability {
    fn default() -> Self {
        Availability::Flexible
    }
}

pub const MIN_AGE: u32 = 13;
pub const MAX_AGE: u32 = 120;

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All problems found in a [`ProfileForm`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileFormErrors(pub Vec<FieldError>);

impl ProfileFormErrors {
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProfileFormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl From<ProfileFormErrors> for DomainError {
    fn from(errors: ProfileFormErrors) -> Self {
        DomainError::InvalidProfile(errors.to_string())
    }
}

/// Editable profile fields, as collected by the profile wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub age: Option<u32>,
    pub bio: String,
    pub github_url: String,
    pub x_url: String,
    pub portfolio_url: String,
    pub developer_type: DeveloperType,
    pub teammate_preference: TeammatePreference,
    pub skill_ids: Vec<SkillId>,
    pub looking_for_ids: Vec<SkillId>,
    pub years_of_experience: u32,
    pub preferred_project_type: String,
    pub availability: Availability,
}

impl ProfileForm {
    /// Check every field and report all failures at once.
    pub fn validate(&self) -> Result<(), ProfileFormErrors> {
        let mut errors = Vec::new();

        match self.age {
            None => errors.push(FieldError {
                field: "age",
                message: "Age is required".into(),
            }),
            Some(age) if !(MIN_AGE..=MAX_AGE).contains(&age) => errors.push(FieldError {
                field: "age",
                message: format!("Age must be between {} and {}", MIN_AGE, MAX_AGE),
            }),
            Some(_) => {}
        }

        if self.skill_ids.is_empty() {
            errors.push(FieldError {
                field: "skills",
                message: "Select at least one skill".into(),
            });
        }

        for (field, value) in [
            ("github_url", &self.github_url),
            ("x_url", &self.x_url),
            ("portfolio_url", &self.portfolio_url),
        ] {
            if !value.trim().is_empty() && !is_web_url(value.trim()) {
                errors.push(FieldError {
                    field,
                    message: "Must be an http(s) URL".into(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProfileFormErrors(errors))
        }
    }
}

fn is_web_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}
