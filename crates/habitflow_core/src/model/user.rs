//! User profile entity and sign-up input rules.

use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Auth-provider uid; also the profile document id.
pub type UserId = String;

pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MIN_DISPLAY_NAME_CHARS: usize = 2;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: UserId,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub photo_url: String,
    pub created_at: i64,
}

/// Profile fields written when a user first signs up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserProfile {
    pub uid: UserId,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
}

impl NewUserProfile {
    /// Builds a profile with trimmed display name and empty-string defaults.
    pub fn new(
        uid: impl Into<UserId>,
        email: Option<&str>,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Self {
        Self {
            uid: uid.into(),
            email: email.unwrap_or_default().to_string(),
            display_name: display_name.trim().to_string(),
            photo_url: photo_url.unwrap_or_default().to_string(),
        }
    }
}

/// Validates sign-up form input before contacting the auth provider.
pub fn validate_signup_input(
    email: &str,
    password: &str,
    display_name: &str,
) -> Result<(), ValidationError> {
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_CHARS,
        });
    }
    if display_name.trim().chars().count() < MIN_DISPLAY_NAME_CHARS {
        return Err(ValidationError::DisplayNameTooShort {
            min: MIN_DISPLAY_NAME_CHARS,
        });
    }
    Ok(())
}
