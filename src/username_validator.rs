// src/username_validator.rs
use thiserror::Error;
use tracing::warn;

pub const MAX_USERNAME_LENGTH: usize = 39;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameRejection {
    #[error("GitHub username is required")]
    Empty,

    #[error("'{0}' is not a valid GitHub username")]
    InvalidFormat(String),
}

impl UsernameRejection {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "USERNAME_EMPTY",
            Self::InvalidFormat(_) => "USERNAME_INVALID",
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Empty => vec!["Enter your GitHub username".to_string()],
            Self::InvalidFormat(_) => vec![
                "Use letters, digits and single hyphens only".to_string(),
                "Usernames cannot start or end with a hyphen".to_string(),
                format!("Keep it to {} characters or fewer", MAX_USERNAME_LENGTH),
            ],
        }
    }
}

pub struct UsernameValidator;

impl UsernameValidator {
    /// Validate a GitHub handle, returning it normalized.
    ///
    /// A pasted profile URL such as `https://github.com/octocat/` is reduced
    /// to its handle before the grammar check.
    pub fn validate(input: &str) -> Result<String, UsernameRejection> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(UsernameRejection::Empty);
        }

        let handle = strip_profile_url(trimmed);
        if !is_valid_handle(handle) {
            warn!(input = %trimmed, "username rejected: invalid format");
            return Err(UsernameRejection::InvalidFormat(handle.to_string()));
        }

        Ok(handle.to_string())
    }
}

fn strip_profile_url(input: &str) -> &str {
    if input.contains("github.com") {
        input.trim_end_matches('/').rsplit('/').next().unwrap_or(input)
    } else {
        input
    }
}

fn is_valid_handle(handle: &str) -> bool {
    if handle.is_empty() || handle.len() > MAX_USERNAME_LENGTH {
        return false;
    }

    if handle.starts_with('-') || handle.ends_with('-') || handle.contains("--") {
        return false;
    }

    handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
