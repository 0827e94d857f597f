//! Form contracts checked before any request is sent.
//!
//! A failing check returns [`HueError::Validation`] and the caller never
//! reaches the network.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{HueError, Result};
use crate::model::{NewReview, ReviewUpdate};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_CHAT_MESSAGE_LENGTH: usize = 2_000;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

fn invalid(msg: impl Into<String>) -> HueError {
    HueError::Validation(msg.into())
}

pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(invalid("Email is required"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(invalid("Enter a valid email address"));
    }
    Ok(())
}

fn validate_rating(rating: u8) -> Result<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(invalid(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

fn validate_comment(comment: &str) -> Result<()> {
    if comment.trim().is_empty() {
        return Err(invalid("Review text cannot be empty"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(invalid("Email and password are required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("Name is required"));
        }
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(invalid("Password is required"));
        }
        if self.password != self.confirm_password {
            return Err(invalid("Passwords do not match"));
        }
        Ok(())
    }
}

/// Second step of the password reset: the new password and its confirmation.
#[derive(Debug, Clone, Default)]
pub struct NewPasswordForm {
    pub reset_token: String,
    pub password: String,
    pub confirm_password: String,
}

impl NewPasswordForm {
    pub fn validate(&self) -> Result<()> {
        if self.reset_token.trim().is_empty() {
            return Err(invalid("Reset token is required"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(invalid(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        if self.password != self.confirm_password {
            return Err(invalid("Passwords do not match"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrengthLevel {
    VeryWeak,
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl std::fmt::Display for StrengthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VeryWeak => write!(f, "very weak"),
            Self::Weak => write!(f, "weak"),
            Self::Medium => write!(f, "medium"),
            Self::Strong => write!(f, "strong"),
            Self::VeryStrong => write!(f, "very strong"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    /// 0 to 4.
    pub score: u8,
    pub level: StrengthLevel,
    pub suggestions: Vec<String>,
}

/// Score a password on four criteria: length, mixed case, digits, symbols.
pub fn password_strength(password: &str) -> PasswordStrength {
    let mut score = 0u8;
    let mut suggestions = Vec::new();

    if password.chars().count() >= MIN_PASSWORD_LENGTH {
        score += 1;
    } else {
        suggestions.push(format!("Use at least {MIN_PASSWORD_LENGTH} characters"));
    }
    if password.chars().any(char::is_lowercase) && password.chars().any(char::is_uppercase) {
        score += 1;
    } else {
        suggestions.push("Mix upper and lower case letters".to_string());
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    } else {
        suggestions.push("Add a number".to_string());
    }
    if password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        score += 1;
    } else {
        suggestions.push("Add a symbol".to_string());
    }

    let level = match score {
        0 => StrengthLevel::VeryWeak,
        1 => StrengthLevel::Weak,
        2 => StrengthLevel::Medium,
        3 => StrengthLevel::Strong,
        _ => StrengthLevel::VeryStrong,
    };

    PasswordStrength {
        score,
        level,
        suggestions,
    }
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ReviewForm {
    pub restaurant_id: String,
    pub rating: u8,
    pub comment: String,
    /// Base64 data URL, already encoded.
    pub image: Option<String>,
}

impl ReviewForm {
    /// Empty form for a restaurant; rating starts at five stars.
    pub fn new(restaurant_id: impl Into<String>) -> Self {
        Self {
            restaurant_id: restaurant_id.into(),
            rating: MAX_RATING,
            comment: String::new(),
            image: None,
        }
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.restaurant_id.trim().is_empty() {
            return Err(invalid("Please select a restaurant"));
        }
        validate_rating(self.rating)?;
        validate_comment(&self.comment)
    }

    /// Validate and produce the request body.
    pub fn to_request(&self) -> Result<NewReview> {
        self.validate()?;
        Ok(NewReview {
            restaurant_id: self.restaurant_id.trim().to_string(),
            rating: self.rating,
            comment: self.comment.clone(),
            image: self.image.clone(),
        })
    }
}

/// What to do with the photo of a review being edited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhotoEdit {
    #[default]
    Keep,
    Replace(String),
    Remove,
}

#[derive(Debug, Clone)]
pub struct EditReviewForm {
    pub rating: u8,
    pub comment: String,
    pub photo: PhotoEdit,
}

impl EditReviewForm {
    pub fn validate(&self) -> Result<()> {
        validate_rating(self.rating)?;
        validate_comment(&self.comment)
    }

    /// Validate and produce the request body, resolving the photo against
    /// the review's current image.
    pub fn to_request(&self, current_image: Option<&str>) -> Result<ReviewUpdate> {
        self.validate()?;
        let image = match &self.photo {
            PhotoEdit::Keep => current_image.map(str::to_string),
            PhotoEdit::Replace(data) => Some(data.clone()),
            PhotoEdit::Remove => None,
        };
        Ok(ReviewUpdate {
            rating: self.rating,
            comment: self.comment.clone(),
            image,
        })
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Trimmed message text, or a validation error for blank/oversized input.
pub fn validate_chat_message(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(invalid("Message cannot be empty"));
    }
    if trimmed.chars().count() > MAX_CHAT_MESSAGE_LENGTH {
        return Err(invalid(format!(
            "Message exceeds maximum length of {MAX_CHAT_MESSAGE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}
