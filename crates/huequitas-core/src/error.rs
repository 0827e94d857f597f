use thiserror::Error;

/// Fallback shown when the server rejects a request without saying why.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum HueError {
    /// Rejected before any request was sent.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API error {status}: {}", .message.as_deref().unwrap_or(GENERIC_FAILURE))]
    Api { status: u16, message: Option<String> },

    /// A 2xx body that does not match the expected schema.
    #[error("Failed to decode {endpoint} response: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not read image: {0}")]
    ImageRead(String),

    #[error("Not supported: {0}")]
    Unsupported(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl HueError {
    /// Text a view should show for this failure.
    ///
    /// Server-provided messages pass through verbatim; transport failures and
    /// bare rejections collapse to a generic string.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Api {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            Self::Api { .. } | Self::Transport(_) | Self::Decode { .. } => {
                GENERIC_FAILURE.to_string()
            }
            other => other.to_string(),
        }
    }

    /// `true` when the failure was caught locally and nothing was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// HTTP status of a remote rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// `true` for 401/403 rejections, i.e. the stored token is missing or stale.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

pub type Result<T> = std::result::Result<T, HueError>;
