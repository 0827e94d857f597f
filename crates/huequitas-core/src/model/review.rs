use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "_id")]
    pub id: String,
    pub restaurant_id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    /// Base64 data URL.
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /api/reviews`. Sent as given: the rating is not clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub restaurant_id: String,
    pub rating: u8,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Payload for `PUT /api/reviews/{id}`.
///
/// `image: None` serializes as an explicit `null`, which removes the photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub rating: u8,
    pub comment: String,
    pub image: Option<String>,
}

/// Body of `POST /api/like` and `GET /api/likes/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeStatus {
    pub liked: bool,
    #[serde(default)]
    pub message: Option<String>,
}
