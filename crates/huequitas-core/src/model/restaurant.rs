use serde::{Deserialize, Serialize};

use crate::error::{HueError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    /// Also used as the search category.
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub total_ratings: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Restaurant {
    /// Rating for display, `0.0` when the server has none.
    pub fn display_rating(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }
}

/// Payload for `POST /api/restaurants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRestaurant {
    pub name: String,
    pub description: String,
    pub address: String,
    pub cuisine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl NewRestaurant {
    pub fn new(name: impl Into<String>, cuisine: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            address: String::new(),
            cuisine: cuisine.into(),
            image: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Only the name is required before sending; the server owns the rest.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HueError::Validation(
                "restaurant name cannot be empty".into(),
            ));
        }
        Ok(())
    }
}
