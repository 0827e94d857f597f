use std::sync::Arc;

use serde::Serialize;

use super::ReviewApi;
use crate::credentials::CredentialStore;
use crate::error::{HueError, Result};
use crate::gateway::Gateway;
use crate::model::*;
use crate::search::{self, CategoryFilter};

/// Remote HTTP API implementation.
///
/// Every call goes through the [`Gateway`], which attaches the bearer token.
/// Operations that need a session are sent regardless; the server decides.
pub struct HttpApi {
    gateway: Gateway,
}

impl HttpApi {
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        Ok(Self {
            gateway: Gateway::new(base_url, credentials)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.gateway.base_url()
    }
}

// -- Request bodies --

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ResetRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest<'a> {
    reset_token: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LikeRequest<'a> {
    restaurant_id: &'a str,
}

impl ReviewApi for HttpApi {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.gateway
            .post(&["auth", "login"], &LoginRequest { email, password })
            .await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse> {
        self.gateway
            .post(
                &["auth", "register"],
                &RegisterRequest {
                    name,
                    email,
                    password,
                },
            )
            .await
    }

    async fn request_password_reset(&self, email: &str) -> Result<ResetTicket> {
        self.gateway
            .post(&["auth", "password-reset-request"], &ResetRequest { email })
            .await
    }

    async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<Ack> {
        let ack: Option<Ack> = self
            .gateway
            .post(
                &["auth", "password-reset"],
                &ResetPasswordRequest {
                    reset_token,
                    new_password,
                },
            )
            .await?;
        Ok(ack.unwrap_or_default())
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>> {
        self.gateway.get(&["api", "restaurants"]).await
    }

    async fn search_restaurants(
        &self,
        query: &str,
        category: &CategoryFilter,
    ) -> Result<Vec<Restaurant>> {
        // No search endpoint; filter the full list locally.
        let all = self.list_restaurants().await?;
        Ok(search::filter_restaurants(&all, query, category))
    }

    async fn top_rated(&self) -> Result<Vec<Restaurant>> {
        let all = self.list_restaurants().await?;
        Ok(search::sort_top_rated(all))
    }

    async fn get_restaurant(&self, id: &str) -> Result<Restaurant> {
        self.gateway
            .get(&["api", "restaurants", id])
            .await
    }

    async fn create_restaurant(&self, data: &NewRestaurant) -> Result<Restaurant> {
        self.gateway.post(&["api", "restaurants"], data).await
    }

    async fn delete_restaurant(&self, id: &str) -> Result<Ack> {
        let ack: Option<Ack> = self
            .gateway
            .delete(&["api", "restaurants", id])
            .await?;
        Ok(ack.unwrap_or_default())
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review> {
        self.gateway.post(&["api", "reviews"], review).await
    }

    async fn list_reviews(&self, restaurant_id: &str) -> Result<Vec<Review>> {
        self.gateway
            .get(&["api", "reviews", restaurant_id])
            .await
    }

    async fn update_review(&self, id: &str, update: &ReviewUpdate) -> Result<Review> {
        self.gateway
            .put(&["api", "reviews", id], update)
            .await
    }

    async fn toggle_like(&self, restaurant_id: &str) -> Result<LikeStatus> {
        self.gateway
            .post(&["api", "like"], &LikeRequest { restaurant_id })
            .await
    }

    async fn like_status(&self, restaurant_id: &str) -> Result<LikeStatus> {
        self.gateway
            .get(&["api", "likes", restaurant_id])
            .await
    }

    async fn chat_history(&self, room: &str) -> Result<Vec<ChatMessage>> {
        self.gateway
            .get_with_query(&["chat", "messages"], &[("room", room)])
            .await
    }

    async fn send_message(&self, _room: &str, _text: &str) -> Result<ChatMessage> {
        Err(HueError::Unsupported(
            "sending chat messages is not available on the remote API".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_password_body_shape() {
        let body = serde_json::to_value(ResetPasswordRequest {
            reset_token: "rt",
            new_password: "Sancocho#2024",
        })
        .unwrap();
        assert_eq!(body["resetToken"], "rt");
        assert_eq!(body["newPassword"], "Sancocho#2024");
    }

    #[tokio::test]
    async fn test_send_message_unsupported() {
        let api = HttpApi::new(
            "http://localhost:8000",
            Arc::new(crate::credentials::MemoryCredentialStore::new()),
        )
        .unwrap();
        let err = api.send_message("general", "hola").await.unwrap_err();
        assert!(matches!(err, HueError::Unsupported(_)));
    }
}
