mod backend;
mod fixtures;
mod http;
mod mock;

pub use backend::ReviewApi;
pub use http::HttpApi;
pub use mock::MockApi;

use std::sync::Arc;

use crate::config::HueConfig;
use crate::credentials::CredentialStore;
use crate::error::Result;
use crate::model::*;
use crate::search::CategoryFilter;

/// Concrete backend selected by `[backend] kind`.
pub enum Api {
    Http(HttpApi),
    Mock(MockApi),
}

impl Api {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Mock(_) => "mock",
        }
    }
}

/// Build the backend named in config. The HTTP backend reads its bearer token
/// from `credentials` on every request.
pub fn create_backend(config: &HueConfig, credentials: Arc<dyn CredentialStore>) -> Result<Api> {
    if config.is_mock() {
        tracing::debug!(latency = config.mock.latency, "using mock backend");
        Ok(Api::Mock(MockApi::new(config.mock.latency)))
    } else {
        tracing::debug!(base_url = %config.api.base_url, "using http backend");
        Ok(Api::Http(HttpApi::new(&config.api.base_url, credentials)?))
    }
}

impl ReviewApi for Api {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        match self {
            Api::Http(api) => api.login(email, password).await,
            Api::Mock(api) => api.login(email, password).await,
        }
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse> {
        match self {
            Api::Http(api) => api.register(name, email, password).await,
            Api::Mock(api) => api.register(name, email, password).await,
        }
    }

    async fn request_password_reset(&self, email: &str) -> Result<ResetTicket> {
        match self {
            Api::Http(api) => api.request_password_reset(email).await,
            Api::Mock(api) => api.request_password_reset(email).await,
        }
    }

    async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<Ack> {
        match self {
            Api::Http(api) => api.reset_password(reset_token, new_password).await,
            Api::Mock(api) => api.reset_password(reset_token, new_password).await,
        }
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>> {
        match self {
            Api::Http(api) => api.list_restaurants().await,
            Api::Mock(api) => api.list_restaurants().await,
        }
    }

    async fn search_restaurants(
        &self,
        query: &str,
        category: &CategoryFilter,
    ) -> Result<Vec<Restaurant>> {
        match self {
            Api::Http(api) => api.search_restaurants(query, category).await,
            Api::Mock(api) => api.search_restaurants(query, category).await,
        }
    }

    async fn top_rated(&self) -> Result<Vec<Restaurant>> {
        match self {
            Api::Http(api) => api.top_rated().await,
            Api::Mock(api) => api.top_rated().await,
        }
    }

    async fn get_restaurant(&self, id: &str) -> Result<Restaurant> {
        match self {
            Api::Http(api) => api.get_restaurant(id).await,
            Api::Mock(api) => api.get_restaurant(id).await,
        }
    }

    async fn create_restaurant(&self, data: &NewRestaurant) -> Result<Restaurant> {
        match self {
            Api::Http(api) => api.create_restaurant(data).await,
            Api::Mock(api) => api.create_restaurant(data).await,
        }
    }

    async fn delete_restaurant(&self, id: &str) -> Result<Ack> {
        match self {
            Api::Http(api) => api.delete_restaurant(id).await,
            Api::Mock(api) => api.delete_restaurant(id).await,
        }
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review> {
        match self {
            Api::Http(api) => api.create_review(review).await,
            Api::Mock(api) => api.create_review(review).await,
        }
    }

    async fn list_reviews(&self, restaurant_id: &str) -> Result<Vec<Review>> {
        match self {
            Api::Http(api) => api.list_reviews(restaurant_id).await,
            Api::Mock(api) => api.list_reviews(restaurant_id).await,
        }
    }

    async fn update_review(&self, id: &str, update: &ReviewUpdate) -> Result<Review> {
        match self {
            Api::Http(api) => api.update_review(id, update).await,
            Api::Mock(api) => api.update_review(id, update).await,
        }
    }

    async fn toggle_like(&self, restaurant_id: &str) -> Result<LikeStatus> {
        match self {
            Api::Http(api) => api.toggle_like(restaurant_id).await,
            Api::Mock(api) => api.toggle_like(restaurant_id).await,
        }
    }

    async fn like_status(&self, restaurant_id: &str) -> Result<LikeStatus> {
        match self {
            Api::Http(api) => api.like_status(restaurant_id).await,
            Api::Mock(api) => api.like_status(restaurant_id).await,
        }
    }

    async fn chat_history(&self, room: &str) -> Result<Vec<ChatMessage>> {
        match self {
            Api::Http(api) => api.chat_history(room).await,
            Api::Mock(api) => api.chat_history(room).await,
        }
    }

    async fn send_message(&self, room: &str, text: &str) -> Result<ChatMessage> {
        match self {
            Api::Http(api) => api.send_message(room, text).await,
            Api::Mock(api) => api.send_message(room, text).await,
        }
    }
}
