use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;

use super::{fixtures, ReviewApi};
use crate::error::{HueError, Result};
use crate::model::*;
use crate::search::{self, CategoryFilter};

// Simulated round-trip times, in milliseconds.
const LOGIN_MS: u64 = 800;
const SIGNUP_MS: u64 = 1000;
const LIST_MS: u64 = 600;
const SEARCH_MS: u64 = 400;
const TOP_RATED_MS: u64 = 500;
const CREATE_REVIEW_MS: u64 = 700;
const CHAT_MS: u64 = 500;
const SEND_MS: u64 = 300;
const DEFAULT_MS: u64 = 300;

const MIN_MOCK_PASSWORD: usize = 6;

#[derive(Default)]
struct MockState {
    restaurants: Vec<Restaurant>,
    users: Vec<User>,
    reviews: Vec<Review>,
    likes: HashSet<String>,
    messages: HashMap<String, Vec<ChatMessage>>,
    reset_tokens: HashSet<String>,
}

/// In-memory backend seeded from fixtures.
///
/// Any non-empty email with a password of six or more characters signs in.
/// New reviews, likes and chat messages are attributed to the first fixture
/// user and are lost when the value is dropped.
pub struct MockApi {
    state: Mutex<MockState>,
    latency: bool,
}

impl MockApi {
    pub fn new(latency: bool) -> Self {
        let mut messages = HashMap::new();
        messages.insert(DEFAULT_ROOM.to_string(), fixtures::chat_messages());
        Self {
            state: Mutex::new(MockState {
                restaurants: fixtures::restaurants(),
                users: fixtures::users(),
                messages,
                ..Default::default()
            }),
            latency,
        }
    }

    /// No simulated delays. Used by tests and scripted runs.
    pub fn without_latency() -> Self {
        Self::new(false)
    }

    async fn delay(&self, ms: u64) {
        if self.latency {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|e| HueError::Storage(format!("failed to acquire mock state lock: {e}")))
    }

    fn token() -> String {
        format!("mock-jwt-token-{}", Utc::now().timestamp_millis())
    }

    fn author(state: &MockState) -> Result<User> {
        state
            .users
            .first()
            .cloned()
            .ok_or_else(|| HueError::NotFound("mock user".into()))
    }

    fn require_restaurant(state: &MockState, id: &str) -> Result<()> {
        if state.restaurants.iter().any(|r| r.id == id) {
            Ok(())
        } else {
            Err(HueError::NotFound(format!("restaurant {id}")))
        }
    }
}

fn rejected(status: u16, message: &str) -> HueError {
    HueError::Api {
        status,
        message: Some(message.to_string()),
    }
}

impl ReviewApi for MockApi {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.delay(LOGIN_MS).await;
        if email.trim().is_empty() || password.chars().count() < MIN_MOCK_PASSWORD {
            return Err(rejected(401, "Invalid credentials"));
        }
        let user = Self::author(&*self.state()?)?;
        tracing::debug!(user = %user.id, "mock login");
        Ok(AuthResponse {
            message: Some("Login successful".into()),
            token: Self::token(),
            user,
        })
    }

    async fn register(&self, name: &str, email: &str, _password: &str) -> Result<AuthResponse> {
        self.delay(SIGNUP_MS).await;
        let user = User {
            id: uuid::Uuid::now_v7().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        };
        self.state()?.users.push(user.clone());
        Ok(AuthResponse {
            message: Some("User registered successfully".into()),
            token: Self::token(),
            user,
        })
    }

    async fn request_password_reset(&self, email: &str) -> Result<ResetTicket> {
        self.delay(DEFAULT_MS).await;
        if email.trim().is_empty() {
            return Err(rejected(400, "Email is required"));
        }
        let reset_token = uuid::Uuid::now_v7().simple().to_string();
        self.state()?.reset_tokens.insert(reset_token.clone());
        Ok(ResetTicket {
            reset_token,
            message: Some("Password reset token generated".into()),
        })
    }

    async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<Ack> {
        self.delay(DEFAULT_MS).await;
        if new_password.chars().count() < MIN_MOCK_PASSWORD {
            return Err(rejected(400, "Password is too short"));
        }
        if !self.state()?.reset_tokens.remove(reset_token) {
            return Err(rejected(400, "Invalid or expired reset token"));
        }
        Ok(Ack {
            message: Some("Password has been reset".into()),
        })
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>> {
        self.delay(LIST_MS).await;
        Ok(self.state()?.restaurants.clone())
    }

    async fn search_restaurants(
        &self,
        query: &str,
        category: &CategoryFilter,
    ) -> Result<Vec<Restaurant>> {
        self.delay(SEARCH_MS).await;
        let state = self.state()?;
        Ok(search::filter_restaurants(&state.restaurants, query, category))
    }

    async fn top_rated(&self) -> Result<Vec<Restaurant>> {
        self.delay(TOP_RATED_MS).await;
        let all = self.state()?.restaurants.clone();
        Ok(search::sort_top_rated(all))
    }

    async fn get_restaurant(&self, id: &str) -> Result<Restaurant> {
        self.delay(DEFAULT_MS).await;
        self.state()?
            .restaurants
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| HueError::NotFound(format!("restaurant {id}")))
    }

    async fn create_restaurant(&self, data: &NewRestaurant) -> Result<Restaurant> {
        self.delay(DEFAULT_MS).await;
        data.validate()?;
        let restaurant = Restaurant {
            id: uuid::Uuid::now_v7().to_string(),
            name: data.name.clone(),
            description: data.description.clone(),
            address: data.address.clone(),
            cuisine: data.cuisine.clone(),
            rating: None,
            total_ratings: Some(0),
            image: data.image.clone(),
        };
        self.state()?.restaurants.push(restaurant.clone());
        Ok(restaurant)
    }

    async fn delete_restaurant(&self, id: &str) -> Result<Ack> {
        self.delay(DEFAULT_MS).await;
        let mut state = self.state()?;
        Self::require_restaurant(&state, id)?;
        state.restaurants.retain(|r| r.id != id);
        state.reviews.retain(|r| r.restaurant_id != id);
        state.likes.remove(id);
        Ok(Ack {
            message: Some("Restaurant deleted".into()),
        })
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review> {
        self.delay(CREATE_REVIEW_MS).await;
        let mut state = self.state()?;
        Self::require_restaurant(&state, &review.restaurant_id)?;
        let author = Self::author(&state)?;
        let created = Review {
            id: uuid::Uuid::now_v7().to_string(),
            restaurant_id: review.restaurant_id.clone(),
            user_id: author.id,
            user_name: author.name,
            rating: review.rating,
            comment: review.comment.clone(),
            image: review.image.clone(),
            created_at: Utc::now(),
        };
        state.reviews.push(created.clone());
        Ok(created)
    }

    async fn list_reviews(&self, restaurant_id: &str) -> Result<Vec<Review>> {
        self.delay(DEFAULT_MS).await;
        let state = self.state()?;
        Self::require_restaurant(&state, restaurant_id)?;
        Ok(state
            .reviews
            .iter()
            .filter(|r| r.restaurant_id == restaurant_id)
            .cloned()
            .collect())
    }

    async fn update_review(&self, id: &str, update: &ReviewUpdate) -> Result<Review> {
        self.delay(DEFAULT_MS).await;
        let mut state = self.state()?;
        let review = state
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| HueError::NotFound(format!("review {id}")))?;
        review.rating = update.rating;
        review.comment = update.comment.clone();
        review.image = update.image.clone();
        Ok(review.clone())
    }

    async fn toggle_like(&self, restaurant_id: &str) -> Result<LikeStatus> {
        self.delay(DEFAULT_MS).await;
        let mut state = self.state()?;
        Self::require_restaurant(&state, restaurant_id)?;
        let liked = if state.likes.remove(restaurant_id) {
            false
        } else {
            state.likes.insert(restaurant_id.to_string());
            true
        };
        Ok(LikeStatus {
            liked,
            message: Some(if liked { "Liked" } else { "Unliked" }.into()),
        })
    }

    async fn like_status(&self, restaurant_id: &str) -> Result<LikeStatus> {
        self.delay(DEFAULT_MS).await;
        let state = self.state()?;
        Self::require_restaurant(&state, restaurant_id)?;
        Ok(LikeStatus {
            liked: state.likes.contains(restaurant_id),
            message: None,
        })
    }

    async fn chat_history(&self, room: &str) -> Result<Vec<ChatMessage>> {
        self.delay(CHAT_MS).await;
        let mut messages = self
            .state()?
            .messages
            .get(room)
            .cloned()
            .unwrap_or_default();
        sort_by_timestamp(&mut messages);
        Ok(messages)
    }

    async fn send_message(&self, room: &str, text: &str) -> Result<ChatMessage> {
        self.delay(SEND_MS).await;
        let mut state = self.state()?;
        let author = Self::author(&state)?;
        let message = ChatMessage {
            id: uuid::Uuid::now_v7().to_string(),
            user_id: author.id,
            user_name: author.name,
            message: text.to_string(),
            timestamp: Utc::now(),
        };
        state
            .messages
            .entry(room.to_string())
            .or_default()
            .push(message.clone());
        Ok(message)
    }
}
