use crate::error::Result;
use crate::model::*;
use crate::search::CategoryFilter;

/// The remote operations a view can invoke. The HTTP API is the primary
/// implementation; the mock backend serves the same surface from fixtures.
///
/// Implementations shape payloads only. Session persistence and form checks
/// live in [`HueClient`](crate::client::HueClient).
pub trait ReviewApi: Send + Sync {
    // -- Auth --

    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<AuthResponse>> + Send;

    fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<AuthResponse>> + Send;

    fn request_password_reset(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<ResetTicket>> + Send;

    fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> impl std::future::Future<Output = Result<Ack>> + Send;

    // -- Restaurants --

    fn list_restaurants(&self) -> impl std::future::Future<Output = Result<Vec<Restaurant>>> + Send;

    fn search_restaurants(
        &self,
        query: &str,
        category: &CategoryFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Restaurant>>> + Send;

    /// Restaurants by rating, best first.
    fn top_rated(&self) -> impl std::future::Future<Output = Result<Vec<Restaurant>>> + Send;

    fn get_restaurant(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Restaurant>> + Send;

    fn create_restaurant(
        &self,
        data: &NewRestaurant,
    ) -> impl std::future::Future<Output = Result<Restaurant>> + Send;

    fn delete_restaurant(&self, id: &str) -> impl std::future::Future<Output = Result<Ack>> + Send;

    // -- Reviews --

    fn create_review(
        &self,
        review: &NewReview,
    ) -> impl std::future::Future<Output = Result<Review>> + Send;

    fn list_reviews(
        &self,
        restaurant_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Review>>> + Send;

    fn update_review(
        &self,
        id: &str,
        update: &ReviewUpdate,
    ) -> impl std::future::Future<Output = Result<Review>> + Send;

    // -- Likes --

    /// Flip the like flag and return the server's new value.
    fn toggle_like(
        &self,
        restaurant_id: &str,
    ) -> impl std::future::Future<Output = Result<LikeStatus>> + Send;

    fn like_status(
        &self,
        restaurant_id: &str,
    ) -> impl std::future::Future<Output = Result<LikeStatus>> + Send;

    // -- Chat --

    fn chat_history(
        &self,
        room: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>>> + Send;

    fn send_message(
        &self,
        room: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<ChatMessage>> + Send;
}
