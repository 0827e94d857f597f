use std::sync::Arc;

use crate::api::{self, Api, ReviewApi};
use crate::config::HueConfig;
use crate::credentials::{self, CredentialStore};
use crate::error::{HueError, Result};
use crate::forms::{
    self, EditReviewForm, NewPasswordForm, ReviewForm, SignInForm, SignUpForm,
};
use crate::model::*;
use crate::search::CategoryFilter;

/// A restaurant with its reviews and the caller's like flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantDetail {
    pub restaurant: Restaurant,
    pub reviews: Vec<Review>,
    /// `None` when the like status could not be fetched.
    pub liked: Option<bool>,
}

/// Entry point for views: form checks, session bookkeeping and backend calls.
///
/// A successful sign-in or sign-up stores the returned session before
/// returning; a failed one leaves the stored session as it was.
pub struct HueClient {
    api: Api,
    credentials: Arc<dyn CredentialStore>,
}

impl HueClient {
    pub fn new(api: Api, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { api, credentials }
    }

    /// File-backed session plus the backend named in config.
    pub fn from_config(config: &HueConfig) -> Result<Self> {
        let credentials = credentials::create_store(config)?;
        let api = api::create_backend(config, credentials.clone())?;
        Ok(Self::new(api, credentials))
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn session(&self) -> Result<Option<Session>> {
        self.credentials.get()
    }

    pub fn is_signed_in(&self) -> Result<bool> {
        Ok(self.credentials.token()?.is_some())
    }

    // -- Auth --

    pub async fn login(&self, form: &SignInForm) -> Result<Session> {
        form.validate()?;
        let resp = self.api.login(form.email.trim(), &form.password).await?;
        self.store("login", resp)
    }

    pub async fn register(&self, form: &SignUpForm) -> Result<Session> {
        form.validate()?;
        let resp = self
            .api
            .register(form.name.trim(), form.email.trim(), &form.password)
            .await?;
        self.store("register", resp)
    }

    /// Persist a sign-in result. A blank token counts as a failed sign-in.
    fn store(&self, operation: &str, resp: AuthResponse) -> Result<Session> {
        if resp.token.trim().is_empty() {
            return Err(HueError::Decode {
                endpoint: operation.to_string(),
                reason: "response carried an empty token".to_string(),
            });
        }
        let session = Session::from(resp);
        self.credentials.set(&session)?;
        tracing::info!(user = %session.user.id, "signed in");
        Ok(session)
    }

    /// Forget the local session. The server is not contacted.
    pub fn logout(&self) -> Result<()> {
        self.credentials.clear()?;
        tracing::info!("signed out");
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<ResetTicket> {
        forms::validate_email(email)?;
        self.api.request_password_reset(email.trim()).await
    }

    pub async fn reset_password(&self, form: &NewPasswordForm) -> Result<Ack> {
        form.validate()?;
        self.api
            .reset_password(form.reset_token.trim(), &form.password)
            .await
    }

    // -- Restaurants --

    pub async fn restaurants(&self) -> Result<Vec<Restaurant>> {
        self.api.list_restaurants().await
    }

    pub async fn search(&self, query: &str, category: &CategoryFilter) -> Result<Vec<Restaurant>> {
        self.api.search_restaurants(query, category).await
    }

    pub async fn top_rated(&self) -> Result<Vec<Restaurant>> {
        self.api.top_rated().await
    }

    pub async fn restaurant(&self, id: &str) -> Result<Restaurant> {
        self.api.get_restaurant(id).await
    }

    /// Restaurant, then its reviews, then the like flag, one after another.
    ///
    /// A failed like lookup is logged and reported as unknown; the other two
    /// calls must succeed.
    pub async fn restaurant_detail(&self, id: &str) -> Result<RestaurantDetail> {
        let restaurant = self.api.get_restaurant(id).await?;
        let reviews = self.api.list_reviews(id).await?;
        let liked = match self.api.like_status(id).await {
            Ok(status) => Some(status.liked),
            Err(e) => {
                tracing::warn!(restaurant = %id, error = %e, "like status unavailable");
                None
            }
        };
        Ok(RestaurantDetail {
            restaurant,
            reviews,
            liked,
        })
    }

    pub async fn create_restaurant(&self, data: &NewRestaurant) -> Result<Restaurant> {
        data.validate()?;
        self.api.create_restaurant(data).await
    }

    pub async fn delete_restaurant(&self, id: &str) -> Result<Ack> {
        self.api.delete_restaurant(id).await
    }

    // -- Reviews --

    /// Validate and submit. An invalid form never reaches the backend.
    pub async fn submit_review(&self, form: &ReviewForm) -> Result<Review> {
        let request = form.to_request()?;
        self.api.create_review(&request).await
    }

    /// Apply an edit. `current_image` is the photo the review has now, kept
    /// when the form leaves the photo untouched.
    pub async fn edit_review(
        &self,
        review_id: &str,
        form: &EditReviewForm,
        current_image: Option<&str>,
    ) -> Result<Review> {
        let request = form.to_request(current_image)?;
        self.api.update_review(review_id, &request).await
    }

    pub async fn reviews(&self, restaurant_id: &str) -> Result<Vec<Review>> {
        self.api.list_reviews(restaurant_id).await
    }

    // -- Likes --

    pub async fn toggle_like(&self, restaurant_id: &str) -> Result<bool> {
        Ok(self.api.toggle_like(restaurant_id).await?.liked)
    }

    pub async fn like_status(&self, restaurant_id: &str) -> Result<bool> {
        Ok(self.api.like_status(restaurant_id).await?.liked)
    }

    // -- Chat --

    /// Messages in the room, oldest first.
    pub async fn chat_history(&self, room: &str) -> Result<Vec<ChatMessage>> {
        let mut messages = self.api.chat_history(room).await?;
        sort_by_timestamp(&mut messages);
        Ok(messages)
    }

    pub async fn send_message(&self, room: &str, text: &str) -> Result<ChatMessage> {
        let text = forms::validate_chat_message(text)?;
        self.api.send_message(room, &text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;
    use crate::credentials::MemoryCredentialStore;
    use crate::forms::PhotoEdit;

    fn client() -> (HueClient, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let client = HueClient::new(Api::Mock(MockApi::without_latency()), store.clone());
        (client, store)
    }

    fn sign_in(email: &str, password: &str) -> SignInForm {
        SignInForm {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let (client, store) = client();
        let session = client
            .login(&sign_in("carlos@huequitas.co", "ajiaco123"))
            .await
            .unwrap();
        assert_eq!(store.get().unwrap(), Some(session.clone()));
        assert_eq!(session.user.name, "Carlos Mendoza");
        assert!(client.is_signed_in().unwrap());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_previous_session() {
        let (client, store) = client();
        let first = client
            .login(&sign_in("carlos@huequitas.co", "ajiaco123"))
            .await
            .unwrap();

        let err = client
            .login(&sign_in("carlos@huequitas.co", "123"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(store.get().unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_login_empty_fields_rejected_locally() {
        let (client, store) = client();
        let err = client.login(&sign_in("", "")).await.unwrap_err();
        assert!(err.is_validation());
        assert!(store.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_mismatch_never_stores() {
        let (client, store) = client();
        let form = SignUpForm {
            name: "Ana Ruiz".into(),
            email: "ana@example.com".into(),
            password: "Sancocho#2024".into(),
            confirm_password: "Sancocho#2025".into(),
        };
        let err = client.register(&form).await.unwrap_err();
        assert_eq!(err.user_message(), "Passwords do not match");
        assert!(store.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_then_logout() {
        let (client, store) = client();
        let form = SignUpForm {
            name: "Ana Ruiz".into(),
            email: "ana@example.com".into(),
            password: "Sancocho#2024".into(),
            confirm_password: "Sancocho#2024".into(),
        };
        let session = client.register(&form).await.unwrap();
        assert_eq!(session.user.email, "ana@example.com");
        assert!(store.get().unwrap().is_some());

        client.logout().unwrap();
        assert!(store.get().unwrap().is_none());
        assert!(!client.is_signed_in().unwrap());
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let (client, _) = client();
        let ticket = client
            .request_password_reset("ana@example.com")
            .await
            .unwrap();
        let form = NewPasswordForm {
            reset_token: ticket.reset_token,
            password: "nuevaClave1".into(),
            confirm_password: "nuevaClave1".into(),
        };
        client.reset_password(&form).await.unwrap();

        let err = client.request_password_reset("no-es-email").await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_invalid_review_not_submitted() {
        let (client, _) = client();
        let err = client
            .submit_review(&ReviewForm::new("1").with_rating(0).with_comment("Rico"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(client.reviews("1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_and_edit_review() {
        let (client, _) = client();
        let review = client
            .submit_review(&ReviewForm::new("2").with_rating(3).with_comment("Great food"))
            .await
            .unwrap();
        assert_eq!(review.rating, 3);

        let edit = EditReviewForm {
            rating: 4,
            comment: "Even better the second time".into(),
            photo: PhotoEdit::Replace("data:image/png;base64,aGk=".into()),
        };
        let edited = client.edit_review(&review.id, &edit, None).await.unwrap();
        assert_eq!(edited.rating, 4);
        assert_eq!(edited.image.as_deref(), Some("data:image/png;base64,aGk="));

        let keep = EditReviewForm {
            photo: PhotoEdit::Keep,
            ..edit
        };
        let kept = client
            .edit_review(&review.id, &keep, edited.image.as_deref())
            .await
            .unwrap();
        assert_eq!(kept.image, edited.image);
    }

    #[tokio::test]
    async fn test_restaurant_detail() {
        let (client, _) = client();
        client.toggle_like("3").await.unwrap();
        let detail = client.restaurant_detail("3").await.unwrap();
        assert_eq!(detail.restaurant.name, "Bandeja Paisa Express");
        assert!(detail.reviews.is_empty());
        assert_eq!(detail.liked, Some(true));

        let err = client.restaurant_detail("404").await.unwrap_err();
        assert!(matches!(err, HueError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_toggle_and_status_agree() {
        let (client, _) = client();
        let liked = client.toggle_like("5").await.unwrap();
        assert_eq!(client.like_status("5").await.unwrap(), liked);
    }

    #[tokio::test]
    async fn test_search_delegates() {
        let (client, _) = client();
        let desserts = client
            .search("", &CategoryFilter::Only("Desserts".into()))
            .await
            .unwrap();
        assert_eq!(desserts.len(), 2);
    }

    #[tokio::test]
    async fn test_send_message_validated() {
        let (client, _) = client();
        assert!(client.send_message("general", "   ").await.unwrap_err().is_validation());

        let sent = client.send_message("general", "  ¡Hola!  ").await.unwrap();
        assert_eq!(sent.message, "¡Hola!");
        let history = client.chat_history("general").await.unwrap();
        assert_eq!(history.last().map(|m| m.id.as_str()), Some(sent.id.as_str()));
    }

    #[tokio::test]
    async fn test_create_restaurant_requires_name() {
        let (client, _) = client();
        let err = client
            .create_restaurant(&NewRestaurant::new("  ", "Main"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
