//! Client core for Las HueQuitas: session storage, the authenticated request
//! gateway, backend proxies and the form rules views rely on.

pub mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod image;
pub mod model;
pub mod search;

pub use client::{HueClient, RestaurantDetail};
pub use error::{HueError, Result};
