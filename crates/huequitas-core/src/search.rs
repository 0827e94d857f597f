use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::model::Restaurant;

/// Categories offered by the home view. `All` disables the category filter.
pub const CATEGORIES: &[&str] = &["All", "Soups", "Main", "Desserts"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Exact, case-sensitive match on `cuisine`.
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => restaurant.cuisine == *category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "All" {
            Ok(Self::All)
        } else {
            Ok(Self::Only(s.to_string()))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Only(c) => write!(f, "{c}"),
        }
    }
}

/// Apply the category filter, then a case-insensitive substring match on name.
///
/// An empty query with `All` returns everything in the original order.
pub fn filter_restaurants(
    restaurants: &[Restaurant],
    query: &str,
    category: &CategoryFilter,
) -> Vec<Restaurant> {
    let needle = query.trim().to_lowercase();
    restaurants
        .iter()
        .filter(|r| category.matches(r))
        .filter(|r| needle.is_empty() || r.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Highest rating first; unrated restaurants sink to the bottom.
pub fn sort_top_rated(mut restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
    restaurants.sort_by(|a, b| match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    restaurants
}
