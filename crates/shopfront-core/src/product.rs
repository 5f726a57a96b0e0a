use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Product category. The set is fixed; the store persists the display name
/// as text and unknown values are rejected at the row boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Accessories,
    Office,
    Home,
    Sports,
    Books,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Electronics => "Electronics",
            Category::Accessories => "Accessories",
            Category::Office => "Office",
            Category::Home => "Home",
            Category::Sports => "Sports",
            Category::Books => "Books",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Electronics" => Ok(Category::Electronics),
            "Accessories" => Ok(Category::Accessories),
            "Office" => Ok(Category::Office),
            "Home" => Ok(Category::Home),
            "Sports" => Ok(Category::Sports),
            "Books" => Ok(Category::Books),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product category: {0}")]
pub struct UnknownCategory(pub String);

/// A catalog product. One record type is shared by both resolver sources
/// (persistent store and fallback catalog) so callers see a uniform shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Unit price; non-negative, at most two fractional digits.
    pub price: Decimal,
    pub category: Category,
    pub image: String,
    pub stock: u32,
    /// Average review rating, clamped to `[0, 5]` on normalization.
    pub rating: f64,
    pub review_count: u32,
    pub is_active: bool,
}

impl Product {
    /// Clamp the rating into `[0, 5]`. Stored data and catalog files are
    /// normalized on load so downstream code never sees an out-of-range value.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        self.rating = self.rating.clamp(0.0, 5.0);
        self
    }

    /// Check structural invariants: non-empty id and name, non-negative
    /// price with currency scale (at most two fractional digits).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product id must be non-empty".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has an empty name",
                self.id
            )));
        }
        if self.price.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has a negative price",
                self.id
            )));
        }
        if self.price.round_dp(2) != self.price {
            return Err(ConfigError::Validation(format!(
                "product '{}' has a price with more than two fractional digits",
                self.id
            )));
        }
        Ok(())
    }

    /// Generate a URL-safe slug from the product name, used as the seed
    /// identifier for products loaded from a catalog file without one.
    #[must_use]
    pub fn slug_from_name(name: &str) -> String {
        name.to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}
