//! Product Model

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Product ID type
pub type ProductId = RecordId;

/// Customer review embedded in a product
///
/// One review per (product, reviewer) pair — enforced on insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Reviewer account reference
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    /// Denormalized reviewer display name
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Product model matching the SurrealDB `product` table
///
/// Invariants maintained by the review aggregation:
/// - `rating` is the arithmetic mean of all `reviews[].rating`
/// - `num_reviews == reviews.len()`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProductId>,
    pub name: String,
    /// Admin account that created the product
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub user: Option<RecordId>,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    pub count_in_stock: i32,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: i32,
    pub created_at: DateTime<Utc>,
}

/// Update product payload — every field optional
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_in_stock: Option<i32>,
}

/// One page of catalog search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: u64,
    pub pages: u64,
}
