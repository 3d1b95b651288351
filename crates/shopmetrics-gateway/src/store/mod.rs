//! Product storage.
//!
//! [`ProductStore`] is the data-access seam. [`MemoryStore`] is the backing
//! implementation used by the service and tests; [`MeteredStore`] decorates
//! any store so every query lands in `database_query_duration_seconds`.

mod memory;
mod metered;

pub use memory::MemoryStore;
pub(crate) use memory::seed_products;
pub use metered::MeteredStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const PRODUCTS_TABLE: &str = "products";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category: String,
    pub inventory: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Filters for listing and search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring of name or description.
    pub text: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ProductFilter {
    pub fn matches(&self, p: &Product) -> bool {
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            if !p.name.to_lowercase().contains(&needle)
                && !p.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(c) = &self.category {
            if !p.category.eq_ignore_ascii_case(c) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| p.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| p.price > max) {
            return false;
        }
        true
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("product already exists: {0}")]
    Duplicate(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait ProductStore: Send + Sync + 'static {
    async fn get(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Matching products ordered by id, after `offset`, at most `limit`.
    /// Also returns the total number of matches.
    async fn list(
        &self,
        filter: &ProductFilter,
        limit: usize,
        offset: usize,
    ) -> StoreResult<(Vec<Product>, usize)>;

    async fn insert(&self, product: Product) -> StoreResult<()>;

    /// Returns the updated product, `None` when `id` is unknown.
    async fn set_inventory(&self, id: &str, quantity: i64) -> StoreResult<Option<Product>>;

    /// Returns the updated product, `None` when `id` is unknown.
    async fn set_price(&self, id: &str, price: f64) -> StoreResult<Option<Product>>;
}
