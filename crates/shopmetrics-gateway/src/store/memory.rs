use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{Product, ProductFilter, ProductStore, StoreError, StoreResult};

/// In-process product table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: DashMap<String, Product>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `prod-1` ..= `prod-{count}`, 100 units each, priced
    /// at 29.99 times their index.
    pub fn seeded(count: u32) -> Self {
        let store = Self::new();
        for p in seed_products(count) {
            store.rows.insert(p.id.clone(), p);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub(crate) fn seed_products(count: u32) -> impl Iterator<Item = Product> {
    (1..=count).map(|i| Product {
        id: format!("prod-{i}"),
        name: format!("Sample Product {i}"),
        description: format!("Seeded sample product number {i}"),
        price: 29.99 * f64::from(i),
        category: "General".to_string(),
        inventory: 100,
        image_url: None,
    })
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.rows.get(id).map(|r| r.value().clone()))
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        limit: usize,
        offset: usize,
    ) -> StoreResult<(Vec<Product>, usize)> {
        let mut hits: Vec<Product> = self
            .rows
            .iter()
            .filter(|r| filter.matches(r.value()))
            .map(|r| r.value().clone())
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        let total = hits.len();
        let page = hits.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn insert(&self, product: Product) -> StoreResult<()> {
        match self.rows.entry(product.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(product.id)),
            Entry::Vacant(v) => {
                v.insert(product);
                Ok(())
            }
        }
    }

    async fn set_inventory(&self, id: &str, quantity: i64) -> StoreResult<Option<Product>> {
        Ok(self.rows.get_mut(id).map(|mut r| {
            r.inventory = quantity;
            r.clone()
        }))
    }

    async fn set_price(&self, id: &str, price: f64) -> StoreResult<Option<Product>> {
        Ok(self.rows.get_mut(id).map(|mut r| {
            r.price = price;
            r.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_rows() {
        let store = MemoryStore::seeded(3);
        assert_eq!(store.len(), 3);
        let p = store.get("prod-2").await.unwrap().unwrap();
        assert_eq!(p.inventory, 100);
        assert!((p.price - 59.98).abs() < 1e-9);
        assert!(store.get("prod-9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicates() {
        let store = MemoryStore::seeded(1);
        let dup = store.get("prod-1").await.unwrap().unwrap();
        assert!(matches!(
            store.insert(dup).await,
            Err(StoreError::Duplicate(id)) if id == "prod-1"
        ));
    }

    #[tokio::test]
    async fn list_filters_and_pages() {
        let store = MemoryStore::seeded(5);
        let filter = ProductFilter {
            min_price: Some(50.0),
            ..Default::default()
        };
        let (page, total) = store.list(&filter, 2, 1).await.unwrap();
        assert_eq!(total, 4);
        let ids: Vec<_> = page.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["prod-3", "prod-4"]);
    }

    #[tokio::test]
    async fn updates_return_new_row() {
        let store = MemoryStore::seeded(1);
        let p = store.set_inventory("prod-1", 7).await.unwrap().unwrap();
        assert_eq!(p.inventory, 7);
        assert!(store.set_price("nope", 1.0).await.unwrap().is_none());
    }
}
