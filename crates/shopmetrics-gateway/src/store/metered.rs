use async_trait::async_trait;
use shopmetrics_core::{wrap, SharedRegistry, StoreQuery};

use super::{Product, ProductFilter, ProductStore, StoreResult, PRODUCTS_TABLE};

/// Times every query of the inner store.
pub struct MeteredStore<S> {
    inner: S,
    registry: SharedRegistry,
}

impl<S: ProductStore> MeteredStore<S> {
    pub fn new(inner: S, registry: SharedRegistry) -> Self {
        Self { inner, registry }
    }
}

fn query(operation: &str) -> StoreQuery {
    StoreQuery::new(operation, PRODUCTS_TABLE)
}

#[async_trait]
impl<S: ProductStore> ProductStore for MeteredStore<S> {
    async fn get(&self, id: &str) -> StoreResult<Option<Product>> {
        wrap(&self.registry, query("select"), self.inner.get(id)).await
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        limit: usize,
        offset: usize,
    ) -> StoreResult<(Vec<Product>, usize)> {
        wrap(&self.registry, query("select"), self.inner.list(filter, limit, offset)).await
    }

    async fn insert(&self, product: Product) -> StoreResult<()> {
        wrap(&self.registry, query("insert"), self.inner.insert(product)).await
    }

    async fn set_inventory(&self, id: &str, quantity: i64) -> StoreResult<Option<Product>> {
        wrap(&self.registry, query("update"), self.inner.set_inventory(id, quantity)).await
    }

    async fn set_price(&self, id: &str, price: f64) -> StoreResult<Option<Product>> {
        wrap(&self.registry, query("update"), self.inner.set_price(id, price)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shopmetrics_core::standard::DATABASE_QUERY_DURATION_SECONDS;
    use shopmetrics_core::Registry;

    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn queries_are_timed_per_operation() {
        let reg = Arc::new(Registry::standard().unwrap());
        let store = MeteredStore::new(MemoryStore::seeded(2), Arc::clone(&reg));

        store.get("prod-1").await.unwrap();
        store.get("missing").await.unwrap();
        store.set_price("prod-2", 10.0).await.unwrap();

        let select = reg
            .histogram_snapshot(DATABASE_QUERY_DURATION_SECONDS, &["select", "products"])
            .unwrap()
            .unwrap();
        assert_eq!(select.count, 2);
        let update = reg
            .histogram_snapshot(DATABASE_QUERY_DURATION_SECONDS, &["update", "products"])
            .unwrap()
            .unwrap();
        assert_eq!(update.count, 1);
    }
}
