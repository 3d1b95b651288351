//! Shared application state for the shopmetrics service.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shopmetrics_core::error::Result;
use shopmetrics_core::events::product;
use shopmetrics_core::{Registry, SharedRegistry};

use crate::accounts::Accounts;
use crate::cache::ProductCache;
use crate::config::ServiceConfig;
use crate::store::{seed_products, MemoryStore, MeteredStore, ProductStore};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    registry: SharedRegistry,
    store: Arc<dyn ProductStore>,
    cache: ProductCache,
    accounts: Accounts,
    draining: AtomicBool,
}

impl AppState {
    /// Build application state: standard registry, seeded store, empty cache.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ServiceConfig) -> Result<Self> {
        let registry: SharedRegistry = Arc::new(Registry::standard_with_options(
            cfg.metrics.registry_options(),
        )?);

        let seeded = MemoryStore::seeded(cfg.store.seed_products);
        // Baseline gauges so dashboards have data before the first write.
        for p in seed_products(cfg.store.seed_products) {
            product::inventory_updated(&registry, &p.id, &p.name, p.inventory);
            product::price_updated(&registry, &p.id, &p.name, p.price, product::DEFAULT_CURRENCY);
        }
        let store: Arc<dyn ProductStore> =
            Arc::new(MeteredStore::new(seeded, Arc::clone(&registry)));

        let cache = ProductCache::new(
            Arc::clone(&registry),
            Duration::from_millis(cfg.cache.ttl_ms),
            cfg.cache.capacity,
        );

        tracing::info!(
            service = %cfg.gateway.service_name,
            metrics = registry.catalog().len(),
            seeded = cfg.store.seed_products,
            "application state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                store,
                cache,
                accounts: Accounts::new(),
                draining: AtomicBool::new(false),
            }),
        })
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn shared_registry(&self) -> SharedRegistry {
        Arc::clone(&self.inner.registry)
    }

    pub fn store(&self) -> &dyn ProductStore {
        self.inner.store.as_ref()
    }

    pub fn cache(&self) -> &ProductCache {
        &self.inner.cache
    }

    pub fn accounts(&self) -> &Accounts {
        &self.inner.accounts
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }

    pub fn set_draining(&self, draining: bool) {
        self.inner.draining.store(draining, Ordering::Relaxed);
    }
}
