//! Product cache with TTL and a capacity bound.
//!
//! Every operation is measured as a cache operation on the `product` key
//! type; `get` counts as a hit or miss depending on whether a live entry was
//! found.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use shopmetrics_core::{wrap_with, CacheOp, SharedRegistry, Verdict};

use crate::store::Product;

pub const KEY_TYPE: &str = "product";

struct Entry {
    product: Product,
    expires_at: Instant,
}

pub struct ProductCache {
    entries: DashMap<String, Entry>,
    ttl: Duration,
    capacity: usize,
    registry: SharedRegistry,
}

impl ProductCache {
    pub fn new(registry: SharedRegistry, ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity,
            registry,
        }
    }

    pub async fn get(&self, id: &str) -> Option<Product> {
        let found = async { self.lookup(id) };
        wrap_with(&self.registry, CacheOp::get(KEY_TYPE), found, |p| {
            if p.is_some() {
                Verdict::Hit
            } else {
                Verdict::Miss
            }
        })
        .await
    }

    pub async fn set(&self, product: Product) {
        let stored = async { self.store(product) };
        wrap_with(&self.registry, CacheOp::set(KEY_TYPE), stored, |_| Verdict::Completed).await
    }

    /// Returns whether an entry was removed.
    pub async fn delete(&self, id: &str) -> bool {
        let removed = async { self.entries.remove(id).is_some() };
        wrap_with(&self.registry, CacheOp::delete(KEY_TYPE), removed, |_| {
            Verdict::Completed
        })
        .await
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, id: &str) -> Option<Product> {
        let now = Instant::now();
        let hit = self.entries.get(id).and_then(|e| {
            if e.expires_at > now {
                Some(e.product.clone())
            } else {
                None
            }
        });
        if hit.is_none() {
            self.entries.remove_if(id, |_, e| e.expires_at <= now);
        }
        hit
    }

    fn store(&self, product: Product) {
        let now = Instant::now();
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&product.id) {
            self.entries.retain(|_, e| e.expires_at > now);
            if self.entries.len() >= self.capacity {
                // Still full: drop the entry closest to expiry.
                let oldest = self
                    .entries
                    .iter()
                    .min_by_key(|e| e.value().expires_at)
                    .map(|e| e.key().clone());
                if let Some(key) = oldest {
                    self.entries.remove(&key);
                    tracing::debug!(evicted = %key, "product cache full");
                }
            }
        }
        let entry = Entry {
            expires_at: now + self.ttl,
            product,
        };
        self.entries.insert(entry.product.id.clone(), entry);
    }
}
