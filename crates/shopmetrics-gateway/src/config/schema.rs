use std::net::SocketAddr;

use serde::Deserialize;
use shopmetrics_core::error::{MetricsError, Result};
use shopmetrics_core::RegistryOptions;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub cache: CacheSection,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            metrics: MetricsSection::default(),
            store: StoreSection::default(),
            cache: CacheSection::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::BadConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.metrics.validate()?;
        self.store.validate()?;
        self.cache.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Reported by `/health` and `/ready`.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            service_name: default_service_name(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.service_name.trim().is_empty() {
            return Err(MetricsError::BadConfig(
                "gateway.service_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            MetricsError::BadConfig(format!("gateway.listen must be a valid SocketAddr: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_service_name() -> String {
    "product-service".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_metrics_path")]
    pub path: String,

    /// Hard cap on instances per metric. Unbounded when absent.
    #[serde(default)]
    pub series_limit: Option<usize>,

    #[serde(default = "default_series_warn_threshold")]
    pub series_warn_threshold: Option<usize>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            series_limit: None,
            series_warn_threshold: default_series_warn_threshold(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') || self.path.len() < 2 {
            return Err(MetricsError::BadConfig(
                "metrics.path must start with '/' and name a route".into(),
            ));
        }
        if self.path.contains([':', '*', '{', '}']) {
            return Err(MetricsError::BadConfig(format!(
                "metrics.path {} must be a literal route (no ':', '*', '{{' or '}}')",
                self.path
            )));
        }
        if RESERVED_ROUTES
            .iter()
            .any(|r| self.path == *r || self.path.starts_with(&format!("{r}/")))
        {
            return Err(MetricsError::BadConfig(format!(
                "metrics.path {} collides with a service route",
                self.path
            )));
        }
        if self.series_limit == Some(0) {
            return Err(MetricsError::BadConfig(
                "metrics.series_limit must be greater than 0".into(),
            ));
        }
        if self.series_warn_threshold == Some(0) {
            return Err(MetricsError::BadConfig(
                "metrics.series_warn_threshold must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            series_limit: self.series_limit,
            series_warn_threshold: self.series_warn_threshold,
        }
    }
}

/// Route roots served by the gateway itself.
const RESERVED_ROUTES: [&str; 6] = ["/health", "/ready", "/products", "/cart", "/users", "/auth"];

fn default_metrics_path() -> String {
    "/metrics".into()
}
fn default_series_warn_threshold() -> Option<usize> {
    Some(1000)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// Products inserted at startup (`prod-1` ..= `prod-N`).
    #[serde(default = "default_seed_products")]
    pub seed_products: u32,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            seed_products: default_seed_products(),
        }
    }
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.seed_products > 10000 {
            return Err(MetricsError::BadConfig(
                "store.seed_products must be between 0 and 10000".into(),
            ));
        }
        Ok(())
    }
}

fn default_seed_products() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            capacity: default_capacity(),
        }
    }
}

impl CacheSection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=3_600_000).contains(&self.ttl_ms) {
            return Err(MetricsError::BadConfig(
                "cache.ttl_ms must be between 1000 and 3600000".into(),
            ));
        }
        if self.capacity == 0 {
            return Err(MetricsError::BadConfig(
                "cache.capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn default_ttl_ms() -> u64 {
    30000
}
fn default_capacity() -> usize {
    10000
}
