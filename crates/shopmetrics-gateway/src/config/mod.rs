//! Service config loader (strict parsing).

pub mod schema;

use std::fs;

use shopmetrics_core::error::{MetricsError, Result};

pub use schema::{CacheSection, GatewaySection, MetricsSection, ServiceConfig, StoreSection};

/// Config path used when `SHOPMETRICS_CONFIG` is unset.
pub const DEFAULT_PATH: &str = "shopmetrics.yaml";
pub const PATH_ENV: &str = "SHOPMETRICS_CONFIG";

/// Resolve the config path from the environment.
pub fn path_from_env() -> String {
    std::env::var(PATH_ENV).unwrap_or_else(|_| DEFAULT_PATH.to_string())
}

pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricsError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| MetricsError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
