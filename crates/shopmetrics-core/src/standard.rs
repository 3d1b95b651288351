//! The fixed metric table shared by the product and user services.
//!
//! Everything a service can emit is listed here so the full metric surface is
//! known up front (dashboards and docs are generated from it). Nothing else is
//! registered at runtime.

use crate::catalog::MetricDefinition;
use crate::error::Result;
use crate::registry::{Registry, RegistryOptions};

// HTTP
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

// Data store
pub const DATABASE_QUERY_DURATION_SECONDS: &str = "database_query_duration_seconds";
pub const DATABASE_CONNECTIONS_ACTIVE: &str = "database_connections_active";
pub const DATABASE_CONNECTIONS_IDLE: &str = "database_connections_idle";
pub const DATABASE_CONNECTIONS_MAX: &str = "database_connections_max";

// Cache
pub const REDIS_CACHE_HITS_TOTAL: &str = "redis_cache_hits_total";
pub const REDIS_CACHE_MISSES_TOTAL: &str = "redis_cache_misses_total";
pub const REDIS_OPERATIONS_TOTAL: &str = "redis_operations_total";
pub const REDIS_OPERATION_DURATION_SECONDS: &str = "redis_operation_duration_seconds";

// Product business events
pub const PRODUCT_VIEWS_TOTAL: &str = "product_views_total";
pub const PRODUCTS_ADDED_TO_CART_TOTAL: &str = "products_added_to_cart_total";
pub const PRODUCT_SEARCH_QUERIES_TOTAL: &str = "product_search_queries_total";
pub const PRODUCT_INVENTORY_LEVEL: &str = "product_inventory_level";
pub const PRODUCT_CURRENT_PRICE: &str = "product_current_price";

// User business events
pub const USER_REGISTRATIONS_TOTAL: &str = "user_registrations_total";
pub const USER_LOGIN_ATTEMPTS_TOTAL: &str = "user_login_attempts_total";
pub const USER_ACTIVE_SESSIONS: &str = "user_active_sessions";
pub const USER_SESSIONS_CREATED_TOTAL: &str = "user_sessions_created_total";
pub const USER_PASSWORD_RESET_REQUESTS_TOTAL: &str = "user_password_reset_requests_total";
pub const USER_PROFILE_UPDATES_TOTAL: &str = "user_profile_updates_total";
pub const USER_EMAIL_VERIFICATIONS_TOTAL: &str = "user_email_verifications_total";
pub const USER_ACCOUNT_ACTIONS_TOTAL: &str = "user_account_actions_total";

// Authentication
pub const JWT_TOKENS_ISSUED_TOTAL: &str = "jwt_tokens_issued_total";
pub const JWT_TOKENS_VALIDATED_TOTAL: &str = "jwt_tokens_validated_total";
pub const JWT_TOKENS_REVOKED_TOTAL: &str = "jwt_tokens_revoked_total";
pub const AUTH_OPERATION_DURATION_SECONDS: &str = "auth_operation_duration_seconds";

// Security
pub const FAILED_LOGIN_ATTEMPTS_BY_IP: &str = "failed_login_attempts_by_ip";
pub const SUSPICIOUS_ACTIVITIES_TOTAL: &str = "suspicious_activities_total";
pub const RATE_LIMIT_EXCEEDED_TOTAL: &str = "rate_limit_exceeded_total";

pub const HTTP_BUCKETS: [f64; 8] = [0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0];
pub const DATABASE_BUCKETS: [f64; 7] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0];
pub const CACHE_BUCKETS: [f64; 5] = [0.001, 0.005, 0.01, 0.05, 0.1];
pub const AUTH_BUCKETS: [f64; 5] = [0.01, 0.05, 0.1, 0.5, 1.0];

/// Every standard definition, in exposition order.
pub fn definitions() -> Vec<MetricDefinition> {
    use MetricDefinition as M;
    vec![
        // product
        M::counter(PRODUCT_VIEWS_TOTAL, "Total number of product views", &["product_id", "product_name", "category"]),
        M::counter(PRODUCTS_ADDED_TO_CART_TOTAL, "Total number of products added to cart", &["product_id", "product_name"]),
        M::counter(PRODUCT_SEARCH_QUERIES_TOTAL, "Total number of product search queries", &["search_type"]),
        M::gauge(PRODUCT_INVENTORY_LEVEL, "Current inventory level for products", &["product_id", "product_name"]),
        M::gauge(PRODUCT_CURRENT_PRICE, "Current price of products", &["product_id", "product_name", "currency"]),
        // user
        M::counter(USER_REGISTRATIONS_TOTAL, "Total number of user registrations", &["source"]),
        M::counter(USER_LOGIN_ATTEMPTS_TOTAL, "Total number of login attempts", &["status", "method"]),
        M::gauge(USER_ACTIVE_SESSIONS, "Number of active user sessions", &[]),
        M::counter(USER_SESSIONS_CREATED_TOTAL, "Total number of sessions created", &[]),
        M::counter(USER_PASSWORD_RESET_REQUESTS_TOTAL, "Total number of password reset requests", &["status"]),
        M::counter(USER_PROFILE_UPDATES_TOTAL, "Total number of profile updates", &["field"]),
        M::counter(USER_EMAIL_VERIFICATIONS_TOTAL, "Total number of email verifications", &["status"]),
        M::counter(USER_ACCOUNT_ACTIONS_TOTAL, "Total number of account actions", &["action"]),
        // http
        M::counter(HTTP_REQUESTS_TOTAL, "Total HTTP requests", &["method", "endpoint", "status"]),
        M::histogram(HTTP_REQUEST_DURATION_SECONDS, "HTTP request duration in seconds", &["method", "endpoint"], &HTTP_BUCKETS),
        // auth
        M::counter(JWT_TOKENS_ISSUED_TOTAL, "Total number of JWT tokens issued", &["token_type"]),
        M::counter(JWT_TOKENS_VALIDATED_TOTAL, "Total number of JWT token validations", &["status"]),
        M::counter(JWT_TOKENS_REVOKED_TOTAL, "Total number of JWT tokens revoked", &["reason"]),
        M::histogram(AUTH_OPERATION_DURATION_SECONDS, "Authentication operation duration in seconds", &["operation"], &AUTH_BUCKETS),
        // database
        M::histogram(DATABASE_QUERY_DURATION_SECONDS, "Database query duration in seconds", &["operation", "table"], &DATABASE_BUCKETS),
        M::gauge(DATABASE_CONNECTIONS_ACTIVE, "Number of active database connections", &[]),
        M::gauge(DATABASE_CONNECTIONS_IDLE, "Number of idle database connections", &[]),
        M::gauge(DATABASE_CONNECTIONS_MAX, "Maximum number of database connections", &[]),
        // cache
        M::counter(REDIS_CACHE_HITS_TOTAL, "Total number of cache hits", &["cache_key_type"]),
        M::counter(REDIS_CACHE_MISSES_TOTAL, "Total number of cache misses", &["cache_key_type"]),
        M::counter(REDIS_OPERATIONS_TOTAL, "Total Redis operations", &["operation"]),
        M::histogram(REDIS_OPERATION_DURATION_SECONDS, "Redis operation duration in seconds", &["operation"], &CACHE_BUCKETS),
        // security
        M::counter(FAILED_LOGIN_ATTEMPTS_BY_IP, "Failed login attempts grouped by IP", &["ip_address"]),
        M::counter(SUSPICIOUS_ACTIVITIES_TOTAL, "Total number of suspicious activities detected", &["activity_type"]),
        M::counter(RATE_LIMIT_EXCEEDED_TOTAL, "Total number of rate limit violations", &["endpoint", "user_id"]),
    ]
}

impl Registry {
    /// Registry with the standard table and default options.
    pub fn standard() -> Result<Self> {
        Self::standard_with_options(RegistryOptions::default())
    }

    pub fn standard_with_options(opts: RegistryOptions) -> Result<Self> {
        let mut reg = Self::with_options(opts);
        reg.register_all(definitions())?;
        tracing::debug!(metrics = reg.catalog().len(), "standard metric catalog registered");
        Ok(reg)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn table_registers_cleanly() {
        let reg = Registry::standard().unwrap();
        assert_eq!(reg.catalog().len(), definitions().len());
        assert_eq!(reg.catalog().iter().next().unwrap().name, PRODUCT_VIEWS_TOTAL);
    }

    #[test]
    fn registering_twice_is_idempotent() {
        let mut reg = Registry::standard().unwrap();
        reg.register_all(definitions()).unwrap();
        assert_eq!(reg.catalog().len(), definitions().len());
    }
}
