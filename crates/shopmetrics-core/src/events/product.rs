//! Product service events.

use super::note;
use crate::registry::Registry;
use crate::standard::{
    DATABASE_CONNECTIONS_ACTIVE, DATABASE_CONNECTIONS_IDLE, DATABASE_CONNECTIONS_MAX,
    PRODUCTS_ADDED_TO_CART_TOTAL, PRODUCT_CURRENT_PRICE, PRODUCT_INVENTORY_LEVEL,
    PRODUCT_SEARCH_QUERIES_TOTAL, PRODUCT_VIEWS_TOTAL,
};

pub const DEFAULT_CURRENCY: &str = "USD";

/// How a search was phrased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    FullText,
    Filter,
    Category,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::FullText => "full_text",
            SearchType::Filter => "filter",
            SearchType::Category => "category",
        }
    }
}

pub fn product_viewed(reg: &Registry, product_id: &str, product_name: &str, category: &str) {
    note(
        "product_viewed",
        reg.inc_counter(PRODUCT_VIEWS_TOTAL, &[product_id, product_name, category]),
    );
}

pub fn added_to_cart(reg: &Registry, product_id: &str, product_name: &str) {
    note(
        "added_to_cart",
        reg.inc_counter(PRODUCTS_ADDED_TO_CART_TOTAL, &[product_id, product_name]),
    );
}

pub fn searched(reg: &Registry, search_type: SearchType) {
    note(
        "searched",
        reg.inc_counter(PRODUCT_SEARCH_QUERIES_TOTAL, &[search_type.as_str()]),
    );
}

pub fn inventory_updated(reg: &Registry, product_id: &str, product_name: &str, quantity: i64) {
    note(
        "inventory_updated",
        reg.set_gauge(PRODUCT_INVENTORY_LEVEL, &[product_id, product_name], quantity as f64),
    );
}

pub fn price_updated(reg: &Registry, product_id: &str, product_name: &str, price: f64, currency: &str) {
    note(
        "price_updated",
        reg.set_gauge(PRODUCT_CURRENT_PRICE, &[product_id, product_name, currency], price),
    );
}

/// Connection pool snapshot.
pub fn db_connection_stats(reg: &Registry, active: u32, idle: u32, max: u32) {
    note(
        "db_connection_stats",
        reg.set_gauge(DATABASE_CONNECTIONS_ACTIVE, &[], f64::from(active)),
    );
    note(
        "db_connection_stats",
        reg.set_gauge(DATABASE_CONNECTIONS_IDLE, &[], f64::from(idle)),
    );
    note(
        "db_connection_stats",
        reg.set_gauge(DATABASE_CONNECTIONS_MAX, &[], f64::from(max)),
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn view_and_cart_counters() {
        let reg = Registry::standard().unwrap();
        product_viewed(&reg, "prod-1", "Lamp", "Home");
        product_viewed(&reg, "prod-1", "Lamp", "Home");
        added_to_cart(&reg, "prod-1", "Lamp");

        assert_eq!(
            reg.counter_value(PRODUCT_VIEWS_TOTAL, &["prod-1", "Lamp", "Home"]).unwrap(),
            Some(2.0)
        );
        assert_eq!(
            reg.counter_value(PRODUCTS_ADDED_TO_CART_TOTAL, &["prod-1", "Lamp"]).unwrap(),
            Some(1.0)
        );
    }

    #[test]
    fn gauges_take_last_write() {
        let reg = Registry::standard().unwrap();
        inventory_updated(&reg, "prod-2", "Desk", 100);
        inventory_updated(&reg, "prod-2", "Desk", 42);
        price_updated(&reg, "prod-2", "Desk", 199.5, DEFAULT_CURRENCY);

        assert_eq!(
            reg.gauge_value(PRODUCT_INVENTORY_LEVEL, &["prod-2", "Desk"]).unwrap(),
            Some(42.0)
        );
        assert_eq!(
            reg.gauge_value(PRODUCT_CURRENT_PRICE, &["prod-2", "Desk", "USD"]).unwrap(),
            Some(199.5)
        );
    }

    #[test]
    fn search_and_pool_stats() {
        let reg = Registry::standard().unwrap();
        searched(&reg, SearchType::Category);
        searched(&reg, SearchType::FullText);
        searched(&reg, SearchType::FullText);
        db_connection_stats(&reg, 3, 7, 10);

        assert_eq!(
            reg.counter_value(PRODUCT_SEARCH_QUERIES_TOTAL, &["full_text"]).unwrap(),
            Some(2.0)
        );
        assert_eq!(reg.gauge_value(DATABASE_CONNECTIONS_IDLE, &[]).unwrap(), Some(7.0));
        assert_eq!(reg.gauge_value(DATABASE_CONNECTIONS_MAX, &[]).unwrap(), Some(10.0));
    }

    #[test]
    fn unwired_registry_does_not_panic() {
        let reg = Registry::new();
        product_viewed(&reg, "p", "n", "c");
        db_connection_stats(&reg, 1, 1, 1);
    }
}
