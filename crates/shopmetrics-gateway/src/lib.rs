//! shopmetrics gateway library entry.
//!
//! A small product/user HTTP service instrumented end to end with
//! `shopmetrics-core`: every business route is measured by the tracking
//! layer, store queries and cache operations are wrapped, domain events go
//! to the recorders, and the registry is scraped from the metrics route. It
//! is consumed by the binary (`main.rs`) and by integration tests.

pub mod accounts;
pub mod app_state;
pub mod cache;
pub mod config;
pub mod error;
pub mod ops;
pub mod router;
pub mod services;
pub mod store;
pub mod track;
