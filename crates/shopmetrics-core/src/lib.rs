//! shopmetrics core: metric catalog, labeled registry, measurement wrapper,
//! Prometheus text exposition and business-event recorders.
//!
//! This crate carries no HTTP or runtime dependencies. Services hold one
//! [`Registry`] (usually the [`standard`] table behind an `Arc`) and record
//! into it from any thread; a scrape endpoint calls [`Registry::render`].
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Recording paths
//! never fail the caller: misuse surfaces as `MetricsError` from the typed
//! registry API, and as a logged error from the wrapper and recorders.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod catalog;
pub mod error;
pub mod events;
pub mod exposition;
pub mod instance;
pub mod registry;
pub mod standard;
pub mod wrap;

pub use catalog::{Catalog, MetricDefinition, MetricKind};
/// Shared result type.
pub use error::{ErrorCode, MetricsError, Result};
pub use instance::{Counter, Gauge, Histogram, HistogramSnapshot, Metric, Series};
pub use registry::{Registry, RegistryOptions, SharedRegistry};
pub use wrap::{
    wrap, wrap_with, AuthOp, CacheOp, CacheOperation, HttpEndpoint, StoreQuery, Verdict,
};
