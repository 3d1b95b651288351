//! Measurement wrapper.
//!
//! [`wrap`] times any future, classifies its output through a [`Shape`] and
//! records the result, then hands the output back untouched. One body serves
//! every call shape; the shapes only differ in how they classify and which
//! metrics they update:
//!
//! | shape          | duration histogram                  | extra                                  |
//! |----------------|-------------------------------------|----------------------------------------|
//! | `HttpEndpoint` | `http_request_duration_seconds`     | `http_requests_total{status}`          |
//! | `StoreQuery`   | `database_query_duration_seconds`   |                                        |
//! | `CacheOp`      | `redis_operation_duration_seconds`  | ops counter, hit/miss for `get`        |
//! | `AuthOp`       | `auth_operation_duration_seconds`   |                                        |
//!
//! Recording happens in a drop guard, so it runs exactly once whether the
//! future completes, fails, panics or is dropped mid-flight.
//!
//! [`wrap`] classifies `Result` outputs through the shape's [`Classify`]
//! impl; an `Ok` HTTP result counts as 200. Callers whose output carries its
//! own outcome (a response with a status, a bare `Option` from a cache) use
//! [`wrap_with`] and pass the classifier directly.

use std::future::Future;
use std::time::Instant;

use crate::error::Result;
use crate::registry::Registry;
use crate::standard::{
    AUTH_OPERATION_DURATION_SECONDS, DATABASE_QUERY_DURATION_SECONDS, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION_SECONDS, REDIS_CACHE_HITS_TOTAL, REDIS_CACHE_MISSES_TOTAL,
    REDIS_OPERATIONS_TOTAL, REDIS_OPERATION_DURATION_SECONDS,
};

/// Outcome of one wrapped call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Finished normally, nothing more to say.
    Completed,
    /// Finished with an error.
    Failed,
    /// Finished with an HTTP status code.
    Status(u16),
    /// Cache lookup found a value.
    Hit,
    /// Cache lookup found nothing.
    Miss,
    /// Dropped or unwound before finishing.
    Abandoned,
}

/// Where a call's measurements go.
pub trait Shape {
    fn record(&self, registry: &Registry, verdict: Verdict, elapsed_secs: f64) -> Result<()>;
}

/// How a shape reads a finished output of type `O`.
pub trait Classify<O>: Shape {
    fn classify(&self, output: &O) -> Verdict;
}

/// Values a cache `get` can return; decides hit vs miss.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl<T> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for bool {
    fn is_present(&self) -> bool {
        *self
    }
}

impl Presence for () {
    fn is_present(&self) -> bool {
        false
    }
}

/// Ephemeral measurement context for one call. Records on drop unless
/// [`Measurement::finish`] already did.
#[must_use = "dropping a measurement records it as abandoned"]
pub struct Measurement<'a, S: Shape + ?Sized> {
    registry: &'a Registry,
    shape: &'a S,
    started: Instant,
    recorded: bool,
}

impl<'a, S: Shape + ?Sized> Measurement<'a, S> {
    pub fn start(registry: &'a Registry, shape: &'a S) -> Self {
        Self {
            registry,
            shape,
            started: Instant::now(),
            recorded: false,
        }
    }

    /// Record with the given verdict.
    pub fn finish(mut self, verdict: Verdict) {
        self.emit(verdict);
    }

    fn emit(&mut self, verdict: Verdict) {
        if self.recorded {
            return;
        }
        self.recorded = true;
        let elapsed = self.started.elapsed().as_secs_f64();
        if let Err(e) = self.shape.record(self.registry, verdict, elapsed) {
            // Instrumentation wiring bug; the wrapped call is unaffected.
            tracing::error!(code = e.code().as_str(), error = %e, "failed to record measurement");
        }
    }
}

impl<S: Shape + ?Sized> Drop for Measurement<'_, S> {
    fn drop(&mut self) {
        self.emit(Verdict::Abandoned);
    }
}

/// Measure `operation` and return its output unchanged.
pub async fn wrap<S, F>(registry: &Registry, shape: S, operation: F) -> F::Output
where
    F: Future,
    S: Classify<F::Output>,
{
    let measurement = Measurement::start(registry, &shape);
    let output = operation.await;
    measurement.finish(shape.classify(&output));
    output
}

/// Like [`wrap`], with the verdict decided by `classify` instead of the
/// shape.
pub async fn wrap_with<S, F, C>(
    registry: &Registry,
    shape: S,
    operation: F,
    classify: C,
) -> F::Output
where
    F: Future,
    S: Shape,
    C: FnOnce(&F::Output) -> Verdict,
{
    let measurement = Measurement::start(registry, &shape);
    let output = operation.await;
    measurement.finish(classify(&output));
    output
}

fn both(first: Result<()>, second: Result<()>) -> Result<()> {
    first.and(second)
}

/// One HTTP endpoint, labeled with the request's actual method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEndpoint {
    pub method: String,
    pub endpoint: String,
}

impl HttpEndpoint {
    pub fn new(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl Shape for HttpEndpoint {
    fn record(&self, registry: &Registry, verdict: Verdict, elapsed_secs: f64) -> Result<()> {
        let status = match verdict {
            Verdict::Status(code) => code,
            Verdict::Failed | Verdict::Abandoned => 500,
            Verdict::Completed | Verdict::Hit | Verdict::Miss => 200,
        };
        let status = status.to_string();
        both(
            registry.inc_counter(HTTP_REQUESTS_TOTAL, &[&self.method, &self.endpoint, &status]),
            registry.observe(
                HTTP_REQUEST_DURATION_SECONDS,
                &[&self.method, &self.endpoint],
                elapsed_secs,
            ),
        )
    }
}

impl<T, E> Classify<std::result::Result<T, E>> for HttpEndpoint {
    fn classify(&self, output: &std::result::Result<T, E>) -> Verdict {
        match output {
            Ok(_) => Verdict::Status(200),
            Err(_) => Verdict::Failed,
        }
    }
}

/// One data-store query: operation kind and table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreQuery {
    pub operation: String,
    pub table: String,
}

impl StoreQuery {
    pub fn new(operation: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            table: table.into(),
        }
    }
}

impl Shape for StoreQuery {
    fn record(&self, registry: &Registry, _verdict: Verdict, elapsed_secs: f64) -> Result<()> {
        registry.observe(
            DATABASE_QUERY_DURATION_SECONDS,
            &[&self.operation, &self.table],
            elapsed_secs,
        )
    }
}

impl<T, E> Classify<std::result::Result<T, E>> for StoreQuery {
    fn classify(&self, output: &std::result::Result<T, E>) -> Verdict {
        if output.is_ok() {
            Verdict::Completed
        } else {
            Verdict::Failed
        }
    }
}

/// Cache operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOperation {
    Get,
    Set,
    Delete,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheOperation::Get => "get",
            CacheOperation::Set => "set",
            CacheOperation::Delete => "delete",
        }
    }
}

/// One cache operation on a category of keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOp {
    pub operation: CacheOperation,
    pub key_type: String,
}

impl CacheOp {
    pub fn new(operation: CacheOperation, key_type: impl Into<String>) -> Self {
        Self {
            operation,
            key_type: key_type.into(),
        }
    }

    pub fn get(key_type: impl Into<String>) -> Self {
        Self::new(CacheOperation::Get, key_type)
    }

    pub fn set(key_type: impl Into<String>) -> Self {
        Self::new(CacheOperation::Set, key_type)
    }

    pub fn delete(key_type: impl Into<String>) -> Self {
        Self::new(CacheOperation::Delete, key_type)
    }
}

impl Shape for CacheOp {
    fn record(&self, registry: &Registry, verdict: Verdict, elapsed_secs: f64) -> Result<()> {
        let lookup = match verdict {
            Verdict::Hit => registry.inc_counter(REDIS_CACHE_HITS_TOTAL, &[&self.key_type]),
            Verdict::Miss => registry.inc_counter(REDIS_CACHE_MISSES_TOTAL, &[&self.key_type]),
            _ => Ok(()),
        };
        let op = self.operation.as_str();
        both(
            lookup,
            both(
                registry.inc_counter(REDIS_OPERATIONS_TOTAL, &[op]),
                registry.observe(REDIS_OPERATION_DURATION_SECONDS, &[op], elapsed_secs),
            ),
        )
    }
}

impl<T: Presence, E> Classify<std::result::Result<T, E>> for CacheOp {
    fn classify(&self, output: &std::result::Result<T, E>) -> Verdict {
        match output {
            Ok(v) if self.operation == CacheOperation::Get => {
                if v.is_present() {
                    Verdict::Hit
                } else {
                    Verdict::Miss
                }
            }
            Ok(_) => Verdict::Completed,
            Err(_) => Verdict::Failed,
        }
    }
}

/// One authentication step (login, token issue, token validation, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOp {
    pub operation: String,
}

impl AuthOp {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }
}

impl Shape for AuthOp {
    fn record(&self, registry: &Registry, _verdict: Verdict, elapsed_secs: f64) -> Result<()> {
        registry.observe(AUTH_OPERATION_DURATION_SECONDS, &[&self.operation], elapsed_secs)
    }
}

impl<T, E> Classify<std::result::Result<T, E>> for AuthOp {
    fn classify(&self, output: &std::result::Result<T, E>) -> Verdict {
        if output.is_ok() {
            Verdict::Completed
        } else {
            Verdict::Failed
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Created;

    #[test]
    fn http_classification() {
        let shape = HttpEndpoint::new("GET", "get_product");
        assert_eq!(shape.classify(&Ok::<_, ()>(Created)), Verdict::Status(200));
        assert_eq!(shape.classify(&Ok::<_, ()>(42_u64)), Verdict::Status(200));
        assert_eq!(shape.classify(&Err::<(), _>("boom")), Verdict::Failed);
    }

    #[tokio::test]
    async fn explicit_classifier_overrides_the_shape() {
        let reg = Registry::standard().unwrap();
        let shape = HttpEndpoint::new("POST", "create_product");
        let out = wrap_with(&reg, shape, async { 201_u16 }, |code| {
            Verdict::Status(*code)
        })
        .await;
        assert_eq!(out, 201);
        assert_eq!(
            reg.counter_value(HTTP_REQUESTS_TOTAL, &["POST", "create_product", "201"])
                .unwrap(),
            Some(1.0)
        );
    }

    #[test]
    fn cache_classification() {
        let get = CacheOp::get("product");
        assert_eq!(get.classify(&Ok::<_, ()>(Some(1))), Verdict::Hit);
        assert_eq!(get.classify(&Ok::<Option<u8>, ()>(None)), Verdict::Miss);
        assert_eq!(get.classify(&Ok::<_, ()>(Vec::<u8>::new())), Verdict::Miss);
        assert_eq!(get.classify(&Err::<Option<u8>, _>(())), Verdict::Failed);

        let set = CacheOp::set("product");
        assert_eq!(set.classify(&Ok::<_, ()>(())), Verdict::Completed);
    }

    #[test]
    fn guard_records_once() {
        let reg = Registry::standard().unwrap();
        let shape = StoreQuery::new("select", "products");
        let m = Measurement::start(&reg, &shape);
        m.finish(Verdict::Completed);

        let snap = reg
            .histogram_snapshot(DATABASE_QUERY_DURATION_SECONDS, &["select", "products"])
            .unwrap()
            .unwrap();
        assert_eq!(snap.count, 1);
    }

    #[test]
    fn dropped_guard_counts_as_failure() {
        let reg = Registry::standard().unwrap();
        let shape = HttpEndpoint::new("POST", "create_product");
        drop(Measurement::start(&reg, &shape));

        assert_eq!(
            reg.counter_value(HTTP_REQUESTS_TOTAL, &["POST", "create_product", "500"])
                .unwrap(),
            Some(1.0)
        );
    }

    #[test]
    fn wiring_errors_do_not_escape() {
        // No metrics registered: recording fails, the caller never sees it.
        let reg = Registry::new();
        let shape = AuthOp::new("login");
        Measurement::start(&reg, &shape).finish(Verdict::Completed);
    }
}
