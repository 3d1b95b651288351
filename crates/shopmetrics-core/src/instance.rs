//! Per-label-tuple accumulators.
//!
//! Counters and gauges are lock-free: the `f64` lives in an `AtomicU64` as its
//! bit pattern and every update is a CAS loop, so concurrent updates are never
//! lost. Histograms keep count, sum and cumulative buckets behind one short
//! mutex so an observation (and a snapshot) always sees them together.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::catalog::{MetricDefinition, MetricKind};
use crate::error::{MetricsError, Result};

/// `f64` stored as bits in an `AtomicU64`.
#[derive(Debug, Default)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    fn store(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Release);
    }

    fn fetch_add(&self, delta: f64) {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self
                .0
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Monotonic counter.
#[derive(Debug)]
pub struct Counter {
    metric: Arc<str>,
    value: AtomicF64,
}

impl Counter {
    fn new(metric: Arc<str>) -> Self {
        Self {
            metric,
            value: AtomicF64::default(),
        }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1.0);
    }

    /// Add `amount`, which must be finite and non-negative.
    pub fn inc_by(&self, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(MetricsError::NegativeIncrement {
                metric: self.metric.to_string(),
                amount,
            });
        }
        self.value.fetch_add(amount);
        Ok(())
    }

    pub fn value(&self) -> f64 {
        self.value.load()
    }
}

/// Point-in-time value, last write wins.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicF64,
}

impl Gauge {
    pub fn set(&self, v: f64) {
        self.value.store(v);
    }

    pub fn add(&self, delta: f64) {
        self.value.fetch_add(delta);
    }

    pub fn sub(&self, delta: f64) {
        self.value.fetch_add(-delta);
    }

    pub fn inc(&self) {
        self.add(1.0);
    }

    pub fn dec(&self) {
        self.sub(1.0);
    }

    pub fn value(&self) -> f64 {
        self.value.load()
    }
}

#[derive(Debug)]
struct HistogramState {
    /// Cumulative: `bucket_counts[i]` counts observations `<= bounds[i]`.
    bucket_counts: Vec<u64>,
    sum: f64,
    count: u64,
}

/// Consistent copy of one histogram instance.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper_bound, cumulative_count)`, ascending. `+Inf` is `count`.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    pub count: u64,
}

/// Bucketed distribution with cumulative bucket counts.
#[derive(Debug)]
pub struct Histogram {
    bounds: Arc<[f64]>,
    state: Mutex<HistogramState>,
}

impl Histogram {
    fn new(bounds: Arc<[f64]>) -> Self {
        let state = HistogramState {
            bucket_counts: vec![0; bounds.len()],
            sum: 0.0,
            count: 0,
        };
        Self {
            bounds,
            state: Mutex::new(state),
        }
    }

    /// Record one value: every bucket with bound `>= v` is incremented.
    pub fn observe(&self, v: f64) {
        // Bounds are ascending, so the touched buckets form a suffix.
        // NaN falls in no finite bucket.
        let first = if v.is_nan() {
            self.bounds.len()
        } else {
            self.bounds.partition_point(|&b| b < v)
        };
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        for c in &mut st.bucket_counts[first..] {
            *c += 1;
        }
        st.sum += v;
        st.count += 1;
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        HistogramSnapshot {
            buckets: self
                .bounds
                .iter()
                .copied()
                .zip(st.bucket_counts.iter().copied())
                .collect(),
            sum: st.sum,
            count: st.count,
        }
    }

    pub fn count(&self) -> u64 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).count
    }

    pub fn sum(&self) -> f64 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).sum
    }
}

/// Accumulator of one metric instance.
#[derive(Debug)]
pub enum Metric {
    Counter(Counter),
    Gauge(Gauge),
    Histogram(Histogram),
}

/// One instance: a definition bound to concrete label values.
#[derive(Debug)]
pub struct Series {
    def: Arc<MetricDefinition>,
    label_values: Vec<String>,
    metric: Metric,
}

impl Series {
    pub(crate) fn new(
        def: Arc<MetricDefinition>,
        name: Arc<str>,
        bounds: Arc<[f64]>,
        label_values: Vec<String>,
    ) -> Self {
        let metric = match def.kind {
            MetricKind::Counter => Metric::Counter(Counter::new(name)),
            MetricKind::Gauge => Metric::Gauge(Gauge::default()),
            MetricKind::Histogram => Metric::Histogram(Histogram::new(bounds)),
        };
        Self {
            def,
            label_values,
            metric,
        }
    }

    pub fn definition(&self) -> &MetricDefinition {
        &self.def
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    pub fn counter(&self) -> Result<&Counter> {
        match &self.metric {
            Metric::Counter(c) => Ok(c),
            _ => Err(self.kind_mismatch(MetricKind::Counter)),
        }
    }

    pub fn gauge(&self) -> Result<&Gauge> {
        match &self.metric {
            Metric::Gauge(g) => Ok(g),
            _ => Err(self.kind_mismatch(MetricKind::Gauge)),
        }
    }

    pub fn histogram(&self) -> Result<&Histogram> {
        match &self.metric {
            Metric::Histogram(h) => Ok(h),
            _ => Err(self.kind_mismatch(MetricKind::Histogram)),
        }
    }

    fn kind_mismatch(&self, expected: MetricKind) -> MetricsError {
        MetricsError::KindMismatch {
            metric: self.def.name.clone(),
            expected: expected.as_str(),
            actual: self.def.kind.as_str(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn histogram(bounds: &[f64]) -> Histogram {
        Histogram::new(Arc::from(bounds))
    }

    #[test]
    fn counter_rejects_negative_and_non_finite() {
        let c = Counter::new(Arc::from("orders_total"));
        c.inc();
        c.inc_by(2.5).unwrap();
        assert!(c.inc_by(-1.0).is_err());
        assert!(c.inc_by(f64::NAN).is_err());
        assert!(c.inc_by(f64::INFINITY).is_err());
        assert_eq!(c.value(), 3.5);
    }

    #[test]
    fn gauge_moves_both_ways() {
        let g = Gauge::default();
        g.set(10.0);
        g.add(2.5);
        g.sub(5.0);
        g.dec();
        assert_eq!(g.value(), 6.5);
        g.set(-3.0);
        assert_eq!(g.value(), -3.0);
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let h = histogram(&[5.0, 10.0, 20.0]);
        for v in [2.0, 7.0, 15.0] {
            h.observe(v);
        }
        let snap = h.snapshot();
        assert_eq!(snap.buckets, vec![(5.0, 1), (10.0, 2), (20.0, 3)]);
        assert_eq!(snap.sum, 24.0);
        assert_eq!(snap.count, 3);
    }

    #[test]
    fn observation_on_a_bound_lands_in_that_bucket() {
        let h = histogram(&[1.0, 2.0]);
        h.observe(1.0);
        let snap = h.snapshot();
        assert_eq!(snap.buckets, vec![(1.0, 1), (2.0, 1)]);
    }

    #[test]
    fn observation_above_all_bounds_only_counts_toward_inf() {
        let h = histogram(&[1.0, 2.0]);
        h.observe(0.5);
        h.observe(50.0);
        let snap = h.snapshot();
        assert_eq!(snap.buckets, vec![(1.0, 1), (2.0, 1)]);
        assert_eq!(snap.count, 2);
        assert_eq!(snap.sum, 50.5);
    }
}
