//! Metric definitions and the registration-ordered catalog.
//!
//! A definition fixes a metric's name, kind, label names and (for histograms)
//! bucket bounds. The catalog is filled once at startup; after that, shapes
//! never change.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{MetricsError, Result};

/// Kind of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    /// Name used on `# TYPE` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDefinition {
    pub name: String,
    pub kind: MetricKind,
    pub help: String,
    pub label_names: Vec<String>,
    /// Upper bounds, ascending. Empty unless `kind` is `Histogram`.
    pub buckets: Vec<f64>,
}

impl MetricDefinition {
    pub fn counter(name: &str, help: &str, labels: &[&str]) -> Self {
        Self::new(name, MetricKind::Counter, help, labels, Vec::new())
    }

    pub fn gauge(name: &str, help: &str, labels: &[&str]) -> Self {
        Self::new(name, MetricKind::Gauge, help, labels, Vec::new())
    }

    pub fn histogram(name: &str, help: &str, labels: &[&str], buckets: &[f64]) -> Self {
        Self::new(name, MetricKind::Histogram, help, labels, buckets.to_vec())
    }

    fn new(name: &str, kind: MetricKind, help: &str, labels: &[&str], buckets: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            help: help.to_string(),
            label_names: labels.iter().map(|l| l.to_string()).collect(),
            buckets,
        }
    }

    /// Two definitions have the same shape when they would produce
    /// interchangeable instances. Help text does not count.
    pub fn same_shape(&self, other: &MetricDefinition) -> bool {
        self.kind == other.kind
            && self.label_names == other.label_names
            && self.buckets == other.buckets
    }

    /// Reject names, labels and buckets the exposition format cannot carry.
    pub fn validate(&self) -> Result<()> {
        if !is_metric_name(&self.name) {
            return Err(MetricsError::InvalidDefinition(format!(
                "bad metric name: {:?}",
                self.name
            )));
        }

        for (i, label) in self.label_names.iter().enumerate() {
            if !is_label_name(label) || label.starts_with("__") {
                return Err(MetricsError::InvalidDefinition(format!(
                    "{}: bad label name {:?}",
                    self.name, label
                )));
            }
            if self.label_names[..i].contains(label) {
                return Err(MetricsError::InvalidDefinition(format!(
                    "{}: duplicate label {:?}",
                    self.name, label
                )));
            }
        }

        match self.kind {
            MetricKind::Histogram => {
                if self.label_names.iter().any(|l| l == "le") {
                    return Err(MetricsError::InvalidDefinition(format!(
                        "{}: histogram cannot use reserved label \"le\"",
                        self.name
                    )));
                }
                if self.buckets.is_empty() {
                    return Err(MetricsError::InvalidDefinition(format!(
                        "{}: histogram needs at least one bucket",
                        self.name
                    )));
                }
                if self.buckets.iter().any(|b| !b.is_finite()) {
                    return Err(MetricsError::InvalidDefinition(format!(
                        "{}: bucket bounds must be finite",
                        self.name
                    )));
                }
                if self.buckets.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(MetricsError::InvalidDefinition(format!(
                        "{}: bucket bounds must be strictly ascending",
                        self.name
                    )));
                }
            }
            MetricKind::Counter | MetricKind::Gauge => {
                if !self.buckets.is_empty() {
                    return Err(MetricsError::InvalidDefinition(format!(
                        "{}: only histograms take buckets",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }
}

fn is_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Registration-ordered set of definitions.
#[derive(Debug, Default)]
pub struct Catalog {
    defs: Vec<Arc<MetricDefinition>>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. Re-registering an identical shape returns the
    /// existing entry; a conflicting shape is rejected.
    pub fn register(&mut self, def: MetricDefinition) -> Result<Arc<MetricDefinition>> {
        if let Some(&i) = self.index.get(&def.name) {
            let existing = &self.defs[i];
            if existing.same_shape(&def) {
                return Ok(Arc::clone(existing));
            }
            return Err(MetricsError::DuplicateMetric { name: def.name });
        }

        def.validate()?;

        let def = Arc::new(def);
        self.index.insert(def.name.clone(), self.defs.len());
        self.defs.push(Arc::clone(&def));
        Ok(def)
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<MetricDefinition>> {
        self.position(name).map(|i| Arc::clone(&self.defs[i]))
    }

    /// Registration index of `name`.
    pub fn position(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| MetricsError::NotFound(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<MetricDefinition>> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
