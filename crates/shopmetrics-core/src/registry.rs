//! Process-wide metric registry.
//!
//! Owns the catalog and, per definition, a `DashMap` from label tuple to
//! instance. Definitions are added through `&mut self` during startup; once
//! the registry is shared behind an `Arc`, only instances can be created.
//!
//! Instances are created on first use and never removed. Label values that
//! carry raw identifiers (product ids, IP addresses) make that growth
//! unbounded; `RegistryOptions` can cap it per metric and warns when a metric
//! crosses a threshold.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::catalog::{Catalog, MetricDefinition, MetricKind};
use crate::error::{MetricsError, Result};
use crate::instance::{HistogramSnapshot, Series};

/// Cardinality policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Refuse new series for a metric once it has this many. `None` = unbounded.
    pub series_limit: Option<usize>,
    /// Log a warning (once per metric) when a metric reaches this many series.
    pub series_warn_threshold: Option<usize>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            series_limit: None,
            series_warn_threshold: Some(1000),
        }
    }
}

struct Family {
    def: Arc<MetricDefinition>,
    name: Arc<str>,
    bounds: Arc<[f64]>,
    series: DashMap<Vec<String>, Arc<Series>>,
    warned: AtomicBool,
}

impl Family {
    fn new(def: Arc<MetricDefinition>) -> Self {
        Self {
            name: Arc::from(def.name.as_str()),
            bounds: Arc::from(def.buckets.as_slice()),
            def,
            series: DashMap::new(),
            warned: AtomicBool::new(false),
        }
    }

    fn key(&self, label_values: &[&str]) -> Result<Vec<String>> {
        let expected = self.def.label_names.len();
        if label_values.len() != expected {
            return Err(MetricsError::LabelMismatch {
                metric: self.def.name.clone(),
                detail: format!("expected {expected} values, got {}", label_values.len()),
            });
        }
        Ok(label_values.iter().map(|v| v.to_string()).collect())
    }
}

/// Catalog plus live instances.
pub struct Registry {
    catalog: Catalog,
    families: Vec<Family>,
    opts: RegistryOptions,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(opts: RegistryOptions) -> Self {
        Self {
            catalog: Catalog::new(),
            families: Vec::new(),
            opts,
        }
    }

    pub fn options(&self) -> RegistryOptions {
        self.opts
    }

    /// Register a definition (idempotent for identical shapes).
    pub fn register(&mut self, def: MetricDefinition) -> Result<Arc<MetricDefinition>> {
        let before = self.catalog.len();
        let def = self.catalog.register(def)?;
        if self.catalog.len() > before {
            self.families.push(Family::new(Arc::clone(&def)));
        }
        Ok(def)
    }

    /// Register a fixed table. Stops at the first conflict.
    pub fn register_all<I>(&mut self, defs: I) -> Result<()>
    where
        I: IntoIterator<Item = MetricDefinition>,
    {
        for def in defs {
            self.register(def)?;
        }
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<MetricDefinition>> {
        self.catalog.lookup(name)
    }

    fn family(&self, name: &str) -> Result<&Family> {
        self.catalog.position(name).map(|i| &self.families[i])
    }

    fn family_of_kind(&self, name: &str, kind: MetricKind) -> Result<&Family> {
        let fam = self.family(name)?;
        if fam.def.kind != kind {
            return Err(MetricsError::KindMismatch {
                metric: fam.def.name.clone(),
                expected: kind.as_str(),
                actual: fam.def.kind.as_str(),
            });
        }
        Ok(fam)
    }

    /// Instance for `label_values` (positional, in `label_names` order),
    /// created on first use. Concurrent first calls for the same tuple all
    /// receive the same `Arc`.
    pub fn get_or_create(&self, name: &str, label_values: &[&str]) -> Result<Arc<Series>> {
        let fam = self.family(name)?;
        self.get_or_create_in(fam, label_values)
    }

    /// Like [`Registry::get_or_create`], with label names spelled out. Names
    /// must match the definition exactly, in order.
    pub fn get_or_create_named(&self, name: &str, labels: &[(&str, &str)]) -> Result<Arc<Series>> {
        let fam = self.family(name)?;
        let names_match = labels.len() == fam.def.label_names.len()
            && labels
                .iter()
                .zip(&fam.def.label_names)
                .all(|((k, _), expected)| k == expected);
        if !names_match {
            let got: Vec<&str> = labels.iter().map(|(k, _)| *k).collect();
            return Err(MetricsError::LabelMismatch {
                metric: fam.def.name.clone(),
                detail: format!("expected labels {:?}, got {:?}", fam.def.label_names, got),
            });
        }
        let values: Vec<&str> = labels.iter().map(|(_, v)| *v).collect();
        self.get_or_create_in(fam, &values)
    }

    fn get_or_create_in(&self, fam: &Family, label_values: &[&str]) -> Result<Arc<Series>> {
        let key = fam.key(label_values)?;
        if let Some(existing) = fam.series.get(&key) {
            return Ok(Arc::clone(existing.value()));
        }

        if let Some(limit) = self.opts.series_limit {
            if fam.series.len() >= limit {
                return Err(MetricsError::CardinalityExceeded {
                    metric: fam.def.name.clone(),
                    limit,
                });
            }
        }

        let values = key.clone();
        let series = Arc::clone(
            fam.series
                .entry(key)
                .or_insert_with(|| {
                    Arc::new(Series::new(
                        Arc::clone(&fam.def),
                        Arc::clone(&fam.name),
                        Arc::clone(&fam.bounds),
                        values,
                    ))
                })
                .value(),
        );

        if let Some(threshold) = self.opts.series_warn_threshold {
            if !fam.warned.load(Ordering::Relaxed)
                && fam.series.len() >= threshold
                && !fam.warned.swap(true, Ordering::Relaxed)
            {
                tracing::warn!(
                    metric = %fam.def.name,
                    series = fam.series.len(),
                    threshold,
                    "metric label cardinality crossed warning threshold"
                );
            }
        }

        Ok(series)
    }

    /// Existing instance, if any. Never creates one.
    pub fn find(&self, name: &str, label_values: &[&str]) -> Result<Option<Arc<Series>>> {
        let fam = self.family(name)?;
        let key = fam.key(label_values)?;
        Ok(fam.series.get(&key).map(|r| Arc::clone(r.value())))
    }

    /// Number of instances of `name`.
    pub fn series_count(&self, name: &str) -> Result<usize> {
        Ok(self.family(name)?.series.len())
    }

    // Typed updates

    pub fn inc_counter(&self, name: &str, label_values: &[&str]) -> Result<()> {
        let fam = self.family_of_kind(name, MetricKind::Counter)?;
        self.get_or_create_in(fam, label_values)?.counter()?.inc();
        Ok(())
    }

    pub fn inc_counter_by(&self, name: &str, label_values: &[&str], amount: f64) -> Result<()> {
        let fam = self.family_of_kind(name, MetricKind::Counter)?;
        self.get_or_create_in(fam, label_values)?
            .counter()?
            .inc_by(amount)
    }

    pub fn set_gauge(&self, name: &str, label_values: &[&str], v: f64) -> Result<()> {
        let fam = self.family_of_kind(name, MetricKind::Gauge)?;
        self.get_or_create_in(fam, label_values)?.gauge()?.set(v);
        Ok(())
    }

    pub fn add_gauge(&self, name: &str, label_values: &[&str], delta: f64) -> Result<()> {
        let fam = self.family_of_kind(name, MetricKind::Gauge)?;
        self.get_or_create_in(fam, label_values)?.gauge()?.add(delta);
        Ok(())
    }

    pub fn sub_gauge(&self, name: &str, label_values: &[&str], delta: f64) -> Result<()> {
        let fam = self.family_of_kind(name, MetricKind::Gauge)?;
        self.get_or_create_in(fam, label_values)?.gauge()?.sub(delta);
        Ok(())
    }

    pub fn observe(&self, name: &str, label_values: &[&str], v: f64) -> Result<()> {
        let fam = self.family_of_kind(name, MetricKind::Histogram)?;
        self.get_or_create_in(fam, label_values)?
            .histogram()?
            .observe(v);
        Ok(())
    }

    // Reads (no instance creation)

    pub fn counter_value(&self, name: &str, label_values: &[&str]) -> Result<Option<f64>> {
        self.family_of_kind(name, MetricKind::Counter)?;
        match self.find(name, label_values)? {
            Some(s) => Ok(Some(s.counter()?.value())),
            None => Ok(None),
        }
    }

    pub fn gauge_value(&self, name: &str, label_values: &[&str]) -> Result<Option<f64>> {
        self.family_of_kind(name, MetricKind::Gauge)?;
        match self.find(name, label_values)? {
            Some(s) => Ok(Some(s.gauge()?.value())),
            None => Ok(None),
        }
    }

    pub fn histogram_snapshot(
        &self,
        name: &str,
        label_values: &[&str],
    ) -> Result<Option<HistogramSnapshot>> {
        self.family_of_kind(name, MetricKind::Histogram)?;
        match self.find(name, label_values)? {
            Some(s) => Ok(Some(s.histogram()?.snapshot())),
            None => Ok(None),
        }
    }

    /// Definitions in registration order, each with its instances sorted by
    /// label values.
    pub(crate) fn collect(&self) -> Vec<(&MetricDefinition, Vec<Arc<Series>>)> {
        self.families
            .iter()
            .map(|fam| {
                let mut series: Vec<Arc<Series>> =
                    fam.series.iter().map(|r| Arc::clone(r.value())).collect();
                series.sort_by(|a, b| a.label_values().cmp(b.label_values()));
                (fam.def.as_ref(), series)
            })
            .collect()
    }
}

/// Shared registry handle.
pub type SharedRegistry = Arc<Registry>;
