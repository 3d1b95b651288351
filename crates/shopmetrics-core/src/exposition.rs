//! Prometheus text exposition (format 0.0.4).
//!
//! Definitions are emitted in registration order, each with its `# HELP` and
//! `# TYPE` lines, followed by one line per existing instance. Instances are
//! sorted by label values, so two renders of the same state are identical.
//! Rendering only reads; it never creates instances.

use std::fmt::Write;

use crate::catalog::MetricDefinition;
use crate::instance::Metric;
use crate::registry::Registry;

/// Content type for the scrape response.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Render a sample value: integral values without a fraction, special values
/// spelled the way Prometheus parses them.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// `name="value"` pairs joined by commas, in definition order.
fn label_pairs(def: &MetricDefinition, values: &[String]) -> String {
    def.label_names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn braces(pairs: &str) -> String {
    if pairs.is_empty() {
        String::new()
    } else {
        format!("{{{pairs}}}")
    }
}

/// Render the whole registry.
pub fn render(registry: &Registry) -> String {
    let mut out = String::new();
    for (def, series) in registry.collect() {
        let _ = writeln!(out, "# HELP {} {}", def.name, escape_help(&def.help));
        let _ = writeln!(out, "# TYPE {} {}", def.name, def.kind);

        for s in series {
            let pairs = label_pairs(def, s.label_values());
            match s.metric() {
                Metric::Counter(c) => {
                    let _ = writeln!(out, "{}{} {}", def.name, braces(&pairs), format_value(c.value()));
                }
                Metric::Gauge(g) => {
                    let _ = writeln!(out, "{}{} {}", def.name, braces(&pairs), format_value(g.value()));
                }
                Metric::Histogram(h) => {
                    let snap = h.snapshot();
                    let prefix = if pairs.is_empty() {
                        String::new()
                    } else {
                        format!("{pairs},")
                    };
                    for (le, count) in &snap.buckets {
                        let _ = writeln!(
                            out,
                            "{}_bucket{{{}le=\"{}\"}} {}",
                            def.name,
                            prefix,
                            format_value(*le),
                            count
                        );
                    }
                    let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", def.name, prefix, snap.count);
                    let _ = writeln!(out, "{}_sum{} {}", def.name, braces(&pairs), format_value(snap.sum));
                    let _ = writeln!(out, "{}_count{} {}", def.name, braces(&pairs), snap.count);
                }
            }
        }
    }
    out
}

impl Registry {
    /// Shorthand for [`render`].
    pub fn render(&self) -> String {
        render(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(-2.0), "-2");
        assert_eq!(format_value(0.005), "0.005");
        assert_eq!(format_value(29.99), "29.99");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(f64::NAN), "NaN");
    }

    #[test]
    fn escapes_label_values_and_help() {
        let mut reg = Registry::new();
        reg.register(MetricDefinition::counter(
            "views_total",
            "Views with \\ and\nnewline",
            &["product_name"],
        ))
        .unwrap();
        reg.inc_counter("views_total", &["say \"hi\"\n"]).unwrap();

        let text = render(&reg);
        assert!(text.contains("# HELP views_total Views with \\\\ and\\nnewline\n"));
        assert!(text.contains("views_total{product_name=\"say \\\"hi\\\"\\n\"} 1\n"));
    }

    #[test]
    fn unlabeled_and_empty_metrics() {
        let mut reg = Registry::new();
        reg.register(MetricDefinition::gauge("sessions_active", "Active sessions", &[]))
            .unwrap();
        reg.register(MetricDefinition::counter("never_total", "Never touched", &["x"]))
            .unwrap();
        reg.set_gauge("sessions_active", &[], 12.0).unwrap();

        let text = render(&reg);
        assert_eq!(
            text,
            "# HELP sessions_active Active sessions\n\
             # TYPE sessions_active gauge\n\
             sessions_active 12\n\
             # HELP never_total Never touched\n\
             # TYPE never_total counter\n"
        );
    }

    #[test]
    fn histogram_lines() {
        let mut reg = Registry::new();
        reg.register(MetricDefinition::histogram(
            "query_seconds",
            "Query time",
            &["table"],
            &[0.005, 0.1],
        ))
        .unwrap();
        reg.observe("query_seconds", &["products"], 0.002).unwrap();
        reg.observe("query_seconds", &["products"], 0.5).unwrap();

        let text = render(&reg);
        let expected = "\
# HELP query_seconds Query time
# TYPE query_seconds histogram
query_seconds_bucket{table=\"products\",le=\"0.005\"} 1
query_seconds_bucket{table=\"products\",le=\"0.1\"} 1
query_seconds_bucket{table=\"products\",le=\"+Inf\"} 2
query_seconds_sum{table=\"products\"} 0.502
query_seconds_count{table=\"products\"} 2
";
        assert_eq!(text, expected);
    }

    #[test]
    fn rendering_creates_nothing() {
        let mut reg = Registry::new();
        reg.register(MetricDefinition::counter("a_total", "a", &["k"]))
            .unwrap();
        let _ = render(&reg);
        assert_eq!(reg.series_count("a_total").unwrap(), 0);
    }
}
