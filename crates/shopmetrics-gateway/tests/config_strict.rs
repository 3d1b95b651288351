#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use shopmetrics_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
metrics:
  path: "/metrics"
  series_limt: 10 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:8080");
    assert_eq!(cfg.gateway.service_name, "product-service");
    assert_eq!(cfg.metrics.path, "/metrics");
    assert_eq!(cfg.metrics.series_limit, None);
    assert_eq!(cfg.metrics.series_warn_threshold, Some(1000));
    assert_eq!(cfg.store.seed_products, 5);
    assert_eq!(cfg.cache.ttl_ms, 30000);
    assert_eq!(cfg.cache.capacity, 10000);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
gateway:
  listen: "127.0.0.1:9100"
  service_name: "user-service"
metrics:
  path: "/internal/metrics"
  series_limit: 500
  series_warn_threshold: null
store:
  seed_products: 0
cache:
  ttl_ms: 1000
  capacity: 1
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.listen_addr().unwrap().port(), 9100);
    let opts = cfg.metrics.registry_options();
    assert_eq!(opts.series_limit, Some(500));
    assert_eq!(opts.series_warn_threshold, None);
}

#[test]
fn version_is_required_and_checked() {
    let err = config::load_from_str("gateway:\n  listen: \"0.0.0.0:1\"\n").expect_err("no version");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");

    let err = config::load_from_str("version: 2\n").expect_err("bad version");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn out_of_range_values_fail() {
    let cases = [
        "version: 1\ngateway:\n  listen: \"not-an-addr\"\n",
        "version: 1\nmetrics:\n  path: \"metrics\"\n",
        "version: 1\nmetrics:\n  path: \"/health\"\n",
        "version: 1\nmetrics:\n  path: \"/*\"\n",
        "version: 1\nmetrics:\n  path: \"/*rest\"\n",
        "version: 1\nmetrics:\n  path: \"/:id\"\n",
        "version: 1\nmetrics:\n  path: \"/{name}\"\n",
        "version: 1\nmetrics:\n  series_limit: 0\n",
        "version: 1\nstore:\n  seed_products: 10001\n",
        "version: 1\ncache:\n  ttl_ms: 999\n",
        "version: 1\ncache:\n  capacity: 0\n",
    ];
    for yaml in cases {
        let err = config::load_from_str(yaml).expect_err(yaml);
        assert_eq!(err.code().as_str(), "BAD_CONFIG", "{yaml}");
    }
}

#[test]
fn missing_file_is_internal() {
    let err = config::load_from_file("/nonexistent/shopmetrics.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "INTERNAL");
}
