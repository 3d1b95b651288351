#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use futures_util::future::join_all;
use shopmetrics_core::standard::{
    HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS, PRODUCT_INVENTORY_LEVEL,
    PRODUCT_VIEWS_TOTAL,
};
use shopmetrics_core::Registry;

#[test]
fn parallel_increments_are_not_lost() {
    let reg = Arc::new(Registry::standard().unwrap());
    let threads: Vec<_> = (0..8)
        .map(|_| {
            let reg = Arc::clone(&reg);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    reg.inc_counter(HTTP_REQUESTS_TOTAL, &["GET", "/products", "200"])
                        .unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(
        reg.counter_value(HTTP_REQUESTS_TOTAL, &["GET", "/products", "200"])
            .unwrap(),
        Some(8000.0)
    );
}

#[test]
fn racing_first_use_shares_one_instance() {
    let reg = Arc::new(Registry::standard().unwrap());
    let barrier = Arc::new(std::sync::Barrier::new(16));
    let threads: Vec<_> = (0..16)
        .map(|_| {
            let reg = Arc::clone(&reg);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                reg.get_or_create(PRODUCT_VIEWS_TOTAL, &["prod-1", "Lamp", "Home"])
                    .unwrap()
            })
        })
        .collect();
    let series: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();

    for s in &series[1..] {
        assert!(Arc::ptr_eq(&series[0], s));
    }
    assert_eq!(reg.series_count(PRODUCT_VIEWS_TOTAL).unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tasks_on_a_shared_registry() {
    let reg = Arc::new(Registry::standard().unwrap());
    let tasks = (0..100).map(|i| {
        let reg = Arc::clone(&reg);
        tokio::spawn(async move {
            reg.inc_counter(PRODUCT_VIEWS_TOTAL, &["prod-1", "Lamp", "Home"])
                .unwrap();
            reg.set_gauge(PRODUCT_INVENTORY_LEVEL, &["prod-1", "Lamp"], f64::from(i))
                .unwrap();
        })
    });
    for r in join_all(tasks).await {
        r.unwrap();
    }

    assert_eq!(
        reg.counter_value(PRODUCT_VIEWS_TOTAL, &["prod-1", "Lamp", "Home"])
            .unwrap(),
        Some(100.0)
    );
    let level = reg
        .gauge_value(PRODUCT_INVENTORY_LEVEL, &["prod-1", "Lamp"])
        .unwrap()
        .unwrap();
    assert!((0.0..100.0).contains(&level));
}

#[test]
fn render_while_recording() {
    let reg = Arc::new(Registry::standard().unwrap());
    let writer = {
        let reg = Arc::clone(&reg);
        std::thread::spawn(move || {
            for i in 0..500 {
                let id = format!("prod-{}", i % 10);
                reg.inc_counter(PRODUCT_VIEWS_TOTAL, &[&id, "Item", "Misc"])
                    .unwrap();
            }
        })
    };
    for _ in 0..20 {
        let text = reg.render();
        assert!(text.contains("# TYPE product_views_total counter"));
    }
    writer.join().unwrap();

    assert_eq!(reg.series_count(PRODUCT_VIEWS_TOTAL).unwrap(), 10);
}

#[test]
fn histogram_snapshots_stay_consistent_under_load() {
    const WRITERS: usize = 4;
    const PER_WRITER: usize = 3000;
    // Dyadic values keep the float sum exact in any order.
    const VALUES: [f64; 3] = [0.0078125, 0.25, 2.0];
    const LABELS: [&str; 2] = ["GET", "list_products"];

    let reg = Arc::new(Registry::standard().unwrap());
    let done = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let reader = {
        let reg = Arc::clone(&reg);
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            while !done.load(std::sync::atomic::Ordering::Acquire) {
                let Some(snap) = reg
                    .histogram_snapshot(HTTP_REQUEST_DURATION_SECONDS, &LABELS)
                    .unwrap()
                else {
                    continue;
                };
                let mut prev = 0;
                for &(_, cumulative) in &snap.buckets {
                    assert!(cumulative >= prev, "buckets must be cumulative");
                    assert!(cumulative <= snap.count, "bucket above count");
                    prev = cumulative;
                }
            }
        })
    };

    let writers: Vec<_> = (0..WRITERS)
        .map(|_| {
            let reg = Arc::clone(&reg);
            std::thread::spawn(move || {
                for i in 0..PER_WRITER {
                    reg.observe(HTTP_REQUEST_DURATION_SECONDS, &LABELS, VALUES[i % 3])
                        .unwrap();
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }
    done.store(true, std::sync::atomic::Ordering::Release);
    reader.join().unwrap();

    let snap = reg
        .histogram_snapshot(HTTP_REQUEST_DURATION_SECONDS, &LABELS)
        .unwrap()
        .unwrap();
    let total = WRITERS * PER_WRITER;
    let expected_sum: f64 = (0..total).map(|i| VALUES[i % 3]).sum();
    assert_eq!(snap.count, total as u64);
    assert_eq!(snap.sum, expected_sum);
    assert_eq!(snap.buckets.last().unwrap().1, total as u64);
}
