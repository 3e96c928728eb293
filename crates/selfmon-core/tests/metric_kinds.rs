#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::thread;
use std::time::Duration;

use selfmon_core::metric::Metric;
use selfmon_core::vector::{
    new_average, new_counter, new_counter_vector, new_cumulative_counter, new_gauge, new_latency,
    new_max, new_string,
};
use selfmon_core::{MetricKind, MetricValue};

const NO_LABELS: [(&str, &str); 0] = [];

#[test]
fn counter_collect_returns_delta() {
    let c = new_counter("events", &NO_LABELS);
    c.add(3);
    c.add(4);
    assert_eq!(c.collect(), 7);
    assert_eq!(c.get(), 0);
    c.add(5);
    assert_eq!(c.collect(), 5);
}

#[test]
fn cumulative_counter_keeps_total() {
    let c = new_cumulative_counter("events_total", &NO_LABELS);
    c.add(3);
    assert_eq!(c.collect(), 3);
    c.inc();
    assert_eq!(c.collect(), 4);
    c.clear(10);
    assert_eq!(c.get(), 10);
}

#[test]
fn gauge_and_max() {
    let g = new_gauge("queue_len", &NO_LABELS);
    g.add(5);
    g.add(-2);
    assert_eq!(g.get(), 3);
    g.clear(8);
    assert_eq!(g.collect(), 8);
    assert_eq!(g.get(), 0);

    let m = new_max("max_batch", &NO_LABELS);
    m.update_max(4);
    m.update_max(9);
    m.update_max(7);
    assert_eq!(m.collect(), 9);
    assert_eq!(m.kind(), MetricKind::Max);
}

#[test]
fn average_repeats_previous_mean_on_empty_window() {
    let a = new_average("batch_size", &NO_LABELS);
    a.add(10);
    a.add(20);
    assert_eq!(a.collect(), 15);
    assert_eq!(a.get(), 15);

    a.add(1);
    a.add(2);
    assert_eq!(a.get_avg(), 1.5);
    assert_eq!(a.get_avg(), 1.5);

    a.clear();
    assert_eq!(a.get(), 0);
    assert_eq!(a.collect_value(), MetricValue::Float(0.0));
}

#[test]
fn latency_measures_begin_end() {
    let l = new_latency("send_latency", &NO_LABELS);
    l.begin();
    thread::sleep(Duration::from_millis(100));
    l.end();

    let got = l.collect();
    assert!(got >= Duration::from_millis(100), "got {got:?}");
    assert!(got < Duration::from_secs(2), "got {got:?}");
    assert_eq!(l.collect(), Duration::ZERO);

    // end without a fresh begin is ignored after collect
    l.end();
    assert_eq!(l.get(), Duration::ZERO);
}

#[test]
fn latency_second_begin_replaces_start() {
    let l = new_latency("flush_latency", &NO_LABELS);
    l.begin();
    thread::sleep(Duration::from_millis(200));
    l.begin();
    l.end();
    assert!(l.get() < Duration::from_millis(200));

    l.clear();
    assert_eq!(l.get(), Duration::ZERO);
}

#[test]
fn string_collect_empties_value() {
    let s = new_string("last_error", &NO_LABELS);
    s.set("disk full");
    assert_eq!(s.get(), "disk full");
    assert_eq!(s.collect(), "disk full");
    assert_eq!(s.get(), "");
}

#[test]
fn names_carry_constant_labels_in_order() {
    let c = new_counter("events", &[("plugin", "file"), ("id", "2")]);
    assert_eq!(c.name(), "events#plugin=file#id=2");
    assert_eq!(c.descriptor().name(), "events");

    let v = new_counter_vector("events", &[("plugin", "file")], &["project"]);
    let m = v.with_labels(&[("project", "p1")]);
    assert_eq!(m.name(), "events#plugin=file");
    assert_eq!(m.labels()[0].key, "project");
    assert_eq!(m.labels()[0].value, "p1");
}
