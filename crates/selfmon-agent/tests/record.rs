#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use selfmon_agent::app_state::{AgentState, DeclaredVector};
use selfmon_agent::record::{MetricsRecord, Sample};
use selfmon_agent::{collect_loop, config};
use selfmon_core::cache::CacheStrategy;
use selfmon_core::{LabelPair, MetricKind, MetricValue};

fn find<'a>(samples: &'a [Sample], name: &str) -> Vec<&'a Sample> {
    samples.iter().filter(|s| s.name == name).collect()
}

#[test]
fn drain_reports_every_registered_metric() {
    let record = MetricsRecord::new(vec![LabelPair::new("hostname", "node-1")]);
    let events = record.new_counter_vector("events", &[("plugin", "file")], &["project"]);
    let last_error = record.new_string("last_error", &[("plugin", "file")]);

    events.with_labels(&[("project", "p1")]).add(3);
    events.with_labels(&[("project", "p2")]).add(4);
    last_error.set("timeout");

    let samples = record.drain();
    assert_eq!(samples.len(), 3);

    let mut ev = find(&samples, "events#plugin=file");
    ev.sort_by(|a, b| a.labels[1].value.cmp(&b.labels[1].value));
    assert_eq!(ev[0].labels, vec![LabelPair::new("hostname", "node-1"), LabelPair::new("project", "p1")]);
    assert_eq!(ev[0].value, MetricValue::Int(3));
    assert_eq!(ev[1].value, MetricValue::Int(4));
    assert_eq!(ev[0].kind, MetricKind::Counter);

    let err = find(&samples, "last_error#plugin=file");
    assert_eq!(err[0].value, MetricValue::Text("timeout".into()));

    // second window is empty for delta kinds
    let again = record.drain();
    for s in find(&again, "events#plugin=file") {
        assert_eq!(s.value, MetricValue::Int(0));
    }
    assert_eq!(find(&again, "last_error#plugin=file")[0].value, MetricValue::Text(String::new()));
}

#[test]
fn label_faults_are_summed_across_collectors() {
    let record = MetricsRecord::default();
    let a = record.new_counter_vector("a", &[("plugin", "x")], &["project"]);
    let b = record.new_gauge_vector("b", &[("plugin", "x")], &["project"]);

    a.with_labels(&[("region", "cn")]).add(1);
    b.with_labels(&[("project", "p"), ("region", "cn")]).add(1);
    b.with_labels(&[("zone", "z")]).add(1);

    assert_eq!(record.label_faults(), 3);
    assert!(record.drain().is_empty());
}

#[test]
fn agent_state_declares_configured_vectors() {
    let cfg = config::load_from_str(
        r#"
version: 1
labels:
  - { key: hostname, value: node-1 }
metrics:
  - name: plugin_in_events
    kind: counter
    label_keys: [project]
  - name: batch_size
    kind: average
  - name: flush_latency
    kind: latency
"#,
    )
    .unwrap();
    let state = AgentState::new(cfg).unwrap();

    let events = state.counter_vector("plugin_in_events").expect("declared");
    assert!(state.gauge_vector("plugin_in_events").is_none());
    assert!(matches!(state.vector("batch_size"), Some(DeclaredVector::Average(_))));
    assert!(state.latency_vector("flush_latency").is_some());

    events.with_labels(&[("project", "p1")]).add(2);
    let avg = state.average_vector("batch_size").unwrap().with_labels(&[] as &[(&str, &str)]);
    avg.add(10);
    avg.add(20);
    events.with_labels(&[("bogus", "x")]).add(1);

    let samples = collect_loop::collect_once(&state);
    assert_eq!(find(&samples, "plugin_in_events")[0].value, MetricValue::Int(2));
    assert_eq!(find(&samples, "batch_size")[0].value, MetricValue::Float(15.0));

    let faults = find(&samples, "selfmon_label_faults#component=selfmon_agent");
    assert_eq!(faults[0].value, MetricValue::Int(1));

    // drain stats land in the next window
    let next = collect_loop::collect_once(&state);
    let count = find(&next, "selfmon_collected_samples#component=selfmon_agent");
    assert_eq!(count[0].value, MetricValue::Int(i64::try_from(samples.len()).unwrap()));
    assert_eq!(find(&next, "batch_size")[0].value, MetricValue::Float(15.0));
}

#[test]
fn same_labels_resolve_to_same_metric_through_state() {
    let cfg = config::load_from_str(
        "version: 1\nagent: { cache: locked }\nmetrics:\n  - { name: e, kind: counter, label_keys: [a, b] }\n",
    )
    .unwrap();
    let state = AgentState::new(cfg).unwrap();
    let v = state.counter_vector("e").unwrap();
    let x = v.with_labels(&[("b", "2"), ("a", "1")]);
    let y = v.with_labels(&[("a", "1"), ("b", "2")]);
    assert!(Arc::ptr_eq(&x, &y));
}

#[test]
fn configured_cache_reaches_record_constructors() {
    let cfg = config::load_from_str("version: 1\nagent: { cache: locked }\n").unwrap();
    let state = AgentState::new(cfg).unwrap();
    let record = state.record();
    assert_eq!(record.strategy(), CacheStrategy::Locked);

    let v = record.new_gauge_vector("queue_len", &[("plugin", "file")], &["project"]);
    let a = v.with_labels(&[("project", "p1")]);
    let b = v.with_labels(&[("project", "p1")]);
    assert!(Arc::ptr_eq(&a, &b));

    assert_eq!(MetricsRecord::default().strategy(), CacheStrategy::Sharded);
}

#[tokio::test]
async fn run_stops_on_shutdown_with_final_drain() {
    let cfg = config::load_from_str(
        "version: 1\nagent: { collect_interval_ms: 100 }\nmetrics:\n  - { name: e, kind: counter }\n",
    )
    .unwrap();
    let state = AgentState::new(cfg).unwrap();
    state.counter_vector("e").unwrap().with_labels(&[] as &[(&str, &str)]).add(1);

    let rounds = collect_loop::run(&state, tokio::time::sleep(Duration::from_millis(350))).await;
    assert!(rounds >= 2, "rounds={rounds}");
    assert!(state.self_metrics().collect_time_us.get_avg() >= 0.0);
}
