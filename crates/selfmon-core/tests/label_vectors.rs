//! Label index vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use selfmon_core::label::{cache_key, LabelSchema};
use selfmon_core::metric::Metric;
use std::time::Duration;

use selfmon_core::vector::{
    new_average_vector, new_counter_vector, new_latency_vector, new_string_vector,
};

use vector_loader::load;

const FILES: [&str; 8] = [
    "in_order.json",
    "out_of_order.json",
    "partial.json",
    "empty.json",
    "duplicate_key.json",
    "undefined_label.json",
    "too_many_labels.json",
    "no_schema.json",
];

#[test]
fn label_index_vectors() {
    for f in FILES {
        let v = load(f);
        let schema = LabelSchema::new(v.schema.clone());
        let res = schema.index(&v.labels);

        if let Some(err) = v.expect_error {
            let e = res.err().expect("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let index = res.expect("expected ok index");
        let ex = v.expect.expect("missing expect block");
        assert_eq!(index.len(), v.schema.len(), "vector={}", v.description);
        assert_eq!(index.to_values(), ex, "vector={}", v.description);
    }
}

#[test]
fn rejected_vectors_yield_sink_metrics() {
    for f in FILES {
        let v = load(f);
        if v.expect_error.is_none() {
            continue;
        }
        let vec = new_counter_vector("vectors", &[("plugin", "test")], &v.schema);
        let sink = vec.with_labels(&v.labels);
        sink.add(42);

        assert_eq!(vec.len(), 0, "vector={}", v.description);
        assert!(vec.collect().is_empty(), "vector={}", v.description);
        assert_eq!(vec.label_faults(), 1, "vector={}", v.description);
    }
}

#[test]
fn sink_writes_never_reach_collect_for_any_kind() {
    let undefined = [("region", "cn")];
    let too_many = [("project", "p"), ("logstore", "l"), ("plugin", "x")];
    let keys = ["project", "logstore"];

    let strings = new_string_vector("last_error", &[("plugin", "file")], &keys);
    let sink = strings.with_labels(&undefined);
    sink.set("boom".to_string());
    assert_eq!(sink.get(), "boom");
    assert!(strings.collect().is_empty());
    assert_eq!(strings.len(), 0);
    assert_eq!(strings.label_faults(), 1);

    let averages = new_average_vector("batch_size", &[("plugin", "file")], &keys);
    averages.with_labels(&too_many).add(10);
    averages.with_labels(&undefined).add(20);
    assert!(averages.collect().is_empty());
    assert_eq!(averages.label_faults(), 2);

    let latencies = new_latency_vector("flush_time", &[("plugin", "file")], &keys);
    let sink = latencies.with_labels(&undefined);
    sink.begin();
    sink.end();
    assert!(latencies.collect().is_empty());
    assert_eq!(latencies.label_faults(), 1);

    // A later valid label set starts from a fresh metric.
    let real = latencies.with_labels(&[("project", "p")]);
    assert_eq!(real.get(), Duration::ZERO);
    assert_eq!(latencies.len(), 1);
    assert_eq!(real.label_values(), ["p", "-"]);
}

#[test]
fn reused_index_buffers_start_empty() {
    let schema = LabelSchema::new(vec!["a".into(), "b".into(), "c".into()]);
    {
        let full = [("a", "1"), ("b", "2"), ("c", "3")];
        let index = schema.index(&full).unwrap();
        assert_eq!(index.to_values(), ["1", "2", "3"]);
    }
    let partial = [("b", "x")];
    let index = schema.index(&partial).unwrap();
    assert_eq!(index.to_values(), ["-", "x", "-"]);
}

#[test]
fn cache_keys_are_injective_over_delimiters() {
    let cases: [&[&str]; 6] = [
        &["a|b", "c"],
        &["a", "b|c"],
        &["a", "b", "c"],
        &["a\\", "|b"],
        &["a\\|b"],
        &["", ""],
    ];
    let keys: Vec<String> = cases.iter().map(|c| cache_key(c.iter().copied())).collect();
    for i in 0..keys.len() {
        for j in (i + 1)..keys.len() {
            assert_ne!(keys[i], keys[j], "{:?} vs {:?}", cases[i], cases[j]);
        }
    }
    assert_eq!(cache_key(["x", "y"]), cache_key(["x", "y"]));
    assert_ne!(cache_key([""]), cache_key(Vec::<&str>::new()));
}
