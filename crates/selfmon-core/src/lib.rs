//! selfmon core: label-indexed self-monitoring metrics.
//!
//! This crate holds everything an instrumented component touches: the metric
//! kinds, label schemas and indexes, the label-indexed caches and the metric
//! vectors that tie them together. It carries no runtime dependencies so it
//! can be embedded in any process.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Label errors on
//! the write path are absorbed into sink metrics and counted; every other
//! fallible path returns `SelfMonError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cache;
pub mod error;
pub mod label;
pub mod metric;
pub mod pool;
pub mod vector;

/// Shared result type.
pub use error::{ErrorCode, Result, SelfMonError};
pub use label::{AsLabel, LabelPair};
pub use metric::{Average, Counter, Gauge, Latency, Metric, MetricKind, MetricValue, StringValue};
pub use vector::{MetricCollector, MetricVector};
