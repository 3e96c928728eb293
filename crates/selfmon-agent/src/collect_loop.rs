//! Periodic collection.
//!
//! Each tick drains the record once and logs every sample. The loop also
//! feeds the agent's self-metrics: the label fault total is published as a
//! gauge before the drain, and drain time and sample count are recorded
//! after it (so they show up in the next window).

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::{self, MissedTickBehavior};

use crate::app_state::AgentState;
use crate::record::Sample;

/// Drain every registered collector once.
pub fn collect_once(state: &AgentState) -> Vec<Sample> {
    let record = state.record();
    let own = state.self_metrics();

    own.label_faults
        .clear(i64::try_from(record.label_faults()).unwrap_or(i64::MAX));

    let started = Instant::now();
    let samples = record.drain();
    own.collect_time_us
        .add(i64::try_from(started.elapsed().as_micros()).unwrap_or(i64::MAX));

    own.collected_samples
        .add(i64::try_from(samples.len()).unwrap_or(i64::MAX));
    samples
}

/// Run until `shutdown` resolves, then drain once more. Returns the number of
/// collections performed.
pub async fn run(state: &AgentState, shutdown: impl Future<Output = ()>) -> u64 {
    let every = Duration::from_millis(state.cfg().agent.collect_interval_ms);
    let mut ticker = time::interval_at(time::Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut rounds = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                emit(&collect_once(state));
                rounds += 1;
            }
        }
    }

    emit(&collect_once(state));
    tracing::info!(rounds = rounds + 1, "collect loop stopped");
    rounds + 1
}

fn emit(samples: &[Sample]) {
    for s in samples {
        let labels = s
            .labels
            .iter()
            .map(|l| format!("{}={}", l.key, l.value))
            .collect::<Vec<_>>()
            .join(",");
        tracing::info!(metric = %s.name, kind = %s.kind, labels = %labels, value = %s.value, "self metric");
    }
    tracing::debug!(samples = samples.len(), "collected");
}
