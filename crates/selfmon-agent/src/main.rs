//! selfmon agent
//!
//! Loads the metric declarations, registers them in a metrics record and
//! drains the record on a fixed interval until Ctrl-C.

use tracing_subscriber::{fmt, EnvFilter};

use selfmon_agent::{app_state, collect_loop, config};

#[tokio::main]
async fn main() -> selfmon_core::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "selfmon.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let state = app_state::AgentState::new(cfg)?;

    tracing::info!(
        config = %path,
        metrics = state.cfg().metrics.len(),
        interval_ms = state.cfg().agent.collect_interval_ms,
        "selfmon-agent starting"
    );

    collect_loop::run(&state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler failed, stopping");
        }
    })
    .await;
    Ok(())
}
