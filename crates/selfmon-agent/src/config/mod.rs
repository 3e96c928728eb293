//! YAML agent config. Unknown fields are rejected and every declaration is
//! validated before the agent builds any vector.

pub mod schema;

use std::path::Path;

use selfmon_core::error::{Result, SelfMonError};

pub use schema::{AgentConfig, AgentSection, MetricDecl};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<AgentConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        SelfMonError::Internal(format!("cannot read {}: {e}", path.display()))
    })?;
    let cfg = load_from_str(&text)?;
    tracing::debug!(path = %path.display(), metrics = cfg.metrics.len(), "config loaded");
    Ok(cfg)
}

pub fn load_from_str(text: &str) -> Result<AgentConfig> {
    let cfg = serde_yaml::from_str::<AgentConfig>(text)
        .map_err(|e| SelfMonError::BadConfig(format!("config is not valid yaml for this agent: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
