use std::collections::HashSet;

use serde::Deserialize;
use selfmon_core::cache::CacheStrategy;
use selfmon_core::error::{Result, SelfMonError};
use selfmon_core::{LabelPair, MetricKind};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub version: u32,

    #[serde(default)]
    pub agent: AgentSection,

    /// Labels attached to every sample drained from the record.
    #[serde(default)]
    pub labels: Vec<LabelPair>,

    #[serde(default)]
    pub metrics: Vec<MetricDecl>,
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(SelfMonError::UnsupportedVersion);
        }

        self.agent.validate()?;

        let mut names = HashSet::new();
        for m in &self.metrics {
            m.validate()?;
            if !names.insert(m.name.as_str()) {
                return Err(SelfMonError::BadConfig(format!(
                    "metrics: duplicate name {}",
                    m.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentSection {
    #[serde(default = "default_collect_interval_ms")]
    pub collect_interval_ms: u64,

    #[serde(default)]
    pub cache: CacheStrategy,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            collect_interval_ms: default_collect_interval_ms(),
            cache: CacheStrategy::default(),
        }
    }
}

impl AgentSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=3_600_000).contains(&self.collect_interval_ms) {
            return Err(SelfMonError::BadConfig(
                "agent.collect_interval_ms must be between 100 and 3600000".into(),
            ));
        }
        Ok(())
    }
}

fn default_collect_interval_ms() -> u64 {
    10_000
}

/// One metric vector to declare at startup.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricDecl {
    pub name: String,
    pub kind: MetricKind,
    #[serde(default)]
    pub const_labels: Vec<LabelPair>,
    #[serde(default)]
    pub label_keys: Vec<String>,
}

impl MetricDecl {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(SelfMonError::BadConfig("metrics: name must not be empty".into()));
        }

        let mut keys = HashSet::new();
        for k in &self.label_keys {
            if k.is_empty() {
                return Err(SelfMonError::BadConfig(format!(
                    "metric {}: label keys must not be empty",
                    self.name
                )));
            }
            if !keys.insert(k.as_str()) {
                return Err(SelfMonError::BadConfig(format!(
                    "metric {}: duplicate label key {k}",
                    self.name
                )));
            }
        }

        for l in &self.const_labels {
            if keys.contains(l.key.as_str()) {
                return Err(SelfMonError::BadConfig(format!(
                    "metric {}: const label {} is also a label key",
                    self.name, l.key
                )));
            }
        }
        Ok(())
    }
}
