use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Sidecar settings read from an optional TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Directory holding `students.json`, `classes.json`, ... snapshots.
    pub seed_dir: Option<PathBuf>,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_level: Option<String>,
    pub latency: LatencyConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub get_all_ms: u64,
    pub get_by_id_ms: u64,
    pub create_ms: u64,
    pub update_ms: u64,
    pub delete_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            get_all_ms: 300,
            get_by_id_ms: 200,
            create_ms: 400,
            update_ms: 400,
            delete_ms: 300,
        }
    }
}

impl HubConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
