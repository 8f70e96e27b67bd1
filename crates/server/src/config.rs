use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use enkinet::SyncConfig;

pub const DEFAULT_PORT: u16 = 7070;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub tick_rate: u32,
    /// Ticks between two snapshots sent to the same client.
    pub snapshot_interval: u64,
    pub max_clients: usize,
    /// Unsent bytes a client may accumulate before it is dropped.
    pub max_backlog_bytes: usize,
    pub generator: GeneratorConfig,
    pub sync: SyncConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_owned(),
            port: DEFAULT_PORT,
            tick_rate: 30,
            snapshot_interval: 90,
            max_clients: 32,
            max_backlog_bytes: 4 * 1024 * 1024,
            generator: GeneratorConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.tick_rate > 0, "tick_rate must be positive");
        anyhow::ensure!(self.max_clients > 0, "max_clients must be positive");
        anyhow::ensure!(
            self.max_backlog_bytes > 0,
            "max_backlog_bytes must be positive"
        );
        anyhow::ensure!(
            self.generator.max_hull_parts > 0,
            "generator.max_hull_parts must be positive"
        );
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Fixed seed; a fresh one is drawn and logged when absent.
    pub seed: Option<u64>,
    pub objects: usize,
    pub robots: usize,
    pub max_hull_parts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            objects: 8,
            robots: 12,
            max_hull_parts: 10,
        }
    }
}
