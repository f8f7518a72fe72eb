//! Pipeline configuration, loaded once from TOML and passed by reference.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ProtgraphError, ProtgraphResult};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Emit per-entity and per-relationship diagnostics at info level.
    pub log: bool,
    pub store: StoreConfig,
    pub input: InputConfig,
    pub pipeline: RunConfig,
}

/// Connection settings for the Neo4j store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            database: "neo4j".to_string(),
            max_connections: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub dir: PathBuf,
    pub extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            extension: "xml".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Documents in flight at once. Operations within a document stay ordered.
    pub concurrency: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> ProtgraphResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ProtgraphError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ProtgraphResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ProtgraphError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ProtgraphResult<()> {
        if self.pipeline.concurrency == 0 {
            return Err(ProtgraphError::config("pipeline.concurrency must be at least 1"));
        }
        if self.store.max_connections == 0 {
            return Err(ProtgraphError::config("store.max_connections must be at least 1"));
        }
        if self.input.extension.trim_start_matches('.').is_empty() {
            return Err(ProtgraphError::config("input.extension must not be empty"));
        }
        Ok(())
    }
}
