use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Minimum fraction of equal token positions for a message to join a cluster.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;
pub const DEFAULT_MASK_CACHE_SIZE: usize = 4096;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("similarity threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("max_clusters must be greater than zero")]
    ZeroClusterCap,
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tuning knobs for one mining run. Partial JSON files fall back to the defaults
/// for any field they omit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    pub similarity_threshold: f64,
    /// `None` leaves the cluster table unbounded.
    pub max_clusters: Option<usize>,
    /// Raw lines kept per cluster for `sample_log_lines`; 0 keeps none.
    pub sample_lines: usize,
    /// Entries in the raw-text to masked-text cache; 0 disables it.
    pub mask_cache_size: usize,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_clusters: None,
            sample_lines: 0,
            mask_cache_size: DEFAULT_MASK_CACHE_SIZE,
        }
    }
}

impl MinerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidThreshold(self.similarity_threshold));
        }
        if self.max_clusters == Some(0) {
            return Err(ConfigError::ZeroClusterCap);
        }
        Ok(())
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: MinerConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }
}
