//! Configuration management utilities

use serde::{Deserialize, Serialize};

fn default_max_connections() -> u32 {
    100
}

fn default_min_connections() -> u32 {
    5
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }

    /// Connection bounds clamped so that `min <= max` and `max >= 1`
    pub fn normalize(&self) -> (u32, u32) {
        let max = self.max_connections.max(1);
        let min = self.min_connections.min(max);
        (min, max)
    }
}
