//! Registry configuration

use crate::error::{ClusterError, Result};
use serde::{Deserialize, Serialize};

/// Membership registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Name of the cluster this node participates in
    pub cluster_name: String,

    /// Maximum number of machines the registry will track; fixed at
    /// initialization
    pub max_machines: usize,

    /// Default port peers listen on for cluster traffic
    pub cluster_port: u16,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            cluster_name: "cachemesh".to_string(),
            max_machines: 256,
            cluster_port: 8086,
        }
    }
}

impl ClusterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClusterError::configuration(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ClusterError::configuration(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ClusterError::configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ClusterError::configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.cluster_name.is_empty() {
            return Err(ClusterError::configuration("Cluster name cannot be empty"));
        }

        if self.max_machines == 0 {
            return Err(ClusterError::configuration(
                "Maximum machine count must be at least 1",
            ));
        }

        if self.cluster_port == 0 {
            return Err(ClusterError::configuration("Cluster port cannot be 0"));
        }

        Ok(())
    }
}
