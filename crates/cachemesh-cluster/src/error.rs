//! Registry error types

use std::collections::TryReserveError;

use crate::machine::MachineHandle;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Registry-specific error types
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("Allocation failure: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("Machine already exists: {0}")]
    MachineAlreadyExists(MachineHandle),

    #[error("Machine capacity exceeded: {capacity}")]
    CapacityExceeded { capacity: usize },

    #[error("Machine not found: {0}")]
    MachineNotFound(String),

    #[error("Invalid registry state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection poller error: {0}")]
    Poller(String),
}

impl ClusterError {
    pub fn machine_not_found<T: Into<String>>(key: T) -> Self {
        Self::MachineNotFound(key.into())
    }

    pub fn invalid_state<T: Into<String>>(msg: T) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn poller<T: Into<String>>(msg: T) -> Self {
        Self::Poller(msg.into())
    }

    pub fn capacity_exceeded(capacity: usize) -> Self {
        Self::CapacityExceeded { capacity }
    }
}
