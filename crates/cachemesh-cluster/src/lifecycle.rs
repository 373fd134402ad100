//! Connection lifecycle collaborators
//!
//! The registry derives machine liveness from connection accounting but does
//! not own any sockets itself. These traits are the seams to the connection
//! subsystem: a [`ConnectionPoller`] registers sockets for readiness polling,
//! and a [`LivenessListener`] receives every liveness transition.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::machine::{Machine, MachineHandle};

#[cfg(test)]
use mockall::automock;

/// Direction of a cluster connection, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionDirection {
    /// Accepted from the peer
    Inbound,

    /// Initiated towards the peer
    Outbound,
}

impl fmt::Display for ConnectionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbound => write!(f, "inbound"),
            Self::Outbound => write!(f, "outbound"),
        }
    }
}

/// Binds one network socket to the machine that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketContext {
    /// Machine this socket belongs to
    pub machine: MachineHandle,

    /// Raw descriptor of the socket, owned by the connection subsystem
    pub fd: i32,

    /// Whether the connection was accepted or initiated
    pub direction: ConnectionDirection,
}

impl SocketContext {
    pub fn new(machine: MachineHandle, fd: i32, direction: ConnectionDirection) -> Self {
        Self {
            machine,
            fd,
            direction,
        }
    }
}

/// Readiness-polling side of the connection subsystem.
///
/// [`crate::ClusterRegistry::add_connection`] registers the socket before it
/// counts it, and [`crate::ClusterRegistry::remove_connection`] deregisters it
/// before it uncounts it; a failure in either call is returned unchanged and
/// leaves the connection count untouched.
#[cfg_attr(test, automock)]
pub trait ConnectionPoller: Send + Sync {
    fn register_for_readiness(&self, ctx: &SocketContext) -> Result<()>;

    fn deregister_from_readiness(&self, ctx: &SocketContext) -> Result<()>;
}

/// Receiver of machine liveness transitions.
///
/// The callback runs synchronously inside the registry critical section that
/// caused the transition, so delivery is serialized and happens exactly once
/// per edge, in order. The listener must be fast and must not call back into
/// the registry, or it deadlocks on the registry lock.
#[cfg_attr(test, automock)]
pub trait LivenessListener: Send + Sync {
    fn on_machine_liveness_changed(&self, machine: &Machine);
}
