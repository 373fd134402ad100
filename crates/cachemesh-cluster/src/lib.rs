//! Cachemesh cluster membership
//!
//! This crate is the cluster-membership registry of a cache-cluster node: it
//! tracks the set of peer machines participating in the cluster, keeps that
//! set searchable and ordered by `(ip, port)`, and derives per-machine
//! liveness from connection accounting so the rest of the node can route
//! traffic and react to peers going up or down.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod machine;
pub mod registry;
pub mod table;

pub use config::ClusterConfig;
pub use error::{ClusterError, Result};
pub use lifecycle::{ConnectionDirection, ConnectionPoller, LivenessListener, SocketContext};
pub use machine::{Machine, MachineHandle, MachineId};
pub use registry::ClusterRegistry;
pub use table::MachineTable;
