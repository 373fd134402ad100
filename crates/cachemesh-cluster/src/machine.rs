//! Cluster machine records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Unique identity of a cluster machine: IPv4 address plus cluster port.
///
/// Ordering compares the address first (numeric, ascending) and the port as
/// tie-break; two ids equal on both refer to the same machine.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MachineId {
    ip: Ipv4Addr,
    port: u16,
}

impl MachineId {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self { ip, port }
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Stable reference to a machine record in the registry.
///
/// Machines are never removed or relocated once inserted, so a handle stays
/// valid for the lifetime of the registry that issued it.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineHandle(usize);

impl MachineHandle {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for MachineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "machine#{}", self.0)
    }
}

/// One cluster peer as tracked by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    /// Identity of this machine
    pub id: MachineId,

    /// Display name, captured once at insertion (dotted-decimal address)
    pub hostname: String,

    /// Liveness flag; a freshly inserted machine is dead until an explicit
    /// up-signal arrives
    pub dead: bool,

    /// Count of currently active connections to/from this machine
    pub now_connections: u32,
}

impl Machine {
    /// Create a new machine record in its insertion state.
    pub fn new(id: MachineId) -> Self {
        Self {
            id,
            hostname: id.ip().to_string(),
            dead: true,
            now_connections: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Short description of this machine for logging
    pub fn summary(&self) -> String {
        format!(
            "Machine[id={}, hostname={}, dead={}, connections={}]",
            self.id, self.hostname, self.dead, self.now_connections
        )
    }
}

impl PartialEq for Machine {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Machine {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_id_ordering() {
        let a = MachineId::new(Ipv4Addr::new(10, 0, 0, 1), 9300);
        let b = MachineId::new(Ipv4Addr::new(10, 0, 0, 1), 9301);
        let c = MachineId::new(Ipv4Addr::new(10, 0, 0, 2), 1);

        // Port breaks the tie, address dominates
        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
    }

    #[test]
    fn test_machine_id_display() {
        let id = MachineId::new(Ipv4Addr::new(192, 168, 1, 7), 8086);
        assert_eq!(id.to_string(), "192.168.1.7:8086");
    }

    #[test]
    fn test_new_machine_is_dead() {
        let id = MachineId::new(Ipv4Addr::new(10, 0, 0, 1), 9300);
        let machine = Machine::new(id);

        assert!(machine.dead);
        assert!(!machine.is_alive());
        assert_eq!(machine.now_connections, 0);
        assert_eq!(machine.hostname, "10.0.0.1");
    }

    #[test]
    fn test_machine_equality_is_identity() {
        let id = MachineId::new(Ipv4Addr::new(10, 0, 0, 1), 9300);
        let mut a = Machine::new(id);
        let b = Machine::new(id);

        a.dead = false;
        a.now_connections = 3;
        assert_eq!(a, b);
    }
}
